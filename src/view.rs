use std::{
    io::{stdin, stdout, Write},
    sync::mpsc,
    thread::{self, JoinHandle},
    time::Duration,
};

use anyhow::{anyhow, Context};
use termion::{event::Key, input::TermRead, raw::IntoRawMode};

use crate::{
    color::PAINT_CYCLE,
    config::Config,
    pos,
    sim::{Frame, RunState, SimCmd},
    Pos, SimHandle,
};

pub use canvas::Canvas;
mod canvas;

pub struct View {
    thread: JoinHandle<anyhow::Result<()>>,
}

impl View {
    pub fn spawn(handle: SimHandle, config: &Config) -> Self {
        let state = ViewState::new(config);
        let refresh = config.view_refresh;
        let thread = thread::spawn(move || view_loop(handle, state, refresh));
        Self { thread }
    }

    pub fn join(self) -> anyhow::Result<()> {
        self.thread
            .join()
            .map_err(|_| anyhow!("the view thread panicked"))?
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dir {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputCmd {
    Exit,
    Move(Dir),
    Paint,
    Start { fast: bool },
    Stop,
    Randomize,
    NewGame,
    ToggleMulticolour,
    NextColor,
    SwitchLanguage,
    Prompt,
}

impl InputCmd {
    fn from_key(key: Key) -> Option<Self> {
        let command = match key {
            Key::Char('q') | Key::Ctrl('c') => Self::Exit,
            Key::Up => Self::Move(Dir::Up),
            Key::Down => Self::Move(Dir::Down),
            Key::Left => Self::Move(Dir::Left),
            Key::Right => Self::Move(Dir::Right),
            Key::Char(' ') => Self::Paint,
            Key::Char('s') => Self::Start { fast: false },
            Key::Char('f') => Self::Start { fast: true },
            Key::Char('x') => Self::Stop,
            Key::Char('r') => Self::Randomize,
            Key::Char('n') => Self::NewGame,
            Key::Char('m') => Self::ToggleMulticolour,
            Key::Char('c') => Self::NextColor,
            Key::Char('l') => Self::SwitchLanguage,
            Key::Char(':') => Self::Prompt,
            _ => return None,
        };
        Some(command)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    English,
    French,
}

pub struct Labels {
    pub exec: &'static str,
    pub idle: &'static str,
    pub running: &'static str,
    pub stopping: &'static str,
    pub rule: &'static str,
    pub steps: &'static str,
    pub color: &'static str,
    pub multicolour: &'static str,
    pub help: &'static str,
    pub prompt: &'static str,
}

impl Language {
    pub fn labels(self) -> Labels {
        match self {
            Self::English => Labels {
                exec: "Exec",
                idle: "idle",
                running: "running",
                stopping: "stopping",
                rule: "rule",
                steps: "steps",
                color: "color",
                multicolour: "multicolour",
                help: "arrows move, space paint, s start, f solution, x stop, r random, n new, m multicolour, c color, l language, : command, q quit",
                prompt: "rule <18 bits> | steps <n>",
            },
            Self::French => Labels {
                exec: "Exéc",
                idle: "arrêté",
                running: "en cours",
                stopping: "arrêt",
                rule: "règle",
                steps: "étapes",
                color: "couleur",
                multicolour: "multicolore",
                help: "flèches déplacer, espace peindre, s démarrer, f solution, x arrêter, r aléatoire, n nouveau, m multicolore, c couleur, l langue, : commande, q quitter",
                prompt: "rule <18 bits> | steps <n>",
            },
        }
    }

    fn other(self) -> Self {
        match self {
            Self::English => Self::French,
            Self::French => Self::English,
        }
    }
}

/// what the view remembers between two refreshes.
#[derive(Debug, Clone)]
pub struct ViewState {
    pub cursor: Pos,
    pub origin: Pos,
    pub language: Language,
    pub steps: String,
    pub color_index: usize,
    /// text typed after `:`, if a command is being typed.
    pub prompt: Option<String>,
    pub notice: Option<String>,
}

impl ViewState {
    pub fn new(config: &Config) -> Self {
        Self {
            cursor: pos!(config.rows / 2, config.cols / 2),
            origin: pos!(0, 0),
            language: Language::English,
            steps: config.steps.clone(),
            color_index: 0,
            prompt: None,
            notice: None,
        }
    }
}

fn input_loop(sender: mpsc::Sender<Key>) {
    for key in stdin().keys() {
        let Ok(key) = key else { continue };
        if sender.send(key).is_err() {
            break;
        }
    }
}

fn view_loop(handle: SimHandle, mut state: ViewState, refresh: Duration) -> anyhow::Result<()> {
    let mut stdout = stdout()
        .into_raw_mode()
        .context("cannot switch the terminal to raw mode")?;
    let (sender, receiver) = mpsc::channel();
    let _input_handle = thread::spawn(|| input_loop(sender));

    loop {
        let frame = handle.snapshot()?;
        while let Ok(key) = receiver.try_recv() {
            if !handle_key(&handle, &mut state, &frame, key)? {
                write!(stdout, "{}{}", termion::clear::All, termion::cursor::Goto(1, 1))?;
                stdout.flush()?;
                return Ok(());
            }
        }
        let frame = handle.snapshot()?;
        let (width, height) = termion::terminal_size().context("cannot read the terminal size")?;
        let canvas = Canvas::render(&frame, &mut state, width as usize, height as usize);
        canvas.display(&mut stdout)?;
        thread::sleep(refresh);
    }
}

/// returns false when the view should close.
fn handle_key(
    handle: &SimHandle,
    state: &mut ViewState,
    frame: &Frame,
    key: Key,
) -> anyhow::Result<bool> {
    if let Some(line) = state.prompt.as_mut() {
        match key {
            Key::Char('\n') => {
                let line = line.clone();
                state.prompt = None;
                run_prompt(handle, state, &line)?;
            }
            Key::Esc => state.prompt = None,
            Key::Backspace => {
                line.pop();
            }
            Key::Char(char) => line.push(char),
            _ => (),
        }
        return Ok(true);
    }

    let Some(command) = InputCmd::from_key(key) else {
        return Ok(true);
    };
    let (rows, cols) = frame.grid.dims();
    state.notice = None;
    match command {
        InputCmd::Exit => return Ok(false),
        InputCmd::Move(direction) => {
            let (d_row, d_col) = match direction {
                Dir::Up => (-1, 0),
                Dir::Down => (1, 0),
                Dir::Left => (0, -1),
                Dir::Right => (0, 1),
            };
            state.cursor = state.cursor.shifted(d_row, d_col, rows, cols);
        }
        InputCmd::Paint => handle.send(SimCmd::Toggle(state.cursor))?,
        InputCmd::Start { fast } => {
            if let Err(error) = handle.start(&state.steps, fast) {
                state.notice = Some(error.to_string());
            }
        }
        InputCmd::Stop => handle.send(SimCmd::Stop)?,
        InputCmd::Randomize => handle.send(SimCmd::Randomize)?,
        InputCmd::NewGame => handle.send(SimCmd::Clear)?,
        InputCmd::ToggleMulticolour => handle.send(SimCmd::ToggleMulticolour)?,
        InputCmd::NextColor => {
            state.color_index = (state.color_index + 1) % PAINT_CYCLE.len();
            handle.send(SimCmd::SetColor(PAINT_CYCLE[state.color_index]))?;
        }
        InputCmd::SwitchLanguage => {
            state.language = state.language.other();
            handle.send(SimCmd::ResetRun)?;
        }
        InputCmd::Prompt => state.prompt = Some(String::new()),
    }
    Ok(true)
}

fn run_prompt(handle: &SimHandle, state: &mut ViewState, line: &str) -> anyhow::Result<()> {
    let mut words = line.split_whitespace();
    match (words.next(), words.next()) {
        (Some("rule"), Some(descriptor)) => handle.send(SimCmd::SetRule(descriptor.to_string()))?,
        (Some("steps"), Some(steps)) => state.steps = steps.to_string(),
        (Some("color"), Some(color)) => match color.parse() {
            Ok(color) => handle.send(SimCmd::SetColor(color))?,
            Err(error) => state.notice = Some(error.to_string()),
        },
        _ => state.notice = Some(format!("? {line}")),
    }
    Ok(())
}

pub fn state_label(labels: &Labels, state: RunState) -> &'static str {
    match state {
        RunState::Idle => labels.idle,
        RunState::Running { .. } => labels.running,
        RunState::Stopping => labels.stopping,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_keys() {
        assert_eq!(InputCmd::from_key(Key::Char('q')), Some(InputCmd::Exit));
        assert_eq!(
            InputCmd::from_key(Key::Char('f')),
            Some(InputCmd::Start { fast: true })
        );
        assert_eq!(InputCmd::from_key(Key::Left), Some(InputCmd::Move(Dir::Left)));
        assert_eq!(InputCmd::from_key(Key::Char('z')), None);
    }

    #[test]
    fn languages_swap() {
        assert_eq!(Language::English.other(), Language::French);
        assert_eq!(Language::French.labels().exec, "Exéc");
        assert_eq!(state_label(&Language::English.labels(), RunState::Idle), "idle");
    }
}
