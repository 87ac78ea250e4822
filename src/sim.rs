use std::{
    sync::mpsc::{self, RecvTimeoutError},
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use log::{debug, info, trace, warn};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::{
    automaton,
    color::{Rgb, BLACK},
    config::{Config, RunTiming},
    rule::{self, RuleCache},
    Cell, Error, Grid, Pos, Result,
};

pub use control::{Control, RunState, Tick};
mod control;

/// everything a simulation needs between two generations.
#[derive(Debug)]
pub struct Session {
    grid: Grid,
    descriptor: String,
    rules: RuleCache,
    color: Rgb,
    multicolour: bool,
    fill_rate: f64,
    rng: ChaCha8Rng,
    control: Control,
}

impl Session {
    pub fn new(config: &Config) -> Result<Self> {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Ok(Self {
            grid: Grid::new(config.rows, config.cols)?,
            descriptor: rule::sanitize(&config.rule),
            rules: RuleCache::default(),
            color: config.color,
            multicolour: false,
            fill_rate: config.fill_rate,
            rng,
            control: Control::new(config.timing.render_stride),
        })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// swaps in a grid of the same dimensions.
    pub fn replace_grid(&mut self, grid: Grid) -> Result<()> {
        grid.ensure_dims(self.grid.dims())?;
        self.grid = grid;
        self.refresh_colors();
        Ok(())
    }

    pub fn descriptor(&self) -> &str {
        &self.descriptor
    }

    /// stores a new rule, malformed ones are replaced by the default rule.
    pub fn set_rule(&mut self, descriptor: &str) {
        self.descriptor = rule::sanitize(descriptor);
        info!("rule set to {}", self.descriptor);
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    /// selects the paint color and repaints every live cell with it.
    pub fn set_color(&mut self, color: Rgb) {
        debug!("paint color set to {color}");
        self.color = color;
        self.grid = automaton::recolor_all(&self.grid, color);
    }

    pub fn multicolour(&self) -> bool {
        self.multicolour
    }

    /// leaving multicolour mode paints live cells with the selected color,
    /// their colors from before are not restored. black cells are kept.
    pub fn set_multicolour(&mut self, enabled: bool) {
        self.multicolour = enabled;
        self.grid = if enabled {
            automaton::color_by_neighbor_count(&self.grid)
        } else {
            automaton::recolor_where(&self.grid, self.color, |cell| cell.color() != BLACK)
        };
    }

    pub fn toggle_multicolour(&mut self) {
        self.set_multicolour(!self.multicolour);
    }

    fn refresh_colors(&mut self) {
        if self.multicolour {
            self.grid = automaton::color_by_neighbor_count(&self.grid);
        }
    }

    /// flips a cell by hand. returns false when a run forbids editing.
    pub fn toggle(&mut self, pos: Pos) -> Result<bool> {
        if !self.control.is_idle() {
            debug!("ignoring edit of {pos} during a run");
            return Ok(false);
        }
        let cell = if self.grid.get(pos)?.is_alive() {
            Cell::dead()
        } else {
            Cell::alive(self.color)
        };
        self.grid.set(pos, cell)?;
        self.refresh_colors();
        Ok(true)
    }

    /// stops any run and fills the grid at random.
    pub fn randomize(&mut self) {
        self.control.request_stop();
        self.control.settle();
        self.grid = automaton::randomize(&self.grid, self.color, self.fill_rate, &mut self.rng);
        self.refresh_colors();
        info!("random fill, {} live cells", self.grid.population());
    }

    /// empties the grid and zeroes the generation counter.
    pub fn clear(&mut self) {
        self.control.reset();
        self.grid = automaton::clear(&self.grid);
        info!("new game");
    }

    /// returns to idle with a zeroed counter, keeping the cells.
    pub fn reset_run(&mut self) {
        self.control.reset();
        debug!("run reset, grid kept");
    }

    pub fn start(&mut self, steps: &str, skip_intermediate: bool) -> Result<()> {
        self.control.start(steps, skip_intermediate)
    }

    pub fn stop(&mut self) {
        self.control.request_stop();
    }

    pub fn control(&self) -> &Control {
        &self.control
    }

    pub fn generation(&self) -> u64 {
        self.control.generation()
    }

    /// computes one generation if a run is in progress.
    pub fn tick(&mut self) -> Result<Option<Tick>> {
        if !self.control.is_running() {
            self.control.settle();
            return Ok(None);
        }
        let rules = self.rules.get(&self.descriptor)?;
        let Some(tick) = self.control.tick() else {
            return Ok(None);
        };
        self.grid = automaton::step(&self.grid, &rules, self.color);
        self.refresh_colors();
        trace!("generation {}: {} live cells", tick.generation, self.grid.population());
        Ok(Some(tick))
    }

    pub fn frame(&self) -> Frame {
        Frame {
            grid: self.grid.clone(),
            generation: self.generation(),
            state: self.control.state(),
            color: self.color,
            multicolour: self.multicolour,
            descriptor: self.descriptor.clone(),
        }
    }
}

/// what the view gets to display.
#[derive(Debug, Clone)]
pub struct Frame {
    pub grid: Grid,
    pub generation: u64,
    pub state: RunState,
    pub color: Rgb,
    pub multicolour: bool,
    pub descriptor: String,
}

pub enum SimCmd {
    Snapshot(mpsc::Sender<Frame>),
    Start {
        steps: String,
        fast: bool,
        reply: mpsc::Sender<Result<()>>,
    },
    Stop,
    Toggle(Pos),
    Randomize,
    Clear,
    ResetRun,
    SetRule(String),
    SetColor(Rgb),
    SetMulticolour(bool),
    ToggleMulticolour,
    Exit,
}

#[derive(Clone)]
pub struct SimHandle {
    sender: mpsc::Sender<SimCmd>,
}

impl SimHandle {
    pub fn new(sender: mpsc::Sender<SimCmd>) -> Self {
        Self { sender }
    }

    pub fn send(&self, cmd: SimCmd) -> Result<()> {
        self.sender.send(cmd).map_err(|_| Error::Disconnected)
    }

    pub fn snapshot(&self) -> Result<Frame> {
        let (sender, receiver) = mpsc::channel();
        self.send(SimCmd::Snapshot(sender))?;
        receiver.recv().map_err(|_| Error::Disconnected)
    }

    pub fn start(&self, steps: &str, fast: bool) -> Result<()> {
        let (reply, receiver) = mpsc::channel();
        self.send(SimCmd::Start {
            steps: steps.to_string(),
            fast,
            reply,
        })?;
        receiver.recv().map_err(|_| Error::Disconnected)?
    }
}

/// owns the session on a worker thread and ticks it on a fixed period.
#[derive(Debug)]
pub struct Sim {
    thread: JoinHandle<()>,
    sender: mpsc::Sender<SimCmd>,
}

impl Sim {
    pub fn spawn(session: Session, timing: RunTiming) -> Self {
        let (sender, receiver) = mpsc::channel();
        let thread = thread::spawn(move || sim_loop(receiver, session, timing));
        Self { thread, sender }
    }

    pub fn handle(&self) -> SimHandle {
        SimHandle::new(self.sender.clone())
    }

    pub fn join(self) -> Result<()> {
        let _ = self.sender.send(SimCmd::Exit);
        self.thread.join().map_err(|_| Error::Disconnected)
    }
}

const EVT_CHECK_TIMEOUT: Duration = Duration::from_millis(10);

fn sim_loop(receiver: mpsc::Receiver<SimCmd>, mut session: Session, timing: RunTiming) {
    let mut published = session.frame();
    let mut last_tick = Instant::now();

    loop {
        let period = if session.control().is_fast() {
            timing.fast
        } else {
            timing.normal
        };
        let timeout = if session.control().is_running() {
            period.saturating_sub(last_tick.elapsed()).min(EVT_CHECK_TIMEOUT)
        } else {
            EVT_CHECK_TIMEOUT
        };

        match receiver.recv_timeout(timeout) {
            Ok(SimCmd::Exit) | Err(RecvTimeoutError::Disconnected) => break,
            Ok(SimCmd::Snapshot(sender)) => {
                let _ = sender.send(published.clone());
            }
            Ok(cmd) => {
                if handle_cmd(&mut session, cmd) {
                    last_tick = Instant::now();
                }
                published = session.frame();
            }
            Err(RecvTimeoutError::Timeout) => (),
        }

        if session.control().is_running() && last_tick.elapsed() >= period {
            last_tick = Instant::now();
            match session.tick() {
                Ok(Some(tick)) if tick.render => published = session.frame(),
                Ok(_) => (),
                Err(error) => {
                    warn!("stopping run: {error}");
                    session.stop();
                    session.tick().ok();
                    published = session.frame();
                }
            }
        }
    }
    debug!("simulation worker exiting");
}

/// applies a command, returns true when a run was started.
fn handle_cmd(session: &mut Session, cmd: SimCmd) -> bool {
    match cmd {
        SimCmd::Start { steps, fast, reply } => {
            let result = session.start(&steps, fast);
            let started = result.is_ok();
            if let Err(error) = &result {
                debug!("cannot start: {error}");
            }
            let _ = reply.send(result);
            return started;
        }
        SimCmd::Stop => {
            session.stop();
            session.tick().ok();
        }
        SimCmd::Toggle(pos) => {
            if let Err(error) = session.toggle(pos) {
                warn!("cannot paint: {error}");
            }
        }
        SimCmd::Randomize => session.randomize(),
        SimCmd::Clear => session.clear(),
        SimCmd::ResetRun => session.reset_run(),
        SimCmd::SetRule(descriptor) => session.set_rule(&descriptor),
        SimCmd::SetColor(color) => session.set_color(color),
        SimCmd::SetMulticolour(enabled) => session.set_multicolour(enabled),
        SimCmd::ToggleMulticolour => session.toggle_multicolour(),
        SimCmd::Snapshot(_) | SimCmd::Exit => (),
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        color::{NEIGHBOR_PALETTE, RED},
        pos,
    };

    fn config() -> Config {
        Config {
            rows: 5,
            cols: 5,
            seed: Some(1),
            timing: RunTiming {
                normal: Duration::from_millis(1),
                fast: Duration::from_millis(1),
                render_stride: 50,
            },
            ..Config::default()
        }
    }

    fn blinker_session() -> Session {
        let mut session = Session::new(&config()).unwrap();
        for col in 1..=3 {
            session.toggle(pos!(2, col)).unwrap();
        }
        session
    }

    #[test]
    fn ticks_follow_the_rule() {
        let mut session = blinker_session();
        assert_eq!(session.tick().unwrap(), None);
        session.start("2", false).unwrap();
        session.tick().unwrap().unwrap();
        assert_eq!(session.grid().actives(), vec![pos!(1, 2), pos!(2, 2), pos!(3, 2)]);
        let tick = session.tick().unwrap().unwrap();
        assert!(tick.finished);
        assert_eq!(session.grid().actives(), vec![pos!(2, 1), pos!(2, 2), pos!(2, 3)]);
        assert!(session.control().is_idle());
    }

    #[test]
    fn edits_only_when_idle() {
        let mut session = blinker_session();
        session.start("10", false).unwrap();
        assert!(!session.toggle(pos!(0, 0)).unwrap());
        assert!(!session.grid().is_alive(pos!(0, 0)));
        session.stop();
        session.tick().unwrap();
        assert!(session.toggle(pos!(0, 0)).unwrap());
        assert!(session.grid().is_alive(pos!(0, 0)));
        assert!(session.toggle(pos!(9, 9)).is_err());
    }

    #[test]
    fn malformed_rule_falls_back() {
        let mut session = blinker_session();
        session.set_rule("11");
        assert_eq!(session.descriptor(), rule::DEFAULT_DESCRIPTOR);
        session.set_rule("000000000111111111");
        session.start("1", false).unwrap();
        let before = session.grid().clone();
        session.tick().unwrap();
        assert_eq!(session.grid(), &before);
    }

    #[test]
    fn colors_follow_the_mode() {
        let mut session = blinker_session();
        session.set_multicolour(true);
        assert_eq!(session.grid().get(pos!(2, 2)).unwrap().color(), NEIGHBOR_PALETTE[2]);
        assert_eq!(session.grid().get(pos!(2, 1)).unwrap().color(), NEIGHBOR_PALETTE[1]);

        session.start("1", false).unwrap();
        session.tick().unwrap();
        assert_eq!(session.grid().get(pos!(1, 2)).unwrap().color(), NEIGHBOR_PALETTE[1]);

        session.set_color(RED);
        session.set_multicolour(false);
        assert!(session
            .grid()
            .iter()
            .all(|(_, cell)| !cell.is_alive() || cell.color() == RED));
    }

    #[test]
    fn reset_keeps_cells() {
        let mut session = blinker_session();
        session.start("1", false).unwrap();
        session.tick().unwrap();
        let grid = session.grid().clone();
        session.reset_run();
        assert_eq!(session.generation(), 0);
        assert_eq!(session.grid(), &grid);

        session.clear();
        assert_eq!(session.grid().population(), 0);
    }

    #[test]
    fn reset_interrupts_a_run() {
        let mut session = blinker_session();
        session.start("10", false).unwrap();
        session.tick().unwrap();
        let grid = session.grid().clone();
        session.reset_run();
        assert!(session.control().is_idle());
        assert_eq!(session.generation(), 0);
        assert_eq!(session.grid(), &grid);
        assert_eq!(session.tick().unwrap(), None);
    }

    #[test]
    fn randomize_interrupts_a_run() {
        let mut session = blinker_session();
        session.start("10", true).unwrap();
        session.tick().unwrap();
        session.randomize();
        assert!(session.control().is_idle());
        assert_eq!(session.tick().unwrap(), None);
    }

    #[test]
    fn multicolour_toggles_back_and_forth() {
        let mut session = blinker_session();
        session.toggle_multicolour();
        assert!(session.multicolour());
        session.toggle_multicolour();
        assert!(!session.multicolour());
        assert!(session
            .grid()
            .iter()
            .all(|(_, cell)| !cell.is_alive() || cell.color() == BLACK));
    }

    #[test]
    fn worker_applies_each_multicolour_toggle() {
        let sim = Sim::spawn(blinker_session(), config().timing);
        let handle = sim.handle();
        handle.send(SimCmd::ToggleMulticolour).unwrap();
        handle.send(SimCmd::ToggleMulticolour).unwrap();
        assert!(!handle.snapshot().unwrap().multicolour);
        handle.send(SimCmd::ToggleMulticolour).unwrap();
        assert!(handle.snapshot().unwrap().multicolour);
        sim.join().unwrap();
    }

    #[test]
    fn replace_checks_dims() {
        let mut session = blinker_session();
        assert!(matches!(
            session.replace_grid(Grid::new(4, 5).unwrap()),
            Err(Error::DimensionMismatch { .. })
        ));
        assert!(session.replace_grid(Grid::new(5, 5).unwrap()).is_ok());
        assert_eq!(session.grid().population(), 0);
    }

    #[test]
    fn randomize_is_seeded() {
        let mut a = Session::new(&config()).unwrap();
        let mut b = Session::new(&config()).unwrap();
        a.randomize();
        b.randomize();
        assert_eq!(a.grid(), b.grid());
    }

    #[test]
    fn worker_runs_to_completion() {
        let sim = Sim::spawn(blinker_session(), config().timing);
        let handle = sim.handle();
        assert!(matches!(handle.start("many", false), Err(Error::InvalidStepCount(_))));
        handle.start("3", false).unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        let frame = loop {
            let frame = handle.snapshot().unwrap();
            if frame.generation == 3 && frame.state == RunState::Idle {
                break frame;
            }
            assert!(Instant::now() < deadline, "run did not finish");
            thread::sleep(Duration::from_millis(5));
        };
        assert_eq!(frame.grid.actives(), vec![pos!(1, 2), pos!(2, 2), pos!(3, 2)]);

        handle.send(SimCmd::Clear).unwrap();
        let frame = handle.snapshot().unwrap();
        assert_eq!(frame.generation, 0);
        assert_eq!(frame.grid.population(), 0);
        sim.join().unwrap();
    }
}
