use std::io::{self, Write};

use termion::color::{Bg, Fg, Reset, Rgb as TermRgb};

use crate::{
    color::{Rgb, BLACK, WHITE},
    pos,
    sim::Frame,
    Pos,
};

use super::{state_label, ViewState};

/// each cell takes two terminal columns so cells look square.
const CELL_WIDTH: usize = 2;
/// lines kept below the grid for the status.
const STATUS_LINES: usize = 3;

pub struct Canvas {
    lines: Vec<String>,
}

impl Canvas {
    /// lays out `frame` in a `width` x `height` terminal, scrolling the
    /// viewport of `state` so the cursor stays visible.
    pub fn render(frame: &Frame, state: &mut ViewState, width: usize, height: usize) -> Self {
        let visible_rows = height.saturating_sub(STATUS_LINES).max(1);
        let visible_cols = (width / CELL_WIDTH).max(1);
        state.origin = follow(state.origin, state.cursor, visible_rows, visible_cols);

        let grid = &frame.grid;
        let mut lines = Vec::new();
        let rows = state.origin.row..grid.rows().min(state.origin.row + visible_rows);
        for row in rows {
            let mut line = String::new();
            let cols = state.origin.col..grid.cols().min(state.origin.col + visible_cols);
            for col in cols {
                let pos = pos!(row, col);
                let color = grid.get(pos).map(|cell| cell.color()).unwrap_or(WHITE);
                let glyph = if pos == state.cursor { "[]" } else { "  " };
                line += &format!("{}{}{}", Bg(term(color)), Fg(term(contrast(color))), glyph);
            }
            line += &format!("{}{}", Bg(Reset), Fg(Reset));
            lines.push(line);
        }

        let labels = state.language.labels();
        lines.push(format!(
            "{}: {} | {} | {} {} | {} {} | {} {} | {} {}",
            labels.exec,
            frame.generation,
            state_label(&labels, frame.state),
            labels.rule,
            frame.descriptor,
            labels.steps,
            state.steps,
            labels.color,
            frame.color,
            labels.multicolour,
            if frame.multicolour { "on" } else { "off" },
        ));
        lines.push(match (&state.prompt, &state.notice) {
            (Some(prompt), _) => format!(":{prompt}    ({})", labels.prompt),
            (None, Some(notice)) => notice.clone(),
            (None, None) => String::new(),
        });
        lines.push(truncate(labels.help, width));

        Self { lines }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn display(&self, out: &mut impl Write) -> io::Result<()> {
        let clear = termion::clear::All;
        write!(out, "{clear}")?;
        for (index, line) in self.lines.iter().enumerate() {
            let goto = termion::cursor::Goto(1, index as u16 + 1);
            write!(out, "{goto}{line}")?;
        }
        out.flush()
    }
}

fn term(Rgb { r, g, b }: Rgb) -> TermRgb {
    TermRgb(r, g, b)
}

/// black or white, whichever reads better over the given color.
fn contrast(Rgb { r, g, b }: Rgb) -> Rgb {
    let luma = 299 * r as u32 + 587 * g as u32 + 114 * b as u32;
    if luma > 128_000 {
        BLACK
    } else {
        WHITE
    }
}

/// moves `origin` the least so that `cursor` falls inside the viewport.
fn follow(origin: Pos, cursor: Pos, rows: usize, cols: usize) -> Pos {
    let axis = |origin: usize, cursor: usize, len: usize| {
        if cursor < origin {
            cursor
        } else if cursor >= origin + len {
            cursor + 1 - len
        } else {
            origin
        }
    };
    pos!(axis(origin.row, cursor.row, rows), axis(origin.col, cursor.col, cols))
}

fn truncate(text: &str, width: usize) -> String {
    text.chars().take(width).collect()
}
