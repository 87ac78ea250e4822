use crate::color::{Rgb, WHITE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    alive: bool,
    color: Rgb,
}

impl Cell {
    pub fn alive(color: Rgb) -> Self {
        Self { alive: true, color }
    }

    pub fn dead() -> Self {
        Self {
            alive: false,
            color: WHITE,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// dead cells are always white.
    pub fn color(&self) -> Rgb {
        self.color
    }

    /// recolors a live cell, dead cells stay as they are.
    pub fn painted(self, color: Rgb) -> Self {
        if self.alive {
            Self::alive(color)
        } else {
            self
        }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Cell::dead()
    }
}

pub use grid::Grid;
mod grid;
