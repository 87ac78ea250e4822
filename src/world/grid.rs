use crate::{color::Rgb, pos, Cell, Error, Pos, Result};

/// fixed size rectangle of cells, stored row after row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// creates a fully dead grid.
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(Error::InvalidDimensions { rows, cols });
        }
        Ok(Self {
            rows,
            cols,
            cells: vec![Cell::dead(); rows * cols],
        })
    }

    /// creates a grid from `rows` lines of `cols` characters, `#` for live cells.
    pub fn from_pattern(pattern: &str, color: Rgb) -> Result<Self> {
        let lines: Vec<&str> = pattern.lines().collect();
        let rows = lines.len();
        let cols = lines.iter().map(|line| line.chars().count()).max().unwrap_or(0);
        let mut grid = Self::new(rows, cols)?;
        for (row, line) in lines.iter().enumerate() {
            for (col, char) in line.chars().enumerate() {
                if char == '#' {
                    grid.set(pos!(row, col), Cell::alive(color))?;
                }
            }
        }
        Ok(grid)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn dims(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    fn index(&self, Pos { row, col }: Pos) -> Option<usize> {
        (row < self.rows && col < self.cols).then(|| row * self.cols + col)
    }

    fn out_of_bounds(&self, pos: Pos) -> Error {
        Error::OutOfBounds {
            pos,
            rows: self.rows,
            cols: self.cols,
        }
    }

    pub fn get(&self, pos: Pos) -> Result<Cell> {
        self.index(pos)
            .map(|index| self.cells[index])
            .ok_or_else(|| self.out_of_bounds(pos))
    }

    pub fn set(&mut self, pos: Pos, cell: Cell) -> Result<()> {
        let index = self.index(pos).ok_or_else(|| self.out_of_bounds(pos))?;
        self.cells[index] = cell;
        Ok(())
    }

    pub fn is_alive(&self, pos: Pos) -> bool {
        self.get(pos).map(|cell| cell.is_alive()).unwrap_or(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Pos, &Cell)> + '_ {
        let cols = self.cols;
        self.cells
            .iter()
            .enumerate()
            .map(move |(index, cell)| (pos!(index / cols, index % cols), cell))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Cell> + '_ {
        self.cells.iter_mut()
    }

    pub fn actives(&self) -> Vec<Pos> {
        self.iter()
            .filter_map(|(pos, cell)| cell.is_alive().then_some(pos))
            .collect()
    }

    pub fn population(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_alive()).count()
    }

    /// alive/dead state of every cell, row after row.
    pub fn liveness(&self) -> Vec<bool> {
        self.cells.iter().map(Cell::is_alive).collect()
    }

    pub fn ensure_dims(&self, expected: (usize, usize)) -> Result<()> {
        if self.dims() == expected {
            Ok(())
        } else {
            Err(Error::DimensionMismatch {
                expected,
                got: self.dims(),
            })
        }
    }
}
