//! generation and recoloring of a [`Grid`].
//!
//! every transform reads one grid and writes a separate one, so neighbor
//! counts always come from the state before the transform.

use rand::Rng;

use crate::{
    color::{palette_color, Rgb},
    pos, Cell, Grid, Pos, Result, RuleSet,
};

/// live cells in the 3x3 window around `pos`, without the cell itself.
/// the window is clipped at the edges of the grid, it does not wrap.
pub fn count_live_neighbors(grid: &Grid, pos: Pos) -> Result<usize> {
    grid.get(pos)?;
    Ok(neighbor_count(grid, pos))
}

fn neighbor_count(grid: &Grid, Pos { row, col }: Pos) -> usize {
    let rows = row.saturating_sub(1)..=(row + 1).min(grid.rows() - 1);
    rows.flat_map(|r| {
        let cols = col.saturating_sub(1)..=(col + 1).min(grid.cols() - 1);
        cols.map(move |c| pos!(r, c))
    })
    .filter(|&p| p != pos!(row, col) && grid.is_alive(p))
    .count()
}

/// computes the next generation of `grid` under `rules`.
/// cells that are born take `color`, survivors keep theirs.
pub fn step(grid: &Grid, rules: &RuleSet, color: Rgb) -> Grid {
    let mut next = grid.clone();
    for (cell, (pos, current)) in next.iter_mut().zip(grid.iter()) {
        let count = neighbor_count(grid, pos);
        *cell = match current.is_alive() {
            true if rules.dies_at(count) => Cell::dead(),
            true => *current,
            false if rules.births_at(count) => Cell::alive(color),
            false => Cell::dead(),
        };
    }
    next
}

/// paints every live cell with the palette color of its neighbor count.
pub fn color_by_neighbor_count(grid: &Grid) -> Grid {
    let mut next = grid.clone();
    for (cell, (pos, current)) in next.iter_mut().zip(grid.iter()) {
        *cell = current.painted(palette_color(neighbor_count(grid, pos)));
    }
    next
}

/// paints every live cell with `color`.
pub fn recolor_all(grid: &Grid, color: Rgb) -> Grid {
    recolor_where(grid, color, |_| true)
}

/// paints the live cells matching `predicate` with `color`.
pub fn recolor_where(grid: &Grid, color: Rgb, predicate: impl Fn(&Cell) -> bool) -> Grid {
    let mut next = grid.clone();
    for cell in next.iter_mut() {
        if predicate(cell) {
            *cell = cell.painted(color);
        }
    }
    next
}

/// fills the grid at random, each cell being alive with a probability of `fill_rate`.
pub fn randomize(grid: &Grid, color: Rgb, fill_rate: f64, rng: &mut impl Rng) -> Grid {
    let fill_rate = fill_rate.clamp(0.0, 1.0);
    let mut next = grid.clone();
    for cell in next.iter_mut() {
        *cell = if rng.gen_bool(fill_rate) {
            Cell::alive(color)
        } else {
            Cell::dead()
        };
    }
    next
}

pub fn clear(grid: &Grid) -> Grid {
    let mut next = grid.clone();
    next.iter_mut().for_each(|cell| *cell = Cell::dead());
    next
}
