use std::fmt;

/// position of a cell, row-major.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Default)]
pub struct Pos {
    pub row: usize,
    pub col: usize,
}

#[macro_export]
macro_rules! pos {
    ($row:expr, $col:expr) => {
        $crate::Pos {
            row: $row,
            col: $col,
        }
    };
}

impl Pos {
    /// moves by the given offset, staying inside `rows` x `cols`.
    pub fn shifted(self, d_row: isize, d_col: isize, rows: usize, cols: usize) -> Self {
        let row = clamp_add(self.row, d_row, rows);
        let col = clamp_add(self.col, d_col, cols);
        pos!(row, col)
    }
}

fn clamp_add(n: usize, delta: isize, len: usize) -> usize {
    let max = len.saturating_sub(1);
    if delta < 0 {
        n.saturating_sub(delta.unsigned_abs())
    } else {
        n.saturating_add(delta as usize).min(max)
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[test]
fn test_shifted() {
    assert_eq!(pos!(0, 0).shifted(-1, -1, 5, 5), pos!(0, 0));
    assert_eq!(pos!(2, 2).shifted(1, -1, 5, 5), pos!(3, 1));
    assert_eq!(pos!(4, 4).shifted(4, 4, 5, 5), pos!(4, 4));
}
