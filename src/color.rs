use std::{fmt, str::FromStr};

use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

pub const WHITE: Rgb = Rgb::new(255, 255, 255);
pub const BLACK: Rgb = Rgb::new(0, 0, 0);
pub const RED: Rgb = Rgb::new(255, 0, 0);
pub const GREEN: Rgb = Rgb::new(0, 255, 0);
pub const BLUE: Rgb = Rgb::new(0, 0, 255);
pub const YELLOW: Rgb = Rgb::new(255, 255, 0);
pub const MAGENTA: Rgb = Rgb::new(255, 0, 255);
pub const CYAN: Rgb = Rgb::new(0, 255, 255);

/// color of a live cell in multicolour mode, indexed by its live neighbor count.
pub const NEIGHBOR_PALETTE: [Rgb; 9] = [
    RED,
    GREEN,
    BLUE,
    YELLOW,
    MAGENTA,
    CYAN,
    Rgb::new(0x5a, 0xa1, 0xd6),
    Rgb::new(0xe6, 0x98, 0x73),
    Rgb::new(0x8e, 0x7c, 0xc3),
];

/// paint colors the terminal view cycles through.
pub const PAINT_CYCLE: [Rgb; 7] = [BLACK, RED, GREEN, BLUE, YELLOW, MAGENTA, CYAN];

pub fn palette_color(neighbor_count: usize) -> Rgb {
    NEIGHBOR_PALETTE[neighbor_count.min(NEIGHBOR_PALETTE.len() - 1)]
}

impl FromStr for Rgb {
    type Err = Error;

    /// accepts `#rrggbb` or `rrggbb`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::InvalidColor(s.to_string()));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| Error::InvalidColor(s.to_string()))
        };
        Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}
