//! a generalized game of life engine with colored cells.
//!
//! rules are given as 18 binary characters: the first 9 say at which live
//! neighbor counts a dead cell is born, the last 9 at which counts a live
//! cell survives. `000100000001100000` is conway's B3/S23.

pub use utils::Pos;
mod utils;

pub use error::{Error, Result};
mod error;

pub mod color;

pub use rule::RuleSet;
pub mod rule;

pub use world::{Cell, Grid};
pub mod world;

pub mod automaton;

pub mod config;

pub use sim::{Session, Sim, SimHandle};
pub mod sim;

pub use view::View;
pub mod view;
