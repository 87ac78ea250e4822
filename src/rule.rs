use std::collections::HashMap;

use log::debug;
use metrohash::MetroBuildHasher;

use crate::{Error, Result};

/// conway's B3/S23.
pub const DEFAULT_DESCRIPTOR: &str = "000100000001100000";

pub const DESCRIPTOR_LEN: usize = 18;

/// neighbor counts go from 0 to 8.
const COUNTS: usize = 9;

/// transition sets derived from an 18 character binary descriptor.
///
/// the first 9 characters mark the neighbor counts at which a dead cell is
/// born, the last 9 mark the counts at which a live cell survives. a live cell
/// dies at every count it does not survive at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleSet {
    dead_to_alive: [bool; COUNTS],
    alive_to_dead: [bool; COUNTS],
}

impl RuleSet {
    pub fn parse(descriptor: &str) -> Result<Self> {
        validate(descriptor)?;
        let bits = descriptor.as_bytes();
        let mut dead_to_alive = [false; COUNTS];
        let mut alive_to_dead = [false; COUNTS];
        for count in 0..COUNTS {
            dead_to_alive[count] = bits[count] == b'1';
            alive_to_dead[count] = bits[COUNTS + count] == b'0';
        }
        Ok(Self {
            dead_to_alive,
            alive_to_dead,
        })
    }

    /// parses `descriptor`, falling back on [`DEFAULT_DESCRIPTOR`] when it is malformed.
    pub fn parse_or_default(descriptor: &str) -> Self {
        Self::parse(&sanitize(descriptor)).unwrap_or_else(|_| Self::life())
    }

    /// the rule encoded by [`DEFAULT_DESCRIPTOR`].
    pub fn life() -> Self {
        Self {
            dead_to_alive: [false, false, false, true, false, false, false, false, false],
            alive_to_dead: [true, true, false, false, true, true, true, true, true],
        }
    }

    pub fn births_at(&self, count: usize) -> bool {
        self.dead_to_alive.get(count).copied().unwrap_or(false)
    }

    pub fn dies_at(&self, count: usize) -> bool {
        self.alive_to_dead.get(count).copied().unwrap_or(false)
    }

    pub fn dead_to_alive(&self) -> Vec<usize> {
        members(&self.dead_to_alive)
    }

    pub fn alive_to_dead(&self) -> Vec<usize> {
        members(&self.alive_to_dead)
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::life()
    }
}

fn members(set: &[bool; COUNTS]) -> Vec<usize> {
    set.iter()
        .enumerate()
        .filter_map(|(count, &member)| member.then_some(count))
        .collect()
}

pub fn validate(descriptor: &str) -> Result<()> {
    let reason = if descriptor.chars().count() != DESCRIPTOR_LEN {
        "expected 18 characters"
    } else if !descriptor.chars().all(|c| c == '0' || c == '1') {
        "expected only '0' and '1'"
    } else {
        return Ok(());
    };
    Err(Error::InvalidRuleDescriptor {
        descriptor: descriptor.to_string(),
        reason,
    })
}

/// returns `descriptor` if it is well formed, the default descriptor otherwise.
pub fn sanitize(descriptor: &str) -> String {
    match validate(descriptor) {
        Ok(()) => descriptor.to_string(),
        Err(error) => {
            debug!("{error}, using {DEFAULT_DESCRIPTOR}");
            DEFAULT_DESCRIPTOR.to_string()
        }
    }
}

/// memoizes parsed rule sets by descriptor.
#[derive(Debug, Default)]
pub struct RuleCache {
    parsed: HashMap<String, RuleSet, MetroBuildHasher>,
}

impl RuleCache {
    pub fn get(&mut self, descriptor: &str) -> Result<RuleSet> {
        if let Some(rules) = self.parsed.get(descriptor) {
            return Ok(*rules);
        }
        let rules = RuleSet::parse(descriptor)?;
        self.parsed.insert(descriptor.to_string(), rules);
        Ok(rules)
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.parsed.len()
    }
}
