use std::time::Duration;

use log::Level;

use crate::{
    color::{Rgb, BLACK},
    rule::{self, DEFAULT_DESCRIPTOR},
    Error, Result,
};

/// tick periods of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunTiming {
    pub normal: Duration,
    pub fast: Duration,
    /// in fast runs, only every n-th generation is published.
    pub render_stride: u64,
}

impl Default for RunTiming {
    fn default() -> Self {
        Self {
            normal: Duration::from_millis(200),
            fast: Duration::from_millis(2),
            render_stride: 50,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub rows: usize,
    pub cols: usize,
    pub rule: String,
    pub color: Rgb,
    pub steps: String,
    pub fill_rate: f64,
    pub seed: Option<u64>,
    pub timing: RunTiming,
    pub view_refresh: Duration,
    pub log_level: Level,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rows: 50,
            cols: 50,
            rule: DEFAULT_DESCRIPTOR.to_string(),
            color: BLACK,
            steps: "100".to_string(),
            fill_rate: 0.25,
            seed: None,
            timing: RunTiming::default(),
            view_refresh: Duration::from_millis(100),
            log_level: Level::Error,
        }
    }
}

pub const USAGE: &str = "usage: chromalife [--rows N] [--cols N] [--rule DESCRIPTOR] \
[--color #rrggbb] [--steps N] [--fill RATE] [--seed N] [--log-level LEVEL]";

impl Config {
    /// reads options from command line arguments, program name excluded.
    pub fn from_args(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut config = Self::default();
        let mut args = args.into_iter();
        while let Some(flag) = args.next() {
            let mut value = || {
                args.next()
                    .ok_or_else(|| Error::InvalidArgument(format!("missing value for {flag}")))
            };
            match flag.as_str() {
                "--rows" => config.rows = parse_number(&flag, &value()?)?,
                "--cols" => config.cols = parse_number(&flag, &value()?)?,
                "--rule" => config.rule = rule::sanitize(&value()?),
                "--color" => config.color = value()?.parse()?,
                "--steps" => config.steps = value()?,
                "--fill" => config.fill_rate = parse_fill_rate(&value()?)?,
                "--seed" => config.seed = Some(parse_number(&flag, &value()?)?),
                "--log-level" => {
                    let level = value()?;
                    config.log_level = level
                        .parse()
                        .map_err(|_| Error::InvalidArgument(format!("unknown log level {level:?}")))?
                }
                _ => return Err(Error::InvalidArgument(format!("unknown option {flag:?}"))),
            }
        }
        if config.rows == 0 || config.cols == 0 {
            return Err(Error::InvalidDimensions {
                rows: config.rows,
                cols: config.cols,
            });
        }
        Ok(config)
    }
}

fn parse_number<T: std::str::FromStr>(flag: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| Error::InvalidArgument(format!("{flag} expects a number, got {value:?}")))
}

fn parse_fill_rate(value: &str) -> Result<f64> {
    match value.parse::<f64>() {
        Ok(rate) if (0.0..=1.0).contains(&rate) => Ok(rate),
        _ => Err(Error::InvalidArgument(format!(
            "--fill expects a rate between 0 and 1, got {value:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::RED;

    fn args(line: &str) -> Vec<String> {
        line.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn defaults() {
        let config = Config::from_args(Vec::new()).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!((config.rows, config.cols), (50, 50));
        assert_eq!(config.timing.normal, Duration::from_millis(200));
        assert_eq!(config.timing.fast, Duration::from_millis(2));
        assert_eq!(config.log_level, Level::Error);
    }

    #[test]
    fn overrides() {
        let config = Config::from_args(args(
            "--rows 10 --cols 20 --rule 001100000001100000 --color #ff0000 --steps 7 --fill 0.5 --seed 3 --log-level debug",
        ))
        .unwrap();
        assert_eq!((config.rows, config.cols), (10, 20));
        assert_eq!(config.rule, "001100000001100000");
        assert_eq!(config.color, RED);
        assert_eq!(config.steps, "7");
        assert_eq!(config.fill_rate, 0.5);
        assert_eq!(config.seed, Some(3));
        assert_eq!(config.log_level, Level::Debug);
    }

    #[test]
    fn malformed_rule_is_replaced() {
        let config = Config::from_args(args("--rule 0101")).unwrap();
        assert_eq!(config.rule, DEFAULT_DESCRIPTOR);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(Config::from_args(args("--rows")).is_err());
        assert!(Config::from_args(args("--rows many")).is_err());
        assert!(Config::from_args(args("--rows 0")).is_err());
        assert!(Config::from_args(args("--fill 2")).is_err());
        assert!(Config::from_args(args("--color blue")).is_err());
        assert!(Config::from_args(args("--speed 2")).is_err());
    }
}
