use log::{debug, info};

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running { target: u64, skip_intermediate: bool },
    Stopping,
}

/// what a tick did, and whether the result should be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub generation: u64,
    pub render: bool,
    pub finished: bool,
}

/// run/stop bookkeeping for a session.
///
/// the generation counter accumulates over successive runs and is only
/// cleared by [`Control::reset`].
#[derive(Debug, Clone)]
pub struct Control {
    state: RunState,
    counter: u64,
    render_stride: u64,
}

impl Control {
    pub fn new(render_stride: u64) -> Self {
        Self {
            state: RunState::Idle,
            counter: 0,
            render_stride: render_stride.max(1),
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == RunState::Idle
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, RunState::Running { .. })
    }

    pub fn is_fast(&self) -> bool {
        matches!(
            self.state,
            RunState::Running {
                skip_intermediate: true,
                ..
            }
        )
    }

    pub fn generation(&self) -> u64 {
        self.counter
    }

    /// starts running until the counter reaches `steps`.
    pub fn start(&mut self, steps: &str, skip_intermediate: bool) -> Result<()> {
        if !self.is_idle() {
            return Err(Error::AlreadyRunning);
        }
        let target = parse_steps(steps)?;
        info!("running until generation {target} (fast: {skip_intermediate})");
        self.state = RunState::Running {
            target,
            skip_intermediate,
        };
        Ok(())
    }

    pub fn request_stop(&mut self) {
        if self.is_running() {
            debug!("stop requested at generation {}", self.counter);
            self.state = RunState::Stopping;
        }
    }

    /// advances the counter by one generation if running.
    /// returns `None` when no generation should be computed.
    pub fn tick(&mut self) -> Option<Tick> {
        let RunState::Running {
            target,
            skip_intermediate,
        } = self.state
        else {
            self.settle();
            return None;
        };
        self.counter += 1;
        let finished = self.counter >= target;
        let render = !skip_intermediate || finished || self.counter % self.render_stride == 0;
        if finished {
            info!("run finished at generation {}", self.counter);
            self.state = RunState::Idle;
        }
        Some(Tick {
            generation: self.counter,
            render,
            finished,
        })
    }

    /// completes a pending stop.
    pub fn settle(&mut self) {
        if self.state == RunState::Stopping {
            info!("run stopped at generation {}", self.counter);
            self.state = RunState::Idle;
        }
    }

    /// back to idle with a zeroed counter.
    pub fn reset(&mut self) {
        self.state = RunState::Idle;
        self.counter = 0;
    }
}

fn parse_steps(steps: &str) -> Result<u64> {
    steps
        .trim()
        .parse()
        .map_err(|_| Error::InvalidStepCount(steps.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_to_target() {
        let mut control = Control::new(50);
        control.start("3", false).unwrap();
        let ticks: Vec<_> = std::iter::from_fn(|| control.tick()).collect();
        assert_eq!(ticks.len(), 3);
        assert!(ticks.iter().all(|tick| tick.render));
        assert!(ticks[2].finished);
        assert_eq!(control.state(), RunState::Idle);
        assert_eq!(control.generation(), 3);
    }

    #[test]
    fn fast_mode_renders_every_stride() {
        let mut control = Control::new(50);
        control.start("120", true).unwrap();
        assert!(control.is_fast());
        let rendered: Vec<u64> = std::iter::from_fn(|| control.tick())
            .filter(|tick| tick.render)
            .map(|tick| tick.generation)
            .collect();
        assert_eq!(rendered, vec![50, 100, 120]);
    }

    #[test]
    fn rejects_bad_step_count() {
        let mut control = Control::new(50);
        assert_eq!(
            control.start("ten", false),
            Err(Error::InvalidStepCount("ten".to_string()))
        );
        assert!(control.start("", false).is_err());
        assert!(control.start("-4", false).is_err());
        assert!(control.is_idle());
    }

    #[test]
    fn stop_settles_to_idle() {
        let mut control = Control::new(50);
        control.start("10", false).unwrap();
        control.tick();
        assert_eq!(control.start("10", false), Err(Error::AlreadyRunning));
        control.request_stop();
        assert_eq!(control.state(), RunState::Stopping);
        assert_eq!(control.tick(), None);
        assert!(control.is_idle());
        assert_eq!(control.generation(), 1);
    }

    #[test]
    fn counter_accumulates_until_reset() {
        let mut control = Control::new(50);
        control.start("2", false).unwrap();
        while control.tick().is_some() {}
        control.start("2", false).unwrap();
        let tick = control.tick().unwrap();
        assert_eq!(tick.generation, 3);
        assert!(tick.finished);
        control.reset();
        assert_eq!(control.generation(), 0);
    }

    #[test]
    fn zero_steps_runs_once() {
        let mut control = Control::new(50);
        control.start("0", false).unwrap();
        assert!(control.tick().unwrap().finished);
        assert_eq!(control.tick(), None);
    }
}
