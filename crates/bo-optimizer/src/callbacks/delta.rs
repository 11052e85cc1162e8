//! # Delta convergence stopper
//!
//! Stops the run once recent objective values have clustered: the spread
//! `max(W) - min(W)` of the window `W` of the last `N` values falls at or
//! below `delta`.
//!
//! - With a window, the stopper votes continue until `N` values exist.
//! - Without a window, `W` is the whole history and the criterion is checked
//!   as soon as one value exists.
//! - `with_min_iterations(k)` keeps the stopper silent until `k` iterations
//!   have completed, which is how a stopper is attached part-way into a run.
//!
//! ```rust
//! use bo_optimizer::DeltaConvergenceStopper;
//!
//! let stopper = DeltaConvergenceStopper::new(0.01)?
//!     .with_window(5)?
//!     .with_min_iterations(20);
//! # Ok::<(), bo_types::ConfigError>(())
//! ```

use bo_types::{CallbackError, ConfigError};

use crate::callbacks::callback::{Callback, CallbackCommand};
use crate::state::OptimizationState;

#[derive(Debug, Clone, PartialEq)]
pub struct DeltaConvergenceStopper {
    delta: f64,
    window: Option<usize>,
    min_iterations: usize,
}

impl DeltaConvergenceStopper {
    /// Stopper over the whole history.
    pub fn new(delta: f64) -> Result<Self, ConfigError> {
        if !delta.is_finite() || delta < 0.0 {
            return Err(ConfigError::InvalidDelta { value: delta });
        }
        Ok(Self {
            delta,
            window: None,
            min_iterations: 0,
        })
    }

    /// Only consider the last `window` values.
    pub fn with_window(mut self, window: usize) -> Result<Self, ConfigError> {
        if window == 0 {
            return Err(ConfigError::EmptyWindow);
        }
        self.window = Some(window);
        Ok(self)
    }

    pub fn with_min_iterations(mut self, min_iterations: usize) -> Self {
        self.min_iterations = min_iterations;
        self
    }

    pub fn delta(&self) -> f64 {
        self.delta
    }

    pub fn window(&self) -> Option<usize> {
        self.window
    }

    /// Spread of the current window, or `None` while it is not yet full.
    pub fn spread(&self, state: &OptimizationState) -> Option<f64> {
        let records = state.records();
        let take = match self.window {
            Some(n) if records.len() < n => return None,
            Some(n) => n,
            None if records.is_empty() => return None,
            None => records.len(),
        };

        let window = &records[records.len() - take..];
        let (lo, hi) = window
            .iter()
            .map(|r| r.objective())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        Some(hi - lo)
    }
}

impl Callback for DeltaConvergenceStopper {
    fn name(&self) -> &str {
        "DeltaConvergenceStopper"
    }

    fn on_step(&mut self, state: &OptimizationState) -> Result<CallbackCommand, CallbackError> {
        if state.len() < self.min_iterations {
            return Ok(CallbackCommand::Continue);
        }

        Ok(match self.spread(state) {
            Some(spread) if spread <= self.delta => CallbackCommand::Stop(format!(
                "objective spread {spread} over the last {} values is within delta {}",
                self.window.unwrap_or(state.len()),
                self.delta
            )),
            _ => CallbackCommand::Continue,
        })
    }
}
