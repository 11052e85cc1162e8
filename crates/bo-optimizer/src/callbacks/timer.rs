use bo_types::CallbackError;

use crate::callbacks::callback::{Callback, CallbackCommand};
use crate::state::OptimizationState;

/// Collects the duration of every iteration, in seconds. Never stops the run.
///
/// Attach it by mutable reference to read the samples after the run:
///
/// ```no_run
/// # use bo_optimizer::{CallbackChain, Timer};
/// let mut timer = Timer::new();
/// let mut chain = CallbackChain::new().with(&mut timer);
/// // ... minimize(objective, &space, &config, &mut chain)?;
/// # drop(chain);
/// println!("mean iteration time: {:?}", timer.mean());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timer {
    durations: Vec<f64>,
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn durations(&self) -> &[f64] {
        &self.durations
    }

    pub fn len(&self) -> usize {
        self.durations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.durations.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.durations.iter().sum()
    }

    pub fn mean(&self) -> Option<f64> {
        if self.durations.is_empty() {
            None
        } else {
            Some(self.total() / self.durations.len() as f64)
        }
    }

    pub fn min(&self) -> Option<f64> {
        self.durations.iter().copied().reduce(f64::min)
    }

    pub fn max(&self) -> Option<f64> {
        self.durations.iter().copied().reduce(f64::max)
    }
}

impl Callback for Timer {
    fn name(&self) -> &str {
        "Timer"
    }

    fn on_step(&mut self, state: &OptimizationState) -> Result<CallbackCommand, CallbackError> {
        if let Some(record) = state.last() {
            self.durations.push(record.duration_seconds());
        }
        Ok(CallbackCommand::Continue)
    }
}
