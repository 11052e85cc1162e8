use std::time::Duration;

use bo_types::{CallbackError, ConfigError};

use crate::callbacks::callback::{Callback, CallbackCommand};
use crate::state::OptimizationState;

/// Stops before the evaluation time budget would be overrun.
///
/// The next iteration is predicted to take as long as the slowest one so far;
/// the stopper votes stop once what is left of the budget is no more than
/// that prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct DeadlineStopper {
    budget: Duration,
    longest: f64,
}

impl DeadlineStopper {
    pub fn new(budget: Duration) -> Result<Self, ConfigError> {
        if budget.is_zero() {
            return Err(ConfigError::ZeroDeadline);
        }
        Ok(Self {
            budget,
            longest: 0.0,
        })
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }
}

impl Callback for DeadlineStopper {
    fn name(&self) -> &str {
        "DeadlineStopper"
    }

    fn on_step(&mut self, state: &OptimizationState) -> Result<CallbackCommand, CallbackError> {
        if let Some(record) = state.last() {
            self.longest = self.longest.max(record.duration_seconds());
        }

        let spent = state.total_evaluation_time().as_secs_f64();
        if spent + self.longest >= self.budget.as_secs_f64() {
            return Ok(CallbackCommand::Stop(format!(
                "{spent:.3}s spent of a {:.3}s budget; next iteration expected to take {:.3}s",
                self.budget.as_secs_f64(),
                self.longest
            )));
        }
        Ok(CallbackCommand::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{IterationRecord, Phase};
    use crate::state::test_support::state_with_values;

    #[test]
    fn zero_budget_is_rejected() {
        assert_eq!(
            DeadlineStopper::new(Duration::ZERO),
            Err(ConfigError::ZeroDeadline)
        );
    }

    #[test]
    fn stops_when_remaining_time_equals_longest_iteration() {
        let mut state = OptimizationState::new(4, 4);
        state.begin();
        state.push(IterationRecord::new(
            1,
            vec![],
            0.0,
            Duration::from_millis(500),
            Phase::Initialization,
        ));

        // 0.5s spent of 1.0s leaves exactly one 0.5s iteration.
        let mut stopper = DeadlineStopper::new(Duration::from_secs(1)).unwrap();
        assert!(stopper.on_step(&state).unwrap().is_stop());

        let mut roomy = DeadlineStopper::new(Duration::from_millis(1001)).unwrap();
        assert_eq!(roomy.on_step(&state).unwrap(), CallbackCommand::Continue);
    }

    #[test]
    fn stops_when_next_iteration_would_overrun() {
        // Every recorded iteration takes 10ms.
        let mut stopper = DeadlineStopper::new(Duration::from_millis(35)).unwrap();

        for n in 1..=2 {
            let state = state_with_values(10, 10, &vec![0.0; n]);
            assert_eq!(stopper.on_step(&state).unwrap(), CallbackCommand::Continue);
        }

        let state = state_with_values(10, 10, &[0.0; 3]);
        assert!(stopper.on_step(&state).unwrap().is_stop());
    }
}
