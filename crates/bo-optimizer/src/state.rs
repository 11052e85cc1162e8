//! Run state: iteration history, running best and lifecycle status.

use std::time::Duration;

use bo_types::{OptResult, Point};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::record::IterationRecord;

/// Unique optimization run identifier.
pub type RunId = Uuid;

/// Lifecycle state of an optimization run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunStatus {
    NotStarted,
    RandomPhase,
    ModelPhase,
    /// A callback asked the loop to stop.
    Stopped,
    /// The call budget was exhausted.
    Completed,
}

impl RunStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Stopped | Self::Completed)
    }
}

/// Accumulated outcome of a run.
///
/// Only the optimizer mutates it; callbacks and callers get `&OptimizationState`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationState {
    id: RunId,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
    budget: usize,
    n_initial: usize,
    records: Vec<IterationRecord>,
    best_index: Option<usize>,
    total_evaluation_seconds: f64,
    status: RunStatus,
    stop_reason: Option<String>,
}

impl OptimizationState {
    pub(crate) fn new(budget: usize, n_initial: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            finished_at: None,
            budget,
            n_initial,
            records: Vec::with_capacity(budget),
            best_index: None,
            total_evaluation_seconds: 0.0,
            status: RunStatus::NotStarted,
            stop_reason: None,
        }
    }

    pub fn id(&self) -> RunId {
        self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    /// Total call budget.
    pub fn budget(&self) -> usize {
        self.budget
    }

    /// Number of iterations in the initialization phase.
    pub fn n_initial(&self) -> usize {
        self.n_initial
    }

    pub fn remaining(&self) -> usize {
        self.budget.saturating_sub(self.records.len())
    }

    /// All records in iteration order.
    pub fn records(&self) -> &[IterationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Most recent record.
    pub fn last(&self) -> Option<&IterationRecord> {
        self.records.last()
    }

    /// Observed objective values in iteration order.
    pub fn objective_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.records.iter().map(IterationRecord::objective)
    }

    /// Record with the lowest objective; the earliest one on ties.
    pub fn best(&self) -> Option<&IterationRecord> {
        self.best_index.and_then(|i| self.records.get(i))
    }

    pub fn best_value(&self) -> Option<f64> {
        self.best().map(IterationRecord::objective)
    }

    pub fn best_point(&self) -> Option<&Point> {
        self.best().map(IterationRecord::point)
    }

    /// Sum of objective evaluation durations.
    pub fn total_evaluation_time(&self) -> Duration {
        Duration::from_secs_f64(self.total_evaluation_seconds)
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    /// Reason given by the callback that stopped the run.
    pub fn stop_reason(&self) -> Option<&str> {
        self.stop_reason.as_deref()
    }

    pub fn to_json(&self) -> OptResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub(crate) fn begin(&mut self) {
        if self.status == RunStatus::NotStarted {
            self.status = self.phase_status();
        }
    }

    /// Append a record, keeping the running best and phase up to date.
    pub(crate) fn push(&mut self, record: IterationRecord) {
        debug_assert!(self.records.len() < self.budget, "record beyond budget");

        let improves = match self.best_value() {
            None => true,
            Some(best) => record.objective() < best,
        };

        self.total_evaluation_seconds += record.duration_seconds();
        self.records.push(record);
        if improves {
            self.best_index = Some(self.records.len() - 1);
        }
        // Ask-tell callers may never call `begin`.
        if !self.status.is_terminal() {
            self.status = self.phase_status();
        }
    }

    pub(crate) fn finish(&mut self, stop_reason: Option<String>) {
        self.status = match stop_reason {
            Some(_) => RunStatus::Stopped,
            None if self.records.len() >= self.budget => RunStatus::Completed,
            None => return,
        };
        self.stop_reason = stop_reason;
        self.finished_at = Some(Utc::now());
    }

    fn phase_status(&self) -> RunStatus {
        if self.records.len() < self.n_initial {
            RunStatus::RandomPhase
        } else {
            RunStatus::ModelPhase
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::time::Duration;

    use bo_types::ParameterValue;

    use super::OptimizationState;
    use crate::record::{IterationRecord, Phase};

    /// State holding one record per value, with 10ms durations.
    pub(crate) fn state_with_values(budget: usize, n_initial: usize, values: &[f64]) -> OptimizationState {
        let mut state = OptimizationState::new(budget, n_initial);
        state.begin();
        for (i, &value) in values.iter().enumerate() {
            let phase = if i < n_initial {
                Phase::Initialization
            } else {
                Phase::ModelGuided
            };
            state.push(IterationRecord::new(
                i + 1,
                vec![ParameterValue::Float(i as f64)],
                value,
                Duration::from_millis(10),
                phase,
            ));
        }
        state
    }
}
