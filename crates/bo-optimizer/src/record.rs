//! Per-iteration records.

use std::time::Duration;

use bo_types::Point;
use serde::{Deserialize, Serialize};

/// How the candidate of an iteration was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Explicit initial point or uniform random sample.
    Initialization,
    /// Maximizer of the acquisition function over the surrogate posterior.
    ModelGuided,
}

/// Immutable outcome of one loop iteration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterationRecord {
    iteration: usize,
    point: Point,
    objective: f64,
    duration_seconds: f64,
    phase: Phase,
}

impl IterationRecord {
    pub fn new(
        iteration: usize,
        point: Point,
        objective: f64,
        duration: Duration,
        phase: Phase,
    ) -> Self {
        Self {
            iteration,
            point,
            objective,
            duration_seconds: duration.as_secs_f64(),
            phase,
        }
    }

    /// 1-based iteration index.
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    pub fn point(&self) -> &Point {
        &self.point
    }

    pub fn objective(&self) -> f64 {
        self.objective
    }

    /// Wall-clock time spent in the objective call, in seconds.
    pub fn duration_seconds(&self) -> f64 {
        self.duration_seconds
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.duration_seconds)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bo_types::ParameterValue;

    #[test]
    fn record_exposes_its_fields() {
        let record = IterationRecord::new(
            3,
            vec![ParameterValue::Int(2), ParameterValue::Float(0.25)],
            -1.5,
            Duration::from_millis(250),
            Phase::ModelGuided,
        );

        assert_eq!(record.iteration(), 3);
        assert_eq!(record.point().len(), 2);
        assert_eq!(record.objective(), -1.5);
        assert!((record.duration_seconds() - 0.25).abs() < 1e-12);
        assert_eq!(record.duration(), Duration::from_millis(250));
        assert_eq!(record.phase(), Phase::ModelGuided);
    }

    #[test]
    fn record_round_trips_through_json() {
        let record = IterationRecord::new(
            1,
            vec![ParameterValue::Json(serde_json::json!("huber"))],
            0.5,
            Duration::ZERO,
            Phase::Initialization,
        );

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"phase\":\"Initialization\""));
        let back: IterationRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, back);
    }
}
