//! Run configuration.

use serde::{Deserialize, Serialize};

use bo_types::{ConfigError, OptResult, Point, SearchSpace};

use crate::acquisition::AcquisitionFunction;
use crate::surrogate::DEFAULT_NOISE;

/// Settings for one optimization run.
///
/// Missing fields take their defaults when deserializing, so a JSON file may
/// name only what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Total number of objective evaluations.
    pub n_calls: usize,

    /// Evaluations at random points before the surrogate takes over.
    pub n_random_starts: usize,

    /// Seed for the candidate generator. `None` seeds from entropy.
    pub seed: Option<u64>,

    /// Print a progress block per iteration to stdout.
    pub verbose: bool,

    pub acquisition: AcquisitionFunction,

    /// Random candidates scored per model-guided step.
    pub n_points: usize,

    /// Observation noise variance of the Gaussian process.
    pub noise: f64,

    /// Points evaluated first, in order, as part of initialization.
    pub initial_points: Vec<Point>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            n_calls: 100,
            n_random_starts: 10,
            seed: None,
            verbose: false,
            acquisition: AcquisitionFunction::default(),
            n_points: 1000,
            noise: DEFAULT_NOISE,
            initial_points: Vec::new(),
        }
    }
}

impl OptimizerConfig {
    pub fn new(n_calls: usize, n_random_starts: usize) -> Self {
        Self {
            n_calls,
            n_random_starts,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_acquisition(mut self, acquisition: AcquisitionFunction) -> Self {
        self.acquisition = acquisition;
        self
    }

    pub fn with_n_points(mut self, n_points: usize) -> Self {
        self.n_points = n_points;
        self
    }

    pub fn with_noise(mut self, noise: f64) -> Self {
        self.noise = noise;
        self
    }

    pub fn with_initial_points(mut self, points: Vec<Point>) -> Self {
        self.initial_points = points;
        self
    }

    /// Length of the initialization phase.
    pub fn n_initial(&self) -> usize {
        self.n_random_starts.max(self.initial_points.len())
    }

    /// Check the configuration against `space` before any evaluation.
    pub fn validate(&self, space: &SearchSpace) -> OptResult<()> {
        space.validate()?;

        if self.n_calls == 0 {
            return Err(ConfigError::ZeroBudget.into());
        }
        if self.n_random_starts > self.n_calls {
            return Err(ConfigError::RandomStartsExceedBudget {
                random_starts: self.n_random_starts,
                budget: self.n_calls,
            }
            .into());
        }
        if self.initial_points.len() > self.n_calls {
            return Err(ConfigError::InitialPointsExceedBudget {
                points: self.initial_points.len(),
                budget: self.n_calls,
            }
            .into());
        }
        if self.n_points == 0 {
            return Err(ConfigError::ZeroCandidates.into());
        }
        if !self.noise.is_finite() || self.noise < 0.0 {
            return Err(ConfigError::InvalidNoise { value: self.noise }.into());
        }
        self.acquisition.validate()?;

        for point in &self.initial_points {
            space.validate_point(point)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use bo_types::{OptError, ParameterValue, SpaceError};

    use super::*;

    fn space() -> SearchSpace {
        SearchSpace::new().add_real("x", -1.0, 1.0).add_int("k", 1, 5)
    }

    #[test]
    fn default_config_is_valid() {
        let config = OptimizerConfig::default();
        assert_eq!(config.n_calls, 100);
        assert_eq!(config.n_random_starts, 10);
        assert!(config.validate(&space()).is_ok());
    }

    #[test]
    fn builder_sets_fields() {
        let config = OptimizerConfig::new(20, 4)
            .with_seed(7)
            .with_verbose(true)
            .with_n_points(50)
            .with_noise(1e-4)
            .with_acquisition(AcquisitionFunction::LowerConfidenceBound { kappa: 1.96 });

        assert_eq!(config.seed, Some(7));
        assert!(config.verbose);
        assert_eq!(config.n_points, 50);
        assert_eq!(config.noise, 1e-4);
        assert_eq!(config.n_initial(), 4);
    }

    #[test]
    fn initial_points_extend_initialization() {
        let points = vec![
            vec![ParameterValue::Float(0.0), ParameterValue::Int(1)],
            vec![ParameterValue::Float(0.5), ParameterValue::Int(2)],
            vec![ParameterValue::Float(-0.5), ParameterValue::Int(3)],
        ];
        let config = OptimizerConfig::new(10, 2).with_initial_points(points);
        assert_eq!(config.n_initial(), 3);
        assert!(config.validate(&space()).is_ok());
    }

    #[test]
    fn invalid_budgets_are_rejected() {
        let cases = [
            (OptimizerConfig::new(0, 0), ConfigError::ZeroBudget),
            (
                OptimizerConfig::new(5, 6),
                ConfigError::RandomStartsExceedBudget {
                    random_starts: 6,
                    budget: 5,
                },
            ),
            (OptimizerConfig::new(5, 1).with_n_points(0), ConfigError::ZeroCandidates),
            (
                OptimizerConfig::new(5, 1).with_noise(-1.0),
                ConfigError::InvalidNoise { value: -1.0 },
            ),
        ];

        for (config, expected) in cases {
            match config.validate(&space()) {
                Err(OptError::Config(actual)) => assert_eq!(actual, expected),
                other => panic!("expected {expected:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn initial_points_are_checked_against_space() {
        let config = OptimizerConfig::new(5, 1).with_initial_points(vec![vec![ParameterValue::Float(0.0)]]);
        assert!(matches!(
            config.validate(&space()),
            Err(OptError::Space(SpaceError::DimensionMismatch {
                expected: 2,
                actual: 1
            }))
        ));
    }

    #[test]
    fn empty_space_is_rejected() {
        assert!(matches!(
            OptimizerConfig::default().validate(&SearchSpace::new()),
            Err(OptError::Space(SpaceError::Empty))
        ));
    }

    #[test]
    fn partial_json_uses_defaults() {
        let config: OptimizerConfig =
            serde_json::from_str(r#"{"n_calls": 30, "seed": 0, "verbose": true}"#).unwrap();
        assert_eq!(config.n_calls, 30);
        assert_eq!(config.seed, Some(0));
        assert!(config.verbose);
        assert_eq!(config.n_random_starts, 10);
        assert_eq!(config.acquisition, AcquisitionFunction::default());
    }
}
