//! Acquisition functions and the strategy that maximizes them.

use rand::Rng;
use serde::{Deserialize, Serialize};

use bo_types::{ConfigError, OptResult, Point, SearchSpace};

use crate::surrogate::{Prediction, Surrogate};

/// Utility of evaluating a point, for minimization. Higher is better.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AcquisitionFunction {
    /// `E[max(y_best - xi - f(x), 0)]`.
    ExpectedImprovement { xi: f64 },
    /// `P(f(x) < y_best - xi)`.
    ProbabilityOfImprovement { xi: f64 },
    /// Negated lower confidence bound `-(mean - kappa * std)`.
    LowerConfidenceBound { kappa: f64 },
}

impl Default for AcquisitionFunction {
    fn default() -> Self {
        Self::ExpectedImprovement { xi: 0.01 }
    }
}

impl AcquisitionFunction {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (name, value) = match *self {
            Self::ExpectedImprovement { xi } | Self::ProbabilityOfImprovement { xi } => ("xi", xi),
            Self::LowerConfidenceBound { kappa } => ("kappa", kappa),
        };
        if !value.is_finite() || value < 0.0 {
            return Err(ConfigError::InvalidAcquisitionParameter { name, value });
        }
        Ok(())
    }

    pub fn score(&self, prediction: Prediction, y_best: f64) -> f64 {
        let Prediction { mean, std } = prediction;
        match *self {
            Self::ExpectedImprovement { xi } => {
                let improvement = y_best - xi - mean;
                if std <= 1e-12 {
                    return improvement.max(0.0);
                }
                let z = improvement / std;
                (improvement * norm_cdf(z) + std * norm_pdf(z)).max(0.0)
            }
            Self::ProbabilityOfImprovement { xi } => {
                let improvement = y_best - xi - mean;
                if std <= 1e-12 {
                    return if improvement > 0.0 { 1.0 } else { 0.0 };
                }
                norm_cdf(improvement / std)
            }
            Self::LowerConfidenceBound { kappa } => -(mean - kappa * std),
        }
    }
}

/// Chooses the next candidate from the surrogate posterior.
pub trait AcquisitionStrategy {
    /// `y_best` is the lowest value observed so far, `None` before any.
    fn next_point<S, R>(
        &mut self,
        space: &SearchSpace,
        surrogate: &S,
        y_best: Option<f64>,
        rng: &mut R,
    ) -> OptResult<Point>
    where
        S: Surrogate + ?Sized,
        R: Rng + ?Sized;
}

/// Scores `n_points` random samples of the space and keeps the best.
#[derive(Debug, Clone, PartialEq)]
pub struct RandomSampling {
    pub function: AcquisitionFunction,
    pub n_points: usize,
}

impl RandomSampling {
    pub fn new(function: AcquisitionFunction, n_points: usize) -> Self {
        Self { function, n_points }
    }
}

impl AcquisitionStrategy for RandomSampling {
    fn next_point<S, R>(
        &mut self,
        space: &SearchSpace,
        surrogate: &S,
        y_best: Option<f64>,
        rng: &mut R,
    ) -> OptResult<Point>
    where
        S: Surrogate + ?Sized,
        R: Rng + ?Sized,
    {
        // Without observations the prior mean (0) is the reference.
        let y_best = y_best.unwrap_or(0.0);

        let mut best: Option<(f64, Point)> = None;
        for _ in 0..self.n_points.max(1) {
            let candidate = space.sample(rng);
            let encoded = space.transform(&candidate)?;
            let score = self.function.score(surrogate.predict(&encoded), y_best);

            let better = match &best {
                None => true,
                Some((best_score, _)) => score > *best_score,
            };
            if better {
                best = Some((score, candidate));
            }
        }

        match best {
            Some((_, point)) => Ok(point),
            None => Ok(space.sample(rng)),
        }
    }
}

fn norm_pdf(x: f64) -> f64 {
    const INV_SQRT_2PI: f64 = 0.398_942_280_401_432_7;
    INV_SQRT_2PI * (-0.5 * x * x).exp()
}

fn norm_cdf(x: f64) -> f64 {
    0.5 * libm::erfc(-x / std::f64::consts::SQRT_2)
}
