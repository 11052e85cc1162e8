//! Surrogate models of the objective.
//!
//! The loop only needs [`Surrogate`]: fit on every `(encoded point, value)`
//! pair seen so far, then predict a mean and standard deviation anywhere in
//! the unit hypercube. [`GaussianProcess`] is the default implementation.

use nalgebra::{DMatrix, DVector};
use tracing::warn;

use bo_types::SurrogateError;

/// Posterior predictive distribution at one point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub mean: f64,
    pub std: f64,
}

pub trait Surrogate {
    /// Refit on the complete history. Rows of `x` are encoded points.
    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<(), SurrogateError>;

    /// Predict at an encoded point. An unfitted model returns its prior.
    fn predict(&self, x: &[f64]) -> Prediction;
}

/// Default observation noise variance.
pub const DEFAULT_NOISE: f64 = 1e-6;

/// Extra diagonal jitter tried, in order, when the kernel matrix is not
/// numerically positive definite.
const JITTER_LADDER: [f64; 5] = [0.0, 1e-8, 1e-6, 1e-4, 1e-2];

/// Lower bound on the heuristic lengthscales.
const MIN_LENGTHSCALE: f64 = 0.1;

/// Gaussian process with a Matérn 5/2 ARD kernel.
///
/// Targets are standardized before fitting. Lengthscales are set per
/// dimension to the standard deviation of the training inputs (at least
/// [`MIN_LENGTHSCALE`]); the signal variance is 1 in standardized units.
/// There is no marginal-likelihood optimization.
#[derive(Debug, Clone)]
pub struct GaussianProcess {
    noise: f64,
    fitted: Option<FittedGp>,
}

#[derive(Debug, Clone)]
struct FittedGp {
    /// Lower Cholesky factor of `K + (noise + jitter) I`.
    lower: DMatrix<f64>,
    /// `(K + σ²I)^-1 y` for standardized `y`.
    alpha: DVector<f64>,
    x_train: Vec<Vec<f64>>,
    lengthscales: Vec<f64>,
    y_mean: f64,
    y_std: f64,
}

impl GaussianProcess {
    pub fn new(noise: f64) -> Self {
        Self {
            noise,
            fitted: None,
        }
    }

    pub fn noise(&self) -> f64 {
        self.noise
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }
}

impl Default for GaussianProcess {
    fn default() -> Self {
        Self::new(DEFAULT_NOISE)
    }
}

impl Surrogate for GaussianProcess {
    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<(), SurrogateError> {
        if x.len() != y.len() {
            return Err(SurrogateError::ShapeMismatch {
                rows: x.len(),
                targets: y.len(),
            });
        }
        if x.is_empty() {
            self.fitted = None;
            return Ok(());
        }

        let d = x[0].len();
        if let Some(row) = x.iter().find(|row| row.len() != d) {
            return Err(SurrogateError::RaggedInputs {
                expected: d,
                actual: row.len(),
            });
        }
        if y.iter().chain(x.iter().flatten()).any(|v| !v.is_finite()) {
            return Err(SurrogateError::NonFinite);
        }

        let n = y.len();
        let y_mean = y.iter().sum::<f64>() / n as f64;
        let y_std = if n > 1 {
            let var = y.iter().map(|v| (v - y_mean).powi(2)).sum::<f64>() / (n - 1) as f64;
            var.sqrt().max(1e-10)
        } else {
            1.0
        };
        let y_standardized = DVector::from_iterator(n, y.iter().map(|v| (v - y_mean) / y_std));

        let lengthscales: Vec<f64> = (0..d)
            .map(|j| {
                let mean = x.iter().map(|row| row[j]).sum::<f64>() / n as f64;
                let var = x.iter().map(|row| (row[j] - mean).powi(2)).sum::<f64>() / n as f64;
                var.sqrt().max(MIN_LENGTHSCALE)
            })
            .collect();

        let kernel = DMatrix::from_fn(n, n, |i, j| matern52(&x[i], &x[j], &lengthscales));

        let mut last_jitter = 0.0;
        for (attempt, &jitter) in JITTER_LADDER.iter().enumerate() {
            last_jitter = jitter;
            let mut k = kernel.clone();
            for i in 0..n {
                k[(i, i)] += self.noise + jitter;
            }

            let Some(cholesky) = k.cholesky() else {
                continue;
            };
            if attempt > 0 {
                warn!(
                    "Kernel matrix over {} points needed jitter {} to factorize",
                    n, jitter
                );
            }

            let alpha = cholesky.solve(&y_standardized);
            self.fitted = Some(FittedGp {
                lower: cholesky.l(),
                alpha,
                x_train: x.to_vec(),
                lengthscales,
                y_mean,
                y_std,
            });
            return Ok(());
        }

        Err(SurrogateError::NotPositiveDefinite {
            jitter: last_jitter,
        })
    }

    fn predict(&self, x: &[f64]) -> Prediction {
        let Some(gp) = &self.fitted else {
            return Prediction {
                mean: 0.0,
                std: 1.0,
            };
        };

        let k_star = DVector::from_iterator(
            gp.x_train.len(),
            gp.x_train.iter().map(|row| matern52(x, row, &gp.lengthscales)),
        );
        let mean = k_star.dot(&gp.alpha);

        // var = k(x, x) - vᵀv with L v = k*
        let explained = gp
            .lower
            .solve_lower_triangular(&k_star)
            .map_or(0.0, |v| v.norm_squared());
        let var = (1.0 - explained).max(0.0);

        Prediction {
            mean: gp.y_mean + mean * gp.y_std,
            std: var.sqrt() * gp.y_std,
        }
    }
}

/// Matérn 5/2 kernel with unit signal variance.
///
/// `k(a, b) = (1 + √5 r + 5/3 r²) exp(-√5 r)`, `r² = Σ ((a_i - b_i) / l_i)²`
fn matern52(a: &[f64], b: &[f64], lengthscales: &[f64]) -> f64 {
    let r_sq: f64 = a
        .iter()
        .zip(b)
        .zip(lengthscales)
        .map(|((ai, bi), l)| ((ai - bi) / l).powi(2))
        .sum();
    let sqrt5_r = (5.0 * r_sq).sqrt();
    (1.0 + sqrt5_r + 5.0 / 3.0 * r_sq) * (-sqrt5_r).exp()
}
