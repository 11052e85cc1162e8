//! # bo-bench
//!
//! Speed test for Gaussian-process hyperparameter search: five gradient
//! boosting hyperparameters, 100 calls, seed 0. The cross-validated error of
//! the real model is replaced by a smooth synthetic surface with the same
//! inputs, so a run measures optimizer overhead only.

use std::path::Path;

use anyhow::{bail, Context};
use bo_optimizer::OptimizerConfig;
use bo_types::{ParameterValue, SearchSpace};

/// Environment variable naming an optional JSON [`OptimizerConfig`] file.
pub const CONFIG_ENV: &str = "BO_BENCH_CONFIG";

/// Number of features of the regression dataset; upper bound of `max_features`.
pub const N_FEATURES: i64 = 13;

/// The hyperparameter space searched by the speed test.
pub fn speed_test_space() -> SearchSpace {
    SearchSpace::new()
        .add_int("max_depth", 1, 5)
        .add_log_uniform("learning_rate", 1e-5, 1.0)
        .add_int("max_features", 1, N_FEATURES)
        .add_int("min_samples_split", 2, 100)
        .add_int("min_samples_leaf", 1, 100)
}

/// Settings of the reference run.
pub fn speed_test_config() -> OptimizerConfig {
    OptimizerConfig::new(100, 10).with_seed(0).with_verbose(true)
}

pub fn parse_config(json: &str) -> anyhow::Result<OptimizerConfig> {
    serde_json::from_str(json).context("invalid optimizer config")
}

pub fn load_config(path: impl AsRef<Path>) -> anyhow::Result<OptimizerConfig> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    parse_config(&json)
}

/// Stand-in for 5-fold cross-validated mean absolute error.
///
/// Minimum of 2.1 at depth 3, learning rate 0.1, 6 features, split 10,
/// leaf 5.
pub fn cross_validation_proxy(point: &[ParameterValue]) -> anyhow::Result<f64> {
    let [depth, rate, features, split, leaf] = point else {
        bail!("expected 5 hyperparameters, got {}", point.len());
    };

    let depth = integer(depth, "max_depth")?;
    let rate = rate
        .as_f64()
        .filter(|r| *r > 0.0)
        .context("learning_rate must be a positive number")?;
    let features = integer(features, "max_features")?;
    let split = integer(split, "min_samples_split")?;
    let leaf = integer(leaf, "min_samples_leaf")?;

    let error = 2.1
        + 0.15 * (depth - 3.0).powi(2)
        + 0.8 * (rate.log10() + 1.0).powi(2)
        + 0.02 * (features - 6.0).powi(2)
        + 4e-4 * (split - 10.0).powi(2)
        + 6e-4 * (leaf - 5.0).powi(2);
    Ok(error)
}

fn integer(value: &ParameterValue, name: &str) -> anyhow::Result<f64> {
    match value.as_i64() {
        Some(v) => Ok(v as f64),
        None => bail!("{name} must be an integer, got {value}"),
    }
}
