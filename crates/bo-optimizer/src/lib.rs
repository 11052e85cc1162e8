//! # bo-optimizer
//!
//! Sequential Bayesian optimization of expensive black-box functions.
//!
//! Provides the ask-tell [`Optimizer`], the [`minimize`] loop driving it,
//! a Gaussian-process surrogate with expected-improvement style acquisition,
//! per-iteration records and run state, and a callback protocol for
//! monitoring runs and stopping them early.

pub mod acquisition;
pub mod callbacks;
mod config;
mod objective;
mod optimizer;
mod record;
mod state;
pub mod surrogate;

pub use acquisition::{AcquisitionFunction, AcquisitionStrategy, RandomSampling};
pub use callbacks::{
    Callback, CallbackChain, CallbackCommand, DeadlineStopper, DeltaConvergenceStopper, Timer,
    VerboseReporter, VERBOSE_REPORTER,
};
pub use config::OptimizerConfig;
pub use objective::Objective;
pub use optimizer::{minimize, Optimizer};
pub use record::{IterationRecord, Phase};
pub use state::{OptimizationState, RunId, RunStatus};
pub use surrogate::{GaussianProcess, Prediction, Surrogate};
