//! The ask-tell engine and the sequential optimization loop built on it.

use std::io::Write;
use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use bo_types::{ConfigError, OptError, OptResult, Point, SearchSpace};

use crate::acquisition::{AcquisitionStrategy, RandomSampling};
use crate::callbacks::{Callback, CallbackChain, CallbackCommand, VerboseReporter, VERBOSE_REPORTER};
use crate::config::OptimizerConfig;
use crate::objective::Objective;
use crate::record::{IterationRecord, Phase};
use crate::state::OptimizationState;
use crate::surrogate::{GaussianProcess, Surrogate};

/// Minimize `objective` over `space`, notifying `chain` after every iteration.
///
/// Returns the final state whether the budget ran out or a callback stopped
/// the run; [`OptimizationState::status`] tells the two apart.
pub fn minimize<O: Objective>(
    objective: O,
    space: &SearchSpace,
    config: &OptimizerConfig,
    chain: &mut CallbackChain<'_>,
) -> OptResult<OptimizationState> {
    Optimizer::new(space.clone(), config.clone())?.run(objective, chain)
}

/// Ask-tell optimizer.
///
/// The first [`OptimizerConfig::n_initial`] candidates are the configured
/// initial points followed by random samples. After that every candidate
/// maximizes the acquisition function over the surrogate, which is refit on
/// the full history after each observation.
pub struct Optimizer<S = GaussianProcess, A = RandomSampling> {
    space: SearchSpace,
    config: OptimizerConfig,
    surrogate: S,
    strategy: A,
    rng: ChaCha8Rng,
    state: OptimizationState,
    /// Encoded points and values of every observation, in order.
    x: Vec<Vec<f64>>,
    y: Vec<f64>,
}

impl Optimizer {
    /// Optimizer with the default Gaussian process and random-sampling acquisition.
    pub fn new(space: SearchSpace, config: OptimizerConfig) -> OptResult<Self> {
        let surrogate = GaussianProcess::new(config.noise);
        let strategy = RandomSampling::new(config.acquisition, config.n_points);
        Self::with_collaborators(space, config, surrogate, strategy)
    }
}

impl<S: Surrogate, A: AcquisitionStrategy> Optimizer<S, A> {
    pub fn with_collaborators(
        space: SearchSpace,
        config: OptimizerConfig,
        surrogate: S,
        strategy: A,
    ) -> OptResult<Self> {
        config.validate(&space)?;

        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let state = OptimizationState::new(config.n_calls, config.n_initial());

        Ok(Self {
            space,
            rng,
            state,
            x: Vec::with_capacity(config.n_calls),
            y: Vec::with_capacity(config.n_calls),
            config,
            surrogate,
            strategy,
        })
    }

    pub fn space(&self) -> &SearchSpace {
        &self.space
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    pub fn state(&self) -> &OptimizationState {
        &self.state
    }

    pub fn into_state(self) -> OptimizationState {
        self.state
    }

    /// Number of observations told so far.
    pub fn n_told(&self) -> usize {
        self.state.len()
    }

    pub fn best(&self) -> Option<&IterationRecord> {
        self.state.best()
    }

    /// Phase the next candidate belongs to.
    pub fn phase(&self) -> Phase {
        if self.state.len() < self.config.n_initial() {
            Phase::Initialization
        } else {
            Phase::ModelGuided
        }
    }

    /// Propose the next point to evaluate.
    pub fn ask(&mut self) -> OptResult<(Point, Phase)> {
        let told = self.state.len();
        if told >= self.config.n_calls {
            return Err(OptError::BudgetExhausted {
                budget: self.config.n_calls,
            });
        }
        self.state.begin();

        let phase = self.phase();
        let point = match phase {
            Phase::Initialization => match self.config.initial_points.get(told) {
                Some(point) => point.clone(),
                None => self.space.sample(&mut self.rng),
            },
            Phase::ModelGuided => self.strategy.next_point(
                &self.space,
                &self.surrogate,
                self.state.best_value(),
                &mut self.rng,
            )?,
        };
        Ok((point, phase))
    }

    /// Record the value observed at `point`.
    pub fn tell(&mut self, point: Point, value: f64) -> OptResult<()> {
        self.tell_timed(point, value, Duration::ZERO)
    }

    /// [`Optimizer::tell`] with the time the evaluation took.
    pub fn tell_timed(&mut self, point: Point, value: f64, duration: Duration) -> OptResult<()> {
        let iteration = self.state.len() + 1;
        if iteration > self.config.n_calls {
            return Err(OptError::BudgetExhausted {
                budget: self.config.n_calls,
            });
        }
        if !value.is_finite() {
            return Err(OptError::NonFiniteObjective { iteration, value });
        }
        let encoded = self.space.transform(&point)?;

        self.x.push(encoded);
        self.y.push(value);

        // A failed fit leaves the observation unrecorded.
        let n_initial = self.config.n_initial();
        if iteration >= n_initial {
            if let Err(e) = self.surrogate.fit(&self.x, &self.y) {
                self.x.pop();
                self.y.pop();
                return Err(e.into());
            }
            if iteration == n_initial && n_initial > 0 {
                info!(
                    "Initialization finished after {} evaluations, switching to model-guided search",
                    n_initial
                );
            }
        }

        let phase = self.phase();
        self.state
            .push(IterationRecord::new(iteration, point, value, duration, phase));
        Ok(())
    }

    /// Drive the loop to completion.
    ///
    /// With `verbose` set, a [`VerboseReporter`] on stdout runs ahead of
    /// `chain` on every step. A `chain` that already holds one is rejected.
    pub fn run<O: Objective>(
        self,
        objective: O,
        chain: &mut CallbackChain<'_>,
    ) -> OptResult<OptimizationState> {
        self.run_with_output(objective, chain, std::io::stdout())
    }

    /// [`Optimizer::run`] with the verbose report written to `output`.
    pub fn run_with_output<O: Objective, W: Write>(
        mut self,
        mut objective: O,
        chain: &mut CallbackChain<'_>,
        output: W,
    ) -> OptResult<OptimizationState> {
        let mut reporter = if self.config.verbose {
            if chain.names().any(|name| name == VERBOSE_REPORTER) {
                return Err(ConfigError::DuplicateVerboseReporter.into());
            }
            Some(VerboseReporter::with_writer(self.config.n_calls, output))
        } else {
            None
        };

        info!(
            "Starting optimization run {}: {} calls, {} initial, {} callbacks",
            self.state.id(),
            self.config.n_calls,
            self.config.n_initial(),
            chain.len()
        );
        self.state.begin();

        let mut stop_reason = None;
        while self.state.len() < self.config.n_calls {
            let (point, phase) = self.ask()?;
            let iteration = self.state.len() + 1;
            debug!("Iteration {}: evaluating {:?} point", iteration, phase);

            let started = Instant::now();
            let value = objective
                .evaluate(&point)
                .map_err(|e| OptError::Objective {
                    iteration,
                    source: e.into(),
                })?;
            let elapsed = started.elapsed();

            self.tell_timed(point, value, elapsed)?;
            debug!(
                "Iteration {}: value {} in {:.6}s",
                iteration,
                value,
                elapsed.as_secs_f64()
            );

            if let Some(reporter) = reporter.as_mut() {
                reporter
                    .on_step(&self.state)
                    .map_err(|source| OptError::Callback {
                        name: VERBOSE_REPORTER.to_string(),
                        source,
                    })?;
            }
            if let CallbackCommand::Stop(reason) = chain.notify(&self.state)? {
                info!("Stopping after iteration {}: {}", iteration, reason);
                stop_reason = Some(reason);
                break;
            }
        }

        self.state.finish(stop_reason);
        info!(
            "Optimization run {} finished with status {:?} after {} evaluations, best value {:?}",
            self.state.id(),
            self.state.status(),
            self.state.len(),
            self.state.best_value()
        );
        Ok(self.state)
    }
}
