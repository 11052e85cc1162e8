//! Human-readable per-iteration progress report.

use std::io::{Stdout, Write};

use bo_types::CallbackError;

use crate::callbacks::callback::{Callback, CallbackCommand};
use crate::record::Phase;
use crate::state::OptimizationState;

/// Writes one progress block per iteration. Never stops the run.
///
/// ```text
/// Iteration No: 1 started. Evaluating function at random point.
/// Iteration No: 1 ended. Evaluation done at random point.
/// Time taken: 0.001234
/// Function value obtained: -0.5200
/// Current minimum: -0.5200
/// ```
#[derive(Debug)]
pub struct VerboseReporter<W = Stdout> {
    n_total: usize,
    writer: W,
}

/// Name reported by [`VerboseReporter`].
pub const VERBOSE_REPORTER: &str = "VerboseReporter";

impl VerboseReporter<Stdout> {
    pub fn new(n_total: usize) -> Self {
        Self::with_writer(n_total, std::io::stdout())
    }
}

impl<W: Write> VerboseReporter<W> {
    pub fn with_writer(n_total: usize, writer: W) -> Self {
        Self { n_total, writer }
    }

    /// Planned number of objective calls.
    pub fn n_total(&self) -> usize {
        self.n_total
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Callback for VerboseReporter<W> {
    fn name(&self) -> &str {
        VERBOSE_REPORTER
    }

    fn on_step(&mut self, state: &OptimizationState) -> Result<CallbackCommand, CallbackError> {
        let Some(record) = state.last() else {
            return Ok(CallbackCommand::Continue);
        };
        let best = state.best_value().unwrap_or(record.objective());
        let i = record.iteration();

        let (started, ended) = match record.phase() {
            Phase::Initialization => (
                "Evaluating function at random point.",
                "Evaluation done at random point.",
            ),
            Phase::ModelGuided => (
                "Searching for the next optimal point.",
                "Search finished for the next optimal point.",
            ),
        };

        writeln!(self.writer, "Iteration No: {i} started. {started}")?;
        writeln!(self.writer, "Iteration No: {i} ended. {ended}")?;
        writeln!(self.writer, "Time taken: {}", significant(record.duration_seconds(), 4))?;
        writeln!(
            self.writer,
            "Function value obtained: {}",
            significant(record.objective(), 4)
        )?;
        writeln!(self.writer, "Current minimum: {}", significant(best, 4))?;
        self.writer.flush()?;

        Ok(CallbackCommand::Continue)
    }
}

/// Fixed-point rendering of `value` with `digits` significant digits.
///
/// Magnitudes at or above `10^digits` keep all integer digits.
fn significant(value: f64, digits: usize) -> String {
    if value == 0.0 || !value.is_finite() {
        return format!("{:.*}", digits.saturating_sub(1), value);
    }
    let magnitude = value.abs().log10().floor() as i64;
    let decimals = (digits as i64 - 1 - magnitude).max(0) as usize;
    let rendered = format!("{:.*}", decimals, value);

    // Rounding can carry into a new leading digit (9.99996 -> 10.000).
    let rounded: f64 = rendered.parse().unwrap_or(value);
    if decimals > 0 && rounded.abs() >= 10f64.powi(magnitude as i32 + 1) {
        format!("{:.*}", decimals - 1, value)
    } else {
        rendered
    }
}
