//! Callback protocol and the callbacks shipped with the optimizer.
//!
//! | callback | kind | behaviour |
//! |----------|------|-----------|
//! | [`VerboseReporter`] | monitor | prints a progress block per iteration |
//! | [`Timer`] | monitor | collects iteration durations |
//! | [`DeltaConvergenceStopper`] | stopper | stops once recent values cluster within a delta |
//! | [`DeadlineStopper`] | stopper | stops before an evaluation time budget is overrun |

pub mod callback;
pub mod chain;
pub mod deadline;
pub mod delta;
pub mod timer;
pub mod verbose;

pub use callback::{Callback, CallbackCommand};
pub use chain::CallbackChain;
pub use deadline::DeadlineStopper;
pub use delta::DeltaConvergenceStopper;
pub use timer::Timer;
pub use verbose::{VerboseReporter, VERBOSE_REPORTER};
