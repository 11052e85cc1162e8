use bo_types::CallbackError;

use crate::state::OptimizationState;

/// Vote returned by a callback after observing an iteration.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub enum CallbackCommand {
    #[default]
    Continue,
    /// Stop after the current iteration, with a human-readable reason.
    Stop(String),
}

impl CallbackCommand {
    pub fn is_stop(&self) -> bool {
        matches!(self, Self::Stop(_))
    }
}

impl std::fmt::Display for CallbackCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CallbackCommand::Continue => write!(f, "Continue"),
            CallbackCommand::Stop(reason) => write!(f, "Stop: {}", reason),
        }
    }
}

/// Observer invoked once per completed iteration.
///
/// Monitors always return [`CallbackCommand::Continue`]; stoppers return
/// [`CallbackCommand::Stop`] once their criterion fires. A callback only
/// sees the state for the duration of the call and keeps whatever it needs
/// in its own fields.
pub trait Callback {
    fn name(&self) -> &str;

    fn on_step(&mut self, state: &OptimizationState) -> Result<CallbackCommand, CallbackError>;
}

/// Lets the caller keep ownership of a callback and inspect it after the run.
impl<C> Callback for &mut C
where
    C: Callback + ?Sized,
{
    fn name(&self) -> &str {
        (**self).name()
    }

    fn on_step(&mut self, state: &OptimizationState) -> Result<CallbackCommand, CallbackError> {
        (**self).on_step(state)
    }
}

impl std::fmt::Debug for dyn Callback + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Callback({})", self.name())
    }
}

impl std::fmt::Display for dyn Callback + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Callback({})", self.name())
    }
}
