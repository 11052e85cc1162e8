use std::error::Error;

use bo_types::ParameterValue;

/// The black-box function being minimized.
///
/// Any `FnMut(&[ParameterValue]) -> Result<f64, E>` is an objective.
pub trait Objective {
    type Error: Into<Box<dyn Error + Send + Sync>>;

    fn evaluate(&mut self, point: &[ParameterValue]) -> Result<f64, Self::Error>;
}

impl<F, E> Objective for F
where
    F: FnMut(&[ParameterValue]) -> Result<f64, E>,
    E: Into<Box<dyn Error + Send + Sync>>,
{
    type Error = E;

    fn evaluate(&mut self, point: &[ParameterValue]) -> Result<f64, E> {
        self(point)
    }
}
