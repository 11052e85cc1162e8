use thiserror::Error;

/// Main error type for an optimization run
#[derive(Error, Debug)]
pub enum OptError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Search space error: {0}")]
    Space(#[from] SpaceError),

    #[error("Objective evaluation failed at iteration {iteration}: {source}")]
    Objective {
        iteration: usize,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Objective returned non-finite value {value} at iteration {iteration}")]
    NonFiniteObjective { iteration: usize, value: f64 },

    #[error("Callback '{name}' failed: {source}")]
    Callback {
        name: String,
        #[source]
        source: CallbackError,
    },

    #[error("Call budget of {budget} evaluations is exhausted")]
    BudgetExhausted { budget: usize },

    #[error("Surrogate model error: {0}")]
    Surrogate(#[from] SurrogateError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors detected before the first evaluation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Call budget must be positive")]
    ZeroBudget,

    #[error("Random start count {random_starts} exceeds call budget {budget}")]
    RandomStartsExceedBudget { random_starts: usize, budget: usize },

    #[error("{points} initial points exceed call budget {budget}")]
    InitialPointsExceedBudget { points: usize, budget: usize },

    #[error("Acquisition candidate count must be positive")]
    ZeroCandidates,

    #[error("Noise variance must be finite and non-negative, got {value}")]
    InvalidNoise { value: f64 },

    #[error("Acquisition parameter {name} must be finite and non-negative, got {value}")]
    InvalidAcquisitionParameter { name: &'static str, value: f64 },

    #[error("Delta threshold must be finite and non-negative, got {value}")]
    InvalidDelta { value: f64 },

    #[error("Convergence window must hold at least one value")]
    EmptyWindow,

    #[error("Deadline must be positive")]
    ZeroDeadline,

    #[error("verbose is enabled and the callback chain already contains a VerboseReporter")]
    DuplicateVerboseReporter,
}

/// Search-space definition and point validation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpaceError {
    #[error("Search space has no dimensions")]
    Empty,

    #[error("Dimension {name}: lower bound {low} must be finite and below upper bound {high}")]
    InvalidBounds { name: String, low: f64, high: f64 },

    #[error("Dimension {name}: log-uniform lower bound must be positive, got {low}")]
    NonPositiveLogBound { name: String, low: f64 },

    #[error("Dimension {name}: categorical dimension has no categories")]
    EmptyCategories { name: String },

    #[error("Point has {actual} values but the search space has {expected} dimensions")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Dimension {name}: expected a {expected} value, got {value}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        value: String,
    },

    #[error("Dimension {name}: value {value} is outside the dimension")]
    OutOfBounds { name: String, value: String },
}

/// Surrogate model fitting errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SurrogateError {
    #[error("Training inputs have {rows} rows but {targets} targets were given")]
    ShapeMismatch { rows: usize, targets: usize },

    #[error("Training inputs have inconsistent widths: expected {expected}, got {actual}")]
    RaggedInputs { expected: usize, actual: usize },

    #[error("Training data contains non-finite values")]
    NonFinite,

    #[error("Kernel matrix is not positive definite even with jitter {jitter}")]
    NotPositiveDefinite { jitter: f64 },
}

/// Failure raised by a callback while observing a run
#[derive(Error, Debug)]
pub enum CallbackError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Failed(String),
}

/// Result type alias for optimizer operations
pub type OptResult<T> = Result<T, OptError>;
