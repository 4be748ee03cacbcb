//! Errors returned by the scoring and generation entry points.

/// Configuration and input errors. Numeric guards never produce one of these.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BwsError {
    #[error("Unknown generator strategy \"{0}\". Use random, even, norepeat, norepeateven or semirandom.")]
    UnknownStrategy(String),

    #[error("Unknown scoring method \"{0}\"")]
    UnknownMethod(String),

    #[error("An even design needs trials * items-per-trial to be a multiple of the pool size ({trials} * {per_trial} is not divisible by {pool})")]
    UnevenDesign {
        trials: usize,
        per_trial: usize,
        pool: usize,
    },

    #[error("Trials need between 2 and {pool} items (the pool size), got {per_trial}")]
    InvalidTrialSize { per_trial: usize, pool: usize },

    #[error("The item pool is empty")]
    EmptyPool,

    #[error("Required column \"{0}\" is missing from the input")]
    MissingColumn(String),

    #[error("At least one scoring iteration is required")]
    ZeroIterations,

    /// A trial that breaks the trial invariants, before any row is known.
    #[error("Invalid trial: {0}")]
    InvalidTrial(String),

    #[error("Row {row}: {reason}")]
    MalformedTrial { row: usize, reason: String },

    #[error("Unknown item \"{0}\"")]
    UnknownItem(String),

    #[error("Noise standard deviation must be finite and non-negative, got {0}")]
    InvalidNoise(f64),
}

pub type Result<T> = std::result::Result<T, BwsError>;
