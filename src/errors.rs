/// Domain-specific error types for the pricers and the driver.
/// Every failure is local to one pricing request and fatal to it:
/// - No retries (all computations are pure)
/// - No partially constructed pricer is ever returned
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PricerError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("invalid model choice: {0}")]
    InvalidModel(String),

    #[error("config error: {0}")]
    Config(String),
}

impl PricerError {
    /// Process exit code the driver reports for this error.
    /// An unknown model is distinguished from every other failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            PricerError::InvalidModel(_) => 2,
            PricerError::InvalidParameter(_) | PricerError::Config(_) => 1,
        }
    }
}

pub type PricerResult<T> = Result<T, PricerError>;

/// Shorthand used by the validation paths.
pub(crate) fn invalid(msg: impl Into<String>) -> PricerError {
    PricerError::InvalidParameter(msg.into())
}
