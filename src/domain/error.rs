//! Domain error types.

/// Failures of the house-price growth estimator.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GrowthError {
    /// A boundary year of the historical window is absent from a series.
    #[error("missing historical {series} data for {year}")]
    MissingHistoricalData { series: &'static str, year: i32 },

    /// A boundary value of the historical window is zero, negative or not a number.
    #[error("historical {series} value for {year} must be positive, got {value}")]
    NonPositiveHistoricalData {
        series: &'static str,
        year: i32,
        value: f64,
    },

    #[error("no population growth data for {year} (queried for {requested})")]
    YearNotCovered { year: i32, requested: i32 },

    #[error("invalid historical window {start_year}..{end_year}")]
    InvalidWindow { start_year: i32, end_year: i32 },
}

/// An operation would violate an invariant of the model.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DomainError {
    #[error("stock balance cannot be negative (would be {balance:.2})")]
    NegativeBalance { balance: f64 },

    #[error("payment of {amount:.2} is below the minimum monthly payment of {minimum:.2}")]
    PaymentBelowMinimum { amount: f64, minimum: f64 },

    #[error("invalid {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

impl DomainError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        DomainError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// Top-level error type for estatesim.
#[derive(Debug, thiserror::Error)]
pub enum EstateSimError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error(transparent)]
    Growth(#[from] GrowthError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&EstateSimError> for std::process::ExitCode {
    fn from(err: &EstateSimError) -> Self {
        let code: u8 = match err {
            EstateSimError::Io(_) => 1,
            EstateSimError::ConfigParse { .. }
            | EstateSimError::ConfigMissing { .. }
            | EstateSimError::ConfigInvalid { .. } => 2,
            EstateSimError::Data { .. } => 3,
            EstateSimError::Growth(_) => 4,
            EstateSimError::Domain(_) => 5,
        };
        std::process::ExitCode::from(code)
    }
}
