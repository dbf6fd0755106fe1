// Everything the core can reject happens at construction; ticks never fail.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must be positive (got {value})")]
    NonPositive { field: &'static str, value: f64 },

    #[error("{field} needs min < max (got {min}..{max})")]
    EmptyRange { field: &'static str, min: f64, max: f64 },

    #[error("{field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("config file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Json(#[from] serde_json::Error),
}

pub(crate) fn ensure_positive(field: &'static str, value: f64) -> Result<()> {
    // NaN fails this too
    if value > 0.0 {
        Ok(())
    } else {
        log::warn!("rejecting config: {field} = {value}");
        Err(ConfigError::NonPositive { field, value })
    }
}

pub(crate) fn ensure_range(field: &'static str, min: f64, max: f64) -> Result<()> {
    if min < max {
        Ok(())
    } else {
        log::warn!("rejecting config: {field} = {min}..{max}");
        Err(ConfigError::EmptyRange { field, min, max })
    }
}
