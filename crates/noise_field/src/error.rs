//! Error types and result alias for the crate.
//!
//! This module defines [`enum@crate::error::Error`] and the crate-wide [Result] alias.
//! Missing capabilities (a non-periodic or non-seeded input) are never errors;
//! only contract violations at the point of misuse surface here.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid operand: {0}")]
    InvalidOperand(String),

    #[error("work pool error: {0}")]
    Pool(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_violated_contract() {
        let err = Error::InvalidOperand("period must be non-zero".into());
        assert_eq!(err.to_string(), "invalid operand: period must be non-zero");
    }
}
