//! Parse and validation errors for the fundamental types.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypesError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid 32-byte hex value: {0}")]
    InvalidHash(String),

    #[error("job id label is {0} bytes, at most 31 fit in 32 bytes")]
    JobIdTooLong(usize),

    #[error("invalid token amount: {0}")]
    InvalidAmount(String),

    #[error("unknown network: {0}")]
    UnknownNetwork(String),
}
