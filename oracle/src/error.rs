use thiserror::Error;

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("attestation authority unavailable: {0}")]
    Unavailable(String),
}
