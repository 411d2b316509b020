use keyring_oracle::OracleError;
use keyring_store::StoreError;
use keyring_types::{Address, RequestHandle, TokenAmount, TokenId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("identity {0} already holds a pending or active credential")]
    AlreadyExists(Address),

    #[error("insufficient fee funds: need {needed}, have {available}")]
    InsufficientFunds {
        needed: TokenAmount,
        available: TokenAmount,
    },

    #[error("no outstanding request with handle {0}")]
    UnknownRequest(RequestHandle),

    /// Invariant breach: a callback resolved to an identity with no matching
    /// Pending record.
    #[error("identity {0} has no pending credential to resolve")]
    NoSuchPendingRecord(Address),

    #[error("caller {0} is not the configured attestation authority")]
    Unauthorized(Address),

    #[error("credential {0} is bound to its owner and cannot be transferred")]
    NonTransferable(TokenId),

    #[error("fee balance would overflow")]
    FeeOverflow,

    #[error("token id counter exhausted")]
    TokenIdsExhausted,

    #[error("store error: {0}")]
    Store(StoreError),

    #[error("attestation authority error: {0}")]
    Oracle(#[from] OracleError),
}

impl From<StoreError> for RegistryError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::AlreadyExists(identity) => Self::AlreadyExists(identity),
            StoreError::NoSuchPendingRecord(identity) => Self::NoSuchPendingRecord(identity),
            StoreError::InsufficientFunds { needed, available } => {
                Self::InsufficientFunds { needed, available }
            }
            StoreError::FeeOverflow => Self::FeeOverflow,
            other => Self::Store(other),
        }
    }
}
