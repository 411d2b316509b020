use keyring_types::{Address, RequestHandle, TokenAmount, TokenId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("identity {0} already holds a pending or active credential")]
    AlreadyExists(Address),

    #[error("identity {0} has no pending credential")]
    NoSuchPendingRecord(Address),

    #[error("token id {proposed} does not follow last assigned id {last:?}")]
    StaleTokenId {
        proposed: TokenId,
        last: Option<TokenId>,
    },

    #[error("request {0} is already outstanding")]
    DuplicateRequest(RequestHandle),

    #[error("insufficient fee funds: need {needed}, have {available}")]
    InsufficientFunds {
        needed: TokenAmount,
        available: TokenAmount,
    },

    #[error("fee balance would overflow")]
    FeeOverflow,

    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("database is corrupted: {0}")]
    Corruption(String),
}
