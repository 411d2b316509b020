//! Abstract storage traits for the Keyring registry.
//!
//! Every storage backend (LMDB, in-memory for testing) implements these traits.
//! The coordinator depends only on the traits, and all record and fee balance
//! mutation goes through them.

pub mod credential;
pub mod error;
pub mod fee;
pub mod request;

pub use credential::{CredentialRecord, CredentialStatus, CredentialStore};
pub use error::StoreError;
pub use fee::{FeeAccount, FeeStore};
pub use request::{PendingRequest, RequestStore};
