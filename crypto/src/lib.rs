//! Hashing and identifier derivation for the Keyring registry.
//!
//! - **Blake2b-256** for all digests
//! - Request handles derived from the registry address and a request nonce
//! - Registry addresses derived from the construction parameters

pub mod derive;
pub mod hash;

pub use derive::{derive_registry_address, derive_request_handle};
pub use hash::{blake2b_256, blake2b_256_multi};
