//! Fundamental types for the Keyring credential registry.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! account addresses, token amounts and ids, request handles, timestamps, networks,
//! and the immutable registry construction parameters.

pub mod address;
pub mod amount;
pub mod error;
pub mod hash;
pub mod network;
pub mod params;
pub mod time;
pub mod token;

pub use address::Address;
pub use amount::TokenAmount;
pub use error::TypesError;
pub use hash::{JobId, RequestHandle};
pub use network::NetworkId;
pub use params::RegistryParams;
pub use time::Timestamp;
pub use token::TokenId;
