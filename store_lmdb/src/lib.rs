//! LMDB storage backend for the Keyring registry.
//!
//! Implements the `keyring-store` traits using the `heed` LMDB bindings. All
//! logical stores live as named databases within a single environment, and
//! every mutation runs inside one write transaction, which LMDB serializes.

pub mod credential;
pub mod environment;
pub mod error;
pub mod fee;
pub mod request;

pub use environment::LmdbEnvironment;
pub use error::LmdbError;
