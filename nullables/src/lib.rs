//! Nullable infrastructure for deterministic testing.
//!
//! Every external dependency of the registry (clock, storage, attestation
//! authority) has a test-friendly implementation here that:
//! - Returns deterministic values
//! - Can be controlled programmatically
//! - Never touches the filesystem or network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod authority;
pub mod clock;
pub mod store;

pub use authority::NullAuthority;
pub use clock::NullClock;
pub use store::NullStore;
