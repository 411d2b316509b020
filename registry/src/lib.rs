//! Keyring credential registry.
//!
//! Each identity may hold one non-transferable credential, issued only after
//! an external attestation authority vouches for it:
//! 1. **Request**: `create` checks the one-credential invariant and the fee
//!    balance, records a Pending credential and dispatches a verification job.
//! 2. **Callback**: the authority's answer either activates the credential or
//!    rolls it back so the identity may try again.
//! 3. **Query**: `is_valid` judges the stored credential against the
//!    configured validity window.

pub mod config;
pub mod coordinator;
pub mod deployment;
pub mod error;
pub mod events;
pub mod expiry;
pub mod logging;
pub mod registry;
pub mod service;

pub use config::{ConfigError, RegistryConfig};
pub use coordinator::{AttestationOutcome, OracleRequestCoordinator};
pub use deployment::{DeploymentError, DeploymentRecord};
pub use error::RegistryError;
pub use events::RegistryEvent;
pub use expiry::ExpiryPolicy;
pub use logging::{init_logging, LogFormat};
pub use registry::CredentialRegistry;
pub use service::RegistryService;
