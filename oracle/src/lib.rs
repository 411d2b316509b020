//! External attestation authority for credential verification.
//!
//! The registry does not know *how* an identity is verified, only that an
//! authority answers each dispatched job with a yes/no attestation. The
//! authority is reached through [`AttestationAuthority::dispatch`]; its answer
//! comes back later as an [`Attestation`] delivered to the registry's callback
//! entry point.

pub mod channel;
pub mod error;
pub mod request;

pub use channel::ChannelAuthority;
pub use error::OracleError;
pub use request::{Attestation, OracleRequest};

use std::sync::Arc;

/// Trait for dispatching verification jobs to an external authority.
///
/// `dispatch` must return without waiting for the answer, and must not call
/// back into the registry synchronously: the callback is a separate,
/// independently scheduled invocation.
pub trait AttestationAuthority: Send + Sync {
    /// Hand a verification job to the authority.
    fn dispatch(&self, request: &OracleRequest) -> Result<(), OracleError>;

    /// Human-readable name of this authority.
    fn name(&self) -> &str;
}

impl<T: AttestationAuthority + ?Sized> AttestationAuthority for Arc<T> {
    fn dispatch(&self, request: &OracleRequest) -> Result<(), OracleError> {
        (**self).dispatch(request)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
