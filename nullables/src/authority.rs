//! Nullable authority: records dispatched jobs instead of sending them.

use keyring_oracle::{AttestationAuthority, OracleError, OracleRequest};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// A test authority that keeps every dispatched job for later inspection.
///
/// Tests play the oracle node: pull a job with [`NullAuthority::last`] or
/// [`NullAuthority::dispatched`] and feed its answer to the registry callback.
pub struct NullAuthority {
    dispatched: Mutex<Vec<OracleRequest>>,
    offline: AtomicBool,
}

impl NullAuthority {
    pub fn new() -> Self {
        Self {
            dispatched: Mutex::new(Vec::new()),
            offline: AtomicBool::new(false),
        }
    }

    /// While offline, every dispatch fails with `OracleError::Unavailable`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// All jobs dispatched so far, oldest first.
    pub fn dispatched(&self) -> Vec<OracleRequest> {
        self.dispatched.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<OracleRequest> {
        self.dispatched.lock().unwrap().last().cloned()
    }

    pub fn dispatch_count(&self) -> usize {
        self.dispatched.lock().unwrap().len()
    }
}

impl Default for NullAuthority {
    fn default() -> Self {
        Self::new()
    }
}

impl AttestationAuthority for NullAuthority {
    fn dispatch(&self, request: &OracleRequest) -> Result<(), OracleError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(OracleError::Unavailable("null authority is offline".into()));
        }
        self.dispatched.lock().unwrap().push(request.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "null-authority"
    }
}
