//! Outstanding verification request storage trait.

use crate::StoreError;
use keyring_types::{Address, RequestHandle, Timestamp, TokenId};
use serde::{Deserialize, Serialize};

/// Correlation entry for a dispatched verification job.
///
/// Created when the job is dispatched and consumed exactly once, either by the
/// matching attestation callback or by the stale request sweep.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRequest {
    pub handle: RequestHandle,
    pub requester: Address,
    /// Token id of the Pending record this request backs.
    pub token_id: TokenId,
    pub requested_at: Timestamp,
}

/// Trait for tracking outstanding requests by handle.
pub trait RequestStore {
    /// Record a newly dispatched request.
    ///
    /// Fails with [`StoreError::DuplicateRequest`] if the handle is already
    /// outstanding.
    fn put_request(&self, request: &PendingRequest) -> Result<(), StoreError>;

    /// Remove and return the request for `handle`. A second call for the
    /// same handle returns `None`.
    fn take_request(&self, handle: &RequestHandle) -> Result<Option<PendingRequest>, StoreError>;

    /// The request for `handle`, left in place.
    fn get_request(&self, handle: &RequestHandle) -> Result<Option<PendingRequest>, StoreError>;

    fn contains_request(&self, handle: &RequestHandle) -> Result<bool, StoreError> {
        Ok(self.get_request(handle)?.is_some())
    }

    /// All outstanding requests, in no particular order.
    fn outstanding_requests(&self) -> Result<Vec<PendingRequest>, StoreError>;
}
