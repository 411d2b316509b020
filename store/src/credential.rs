//! Credential record storage trait.

use crate::StoreError;
use keyring_types::{Address, Timestamp, TokenId};
use serde::{Deserialize, Serialize};

/// Lifecycle of an identity's credential.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CredentialStatus {
    /// No request has been accepted (or the last one was rolled back).
    Unrequested,
    /// A verification request was dispatched and awaits its attestation.
    Pending,
    /// Attested; the credential exists and is subject to the expiry policy.
    Active,
}

/// The persisted credential of one identity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    pub owner: Address,
    pub token_id: TokenId,
    pub status: CredentialStatus,
    /// When the request backing this record was accepted.
    pub requested_at: Timestamp,
    /// When the attestation arrived. `None` until the record is `Active`.
    pub issued_at: Option<Timestamp>,
}

impl CredentialRecord {
    /// A freshly accepted request.
    pub fn pending(owner: Address, token_id: TokenId, requested_at: Timestamp) -> Self {
        Self {
            owner,
            token_id,
            status: CredentialStatus::Pending,
            requested_at,
            issued_at: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == CredentialStatus::Pending
    }

    pub fn is_active(&self) -> bool {
        self.status == CredentialStatus::Active
    }

    /// Transition Pending → Active, or `None` if this record is not Pending.
    pub fn activated(&self, issued_at: Timestamp) -> Option<Self> {
        self.is_pending().then(|| Self {
            status: CredentialStatus::Active,
            issued_at: Some(issued_at),
            ..self.clone()
        })
    }
}

/// Durable identity → credential mapping.
///
/// Implementations must make every mutating method atomic: the existence check
/// and the write happen under one lock or one write transaction, so two
/// interleaved calls for the same identity can never both observe the
/// pre-mutation state.
pub trait CredentialStore {
    /// True iff a Pending or Active record exists for `identity`.
    fn has_record(&self, identity: &Address) -> Result<bool, StoreError>;

    /// The record for `identity`, if any.
    fn record_for(&self, identity: &Address) -> Result<Option<CredentialRecord>, StoreError>;

    /// Create a Pending record.
    ///
    /// Fails with [`StoreError::AlreadyExists`] if `identity` already has a
    /// record, and with [`StoreError::StaleTokenId`] unless `token_id` is
    /// greater than every id assigned before. On success `token_id` becomes
    /// the last assigned id.
    fn upsert_pending(
        &self,
        identity: &Address,
        token_id: TokenId,
        requested_at: Timestamp,
    ) -> Result<CredentialRecord, StoreError>;

    /// Move a Pending record to Active and stamp `issued_at`.
    ///
    /// Fails with [`StoreError::NoSuchPendingRecord`] if there is no Pending
    /// record for `identity`.
    fn finalize(
        &self,
        identity: &Address,
        issued_at: Timestamp,
    ) -> Result<CredentialRecord, StoreError>;

    /// Remove a Pending record, releasing the identity for a future request.
    ///
    /// Active records are never removed; asking to discard one fails with
    /// [`StoreError::NoSuchPendingRecord`], as does an absent record.
    fn discard_pending(&self, identity: &Address) -> Result<CredentialRecord, StoreError>;

    /// Highest token id ever assigned, `None` before the first request.
    fn last_token_id(&self) -> Result<Option<TokenId>, StoreError>;

    /// Owner of the record carrying `token_id`, whatever its status.
    fn owner_of(&self, token_id: TokenId) -> Result<Option<Address>, StoreError>;

    /// Number of Pending and Active records.
    fn record_count(&self) -> Result<u64, StoreError>;

    /// Lifecycle status of `identity`, `Unrequested` when there is no record.
    fn status_of(&self, identity: &Address) -> Result<CredentialStatus, StoreError> {
        Ok(self
            .record_for(identity)?
            .map_or(CredentialStatus::Unrequested, |r| r.status))
    }
}

/// Shared validation for `upsert_pending` implementations.
///
/// Returns the record to insert, or the error the store must report.
pub fn check_new_pending(
    existing: Option<&CredentialRecord>,
    last: Option<TokenId>,
    identity: &Address,
    token_id: TokenId,
    requested_at: Timestamp,
) -> Result<CredentialRecord, StoreError> {
    if existing.is_some() {
        return Err(StoreError::AlreadyExists(*identity));
    }
    if last.is_some_and(|l| token_id <= l) {
        return Err(StoreError::StaleTokenId {
            proposed: token_id,
            last,
        });
    }
    Ok(CredentialRecord::pending(*identity, token_id, requested_at))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(b: u8) -> Address {
        Address::new([b; 20])
    }

    #[test]
    fn activated_only_from_pending() {
        let pending = CredentialRecord::pending(addr(1), TokenId::FIRST, Timestamp::new(10));
        let active = pending.activated(Timestamp::new(20)).unwrap();
        assert!(active.is_active());
        assert_eq!(active.issued_at, Some(Timestamp::new(20)));
        assert_eq!(active.requested_at, Timestamp::new(10));
        assert!(active.activated(Timestamp::new(30)).is_none());
    }

    #[test]
    fn new_pending_rejects_existing_record() {
        let existing = CredentialRecord::pending(addr(1), TokenId::FIRST, Timestamp::EPOCH);
        let err = check_new_pending(
            Some(&existing),
            Some(TokenId::FIRST),
            &addr(1),
            TokenId::new(2),
            Timestamp::EPOCH,
        )
        .unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists(a) if a == addr(1)));
    }

    #[test]
    fn new_pending_rejects_reused_token_id() {
        let err = check_new_pending(
            None,
            Some(TokenId::new(5)),
            &addr(2),
            TokenId::new(5),
            Timestamp::EPOCH,
        )
        .unwrap_err();
        assert!(matches!(err, StoreError::StaleTokenId { .. }));
    }
}
