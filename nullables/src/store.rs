//! Nullable store: thread-safe in-memory storage for testing.

use keyring_store::credential::{check_new_pending, CredentialRecord, CredentialStore};
use keyring_store::fee::{FeeAccount, FeeStore};
use keyring_store::request::{PendingRequest, RequestStore};
use keyring_store::StoreError;
use keyring_types::{Address, RequestHandle, Timestamp, TokenAmount, TokenId};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
struct Inner {
    records: HashMap<Address, CredentialRecord>,
    last_token_id: Option<TokenId>,
    requests: HashMap<RequestHandle, PendingRequest>,
    fees: FeeAccount,
}

#[derive(Default)]
struct WriteFaults {
    skip: usize,
    fail: usize,
}

/// An in-memory credential + request store for testing.
///
/// One mutex guards all state, so every trait method is atomic.
pub struct NullStore {
    inner: Mutex<Inner>,
    faults: Mutex<WriteFaults>,
}

impl NullStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            faults: Mutex::new(WriteFaults::default()),
        }
    }

    /// Make the next `count` writes fail with `StoreError::Backend` and no
    /// effect. Writes are every mutating method except `put_request`.
    pub fn fail_next_writes(&self, count: usize) {
        self.fail_writes_after(0, count);
    }

    /// Let `skip` writes through, then fail the following `count`.
    pub fn fail_writes_after(&self, skip: usize, count: usize) {
        *self.faults.lock().unwrap() = WriteFaults { skip, fail: count };
    }

    fn write_gate(&self) -> Result<(), StoreError> {
        let mut faults = self.faults.lock().unwrap();
        if faults.skip > 0 {
            faults.skip -= 1;
            return Ok(());
        }
        if faults.fail > 0 {
            faults.fail -= 1;
            return Err(StoreError::Backend("null store: injected write failure".into()));
        }
        Ok(())
    }
}

impl Default for NullStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore for NullStore {
    fn has_record(&self, identity: &Address) -> Result<bool, StoreError> {
        Ok(self.inner.lock().unwrap().records.contains_key(identity))
    }

    fn record_for(&self, identity: &Address) -> Result<Option<CredentialRecord>, StoreError> {
        Ok(self.inner.lock().unwrap().records.get(identity).cloned())
    }

    fn upsert_pending(
        &self,
        identity: &Address,
        token_id: TokenId,
        requested_at: Timestamp,
    ) -> Result<CredentialRecord, StoreError> {
        self.write_gate()?;
        let mut inner = self.inner.lock().unwrap();
        let record = check_new_pending(
            inner.records.get(identity),
            inner.last_token_id,
            identity,
            token_id,
            requested_at,
        )?;
        inner.records.insert(*identity, record.clone());
        inner.last_token_id = Some(token_id);
        Ok(record)
    }

    fn finalize(
        &self,
        identity: &Address,
        issued_at: Timestamp,
    ) -> Result<CredentialRecord, StoreError> {
        self.write_gate()?;
        let mut inner = self.inner.lock().unwrap();
        let active = inner
            .records
            .get(identity)
            .and_then(|r| r.activated(issued_at))
            .ok_or(StoreError::NoSuchPendingRecord(*identity))?;
        inner.records.insert(*identity, active.clone());
        Ok(active)
    }

    fn discard_pending(&self, identity: &Address) -> Result<CredentialRecord, StoreError> {
        self.write_gate()?;
        let mut inner = self.inner.lock().unwrap();
        if !inner.records.get(identity).is_some_and(CredentialRecord::is_pending) {
            return Err(StoreError::NoSuchPendingRecord(*identity));
        }
        inner
            .records
            .remove(identity)
            .ok_or(StoreError::NoSuchPendingRecord(*identity))
    }

    fn last_token_id(&self) -> Result<Option<TokenId>, StoreError> {
        Ok(self.inner.lock().unwrap().last_token_id)
    }

    /// Owner of the live record carrying `token_id`.
    fn owner_of(&self, token_id: TokenId) -> Result<Option<Address>, StoreError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .records
            .values()
            .find(|r| r.token_id == token_id)
            .map(|r| r.owner))
    }

    fn record_count(&self) -> Result<u64, StoreError> {
        Ok(self.inner.lock().unwrap().records.len() as u64)
    }
}

impl RequestStore for NullStore {
    fn put_request(&self, request: &PendingRequest) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.requests.contains_key(&request.handle) {
            return Err(StoreError::DuplicateRequest(request.handle));
        }
        inner.requests.insert(request.handle, request.clone());
        Ok(())
    }

    fn take_request(&self, handle: &RequestHandle) -> Result<Option<PendingRequest>, StoreError> {
        self.write_gate()?;
        Ok(self.inner.lock().unwrap().requests.remove(handle))
    }

    fn get_request(&self, handle: &RequestHandle) -> Result<Option<PendingRequest>, StoreError> {
        Ok(self.inner.lock().unwrap().requests.get(handle).cloned())
    }

    fn outstanding_requests(&self) -> Result<Vec<PendingRequest>, StoreError> {
        Ok(self.inner.lock().unwrap().requests.values().cloned().collect())
    }
}

impl FeeStore for NullStore {
    fn fee_account(&self) -> Result<FeeAccount, StoreError> {
        Ok(self.inner.lock().unwrap().fees)
    }

    fn fund(&self, amount: TokenAmount) -> Result<FeeAccount, StoreError> {
        self.write_gate()?;
        let mut inner = self.inner.lock().unwrap();
        inner.fees = inner.fees.credited(amount)?;
        Ok(inner.fees)
    }

    fn debit(&self, fee: TokenAmount) -> Result<FeeAccount, StoreError> {
        self.write_gate()?;
        let mut inner = self.inner.lock().unwrap();
        inner.fees = inner.fees.debited(fee)?;
        Ok(inner.fees)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyring_store::CredentialStatus;

    fn addr(b: u8) -> Address {
        Address::new([b; 20])
    }

    #[test]
    fn lifecycle_matches_the_trait_contract() {
        let store = NullStore::new();
        let alice = addr(1);

        store
            .upsert_pending(&alice, TokenId::FIRST, Timestamp::new(1))
            .unwrap();
        assert!(matches!(
            store.upsert_pending(&alice, TokenId::new(2), Timestamp::new(1)),
            Err(StoreError::AlreadyExists(_))
        ));
        store.finalize(&alice, Timestamp::new(2)).unwrap();
        assert_eq!(store.status_of(&alice).unwrap(), CredentialStatus::Active);
        assert!(matches!(
            store.finalize(&alice, Timestamp::new(3)),
            Err(StoreError::NoSuchPendingRecord(_))
        ));
        assert!(matches!(
            store.discard_pending(&alice),
            Err(StoreError::NoSuchPendingRecord(_))
        ));
        assert_eq!(store.owner_of(TokenId::FIRST).unwrap(), Some(alice));
    }

    #[test]
    fn injected_failures_leave_state_untouched() {
        let store = NullStore::new();
        let alice = addr(1);
        store
            .upsert_pending(&alice, TokenId::FIRST, Timestamp::new(1))
            .unwrap();

        store.fail_next_writes(1);
        assert!(matches!(
            store.finalize(&alice, Timestamp::new(2)),
            Err(StoreError::Backend(_))
        ));
        assert_eq!(store.status_of(&alice).unwrap(), CredentialStatus::Pending);

        store.finalize(&alice, Timestamp::new(2)).unwrap();
        assert_eq!(store.status_of(&alice).unwrap(), CredentialStatus::Active);
    }

    #[test]
    fn skipped_writes_go_through_before_failures() {
        let store = NullStore::new();
        store.fail_writes_after(1, 1);
        store.fund(TokenAmount::new(5)).unwrap();
        assert!(store.fund(TokenAmount::new(5)).is_err());
        store.fund(TokenAmount::new(5)).unwrap();
        assert_eq!(store.fee_account().unwrap().balance(), TokenAmount::new(10));
    }
}
