//! The credential registry: the public surface combining the store, the
//! request coordinator and the expiry policy.

use crate::coordinator::{AttestationOutcome, OracleRequestCoordinator};
use crate::error::RegistryError;
use crate::events::RegistryEvent;
use crate::expiry::ExpiryPolicy;
use keyring_crypto::derive_registry_address;
use keyring_oracle::AttestationAuthority;
use keyring_store::{CredentialRecord, CredentialStatus, CredentialStore, FeeStore, RequestStore};
use keyring_types::{Address, RegistryParams, RequestHandle, Timestamp, TokenAmount, TokenId};

/// One-credential-per-identity registry.
///
/// Every identity holds at most one non-transferable credential, issued only
/// after the configured authority attests to it.
pub struct CredentialRegistry<S, A> {
    address: Address,
    params: RegistryParams,
    expiry: ExpiryPolicy,
    coordinator: OracleRequestCoordinator<S, A>,
}

impl<S, A> CredentialRegistry<S, A>
where
    S: CredentialStore + RequestStore + FeeStore,
    A: AttestationAuthority,
{
    pub fn new(params: RegistryParams, store: S, authority: A) -> Self {
        let address = derive_registry_address(&params);
        tracing::info!(
            registry = %address,
            authority = %params.authority,
            payment_token = %params.payment_token,
            job_id = %params.job_id,
            fee = %params.fee,
            validity_window_secs = params.validity_window_secs,
            "credential registry constructed"
        );
        Self {
            address,
            expiry: ExpiryPolicy::new(params.validity_window_secs),
            coordinator: OracleRequestCoordinator::new(store, authority, address, params.clone()),
            params,
        }
    }

    /// Address attestations are delivered to.
    pub fn address(&self) -> Address {
        self.address
    }

    pub fn params(&self) -> &RegistryParams {
        &self.params
    }

    pub fn expiry(&self) -> &ExpiryPolicy {
        &self.expiry
    }

    pub fn store(&self) -> &S {
        self.coordinator.store()
    }

    /// Request a credential for `caller`. Returns the handle of the
    /// dispatched verification job.
    pub fn create(&mut self, caller: &Address, now: Timestamp) -> Result<RequestHandle, RegistryError> {
        self.coordinator.request_credential(caller, now)
    }

    /// Attestation callback. Only the configured authority may call it.
    pub fn on_attestation(
        &mut self,
        caller: &Address,
        handle: &RequestHandle,
        attested: bool,
        observed_at: Timestamp,
    ) -> Result<AttestationOutcome, RegistryError> {
        if *caller != self.params.authority {
            tracing::warn!(caller = %caller, handle = %handle, "unauthorized attestation callback");
            return Err(RegistryError::Unauthorized(*caller));
        }
        self.coordinator.on_attestation(handle, attested, observed_at)
    }

    /// Whether `identity` holds a credential that is valid at `now`.
    ///
    /// Never fails: unknown identities, pending credentials and store read
    /// errors all answer `false`.
    pub fn is_valid(&self, identity: &Address, now: Timestamp) -> bool {
        match self.store().record_for(identity) {
            Ok(record) => self.expiry.is_valid(record.as_ref(), now),
            Err(e) => {
                tracing::error!(identity = %identity, error = %e, "credential lookup failed");
                false
            }
        }
    }

    pub fn credential_of(&self, identity: &Address) -> Result<Option<CredentialRecord>, RegistryError> {
        Ok(self.store().record_for(identity)?)
    }

    pub fn status_of(&self, identity: &Address) -> Result<CredentialStatus, RegistryError> {
        Ok(self.store().status_of(identity)?)
    }

    /// Owner of an issued credential. Pending token ids have no owner yet.
    pub fn owner_of(&self, token_id: TokenId) -> Result<Option<Address>, RegistryError> {
        let Some(owner) = self.store().owner_of(token_id)? else {
            return Ok(None);
        };
        let issued = self
            .store()
            .record_for(&owner)?
            .is_some_and(|r| r.is_active() && r.token_id == token_id);
        Ok(issued.then_some(owner))
    }

    /// Number of issued credentials `identity` holds: 0 or 1.
    pub fn balance_of(&self, identity: &Address) -> Result<u64, RegistryError> {
        Ok(u64::from(self.status_of(identity)? == CredentialStatus::Active))
    }

    /// Credentials are bound to their owner; every transfer is refused.
    pub fn transfer(&mut self, from: &Address, to: &Address, token_id: TokenId) -> Result<(), RegistryError> {
        tracing::warn!(from = %from, to = %to, token_id = %token_id, "credential transfer refused");
        Err(RegistryError::NonTransferable(token_id))
    }

    /// Top up the stored fee balance. Returns the new balance.
    pub fn fund(&mut self, amount: TokenAmount) -> Result<TokenAmount, RegistryError> {
        let balance = self.coordinator.store().fund(amount)?.balance();
        tracing::info!(amount = %amount, balance = %balance, "fee balance funded");
        Ok(balance)
    }

    pub fn fee_balance(&self) -> Result<TokenAmount, RegistryError> {
        Ok(self.coordinator.store().fee_account()?.balance())
    }

    pub fn expire_stale_requests(&mut self, now: Timestamp) -> Result<Vec<RequestHandle>, RegistryError> {
        self.coordinator.expire_stale_requests(now)
    }

    pub fn drain_events(&mut self) -> Vec<RegistryEvent> {
        self.coordinator.drain_events()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyring_nullables::{NullAuthority, NullStore};
    use std::sync::Arc;

    fn addr(b: u8) -> Address {
        Address::new([b; 20])
    }

    fn registry() -> (CredentialRegistry<NullStore, Arc<NullAuthority>>, Arc<NullAuthority>) {
        let authority = Arc::new(NullAuthority::new());
        let params = RegistryParams {
            fee: TokenAmount::new(1),
            ..RegistryParams::rinkeby_defaults()
        };
        let mut registry = CredentialRegistry::new(params, NullStore::new(), authority.clone());
        registry.fund(TokenAmount::new(10)).unwrap();
        (registry, authority)
    }

    #[test]
    fn callback_from_stranger_is_unauthorized() {
        let (mut registry, _) = registry();
        let handle = registry.create(&addr(1), Timestamp::new(1)).unwrap();

        let err = registry
            .on_attestation(&addr(9), &handle, true, Timestamp::new(2))
            .unwrap_err();
        assert!(matches!(err, RegistryError::Unauthorized(a) if a == addr(9)));
        assert_eq!(registry.status_of(&addr(1)).unwrap(), CredentialStatus::Pending);

        registry
            .on_attestation(&RegistryParams::RINKEBY_ORACLE, &handle, true, Timestamp::new(2))
            .unwrap();
        assert!(registry.is_valid(&addr(1), Timestamp::new(3)));
    }

    #[test]
    fn unauthorized_check_precedes_handle_lookup() {
        let (mut registry, _) = registry();
        let err = registry
            .on_attestation(&addr(9), &RequestHandle::new([7; 32]), true, Timestamp::new(1))
            .unwrap_err();
        assert!(matches!(err, RegistryError::Unauthorized(_)));
    }

    #[test]
    fn jobs_call_back_to_the_registry_address() {
        let (mut registry, authority) = registry();
        registry.create(&addr(1), Timestamp::new(1)).unwrap();
        assert_eq!(authority.last().unwrap().callback, registry.address());
    }

    #[test]
    fn ownership_counts_only_issued_credentials() {
        let (mut registry, _) = registry();
        let alice = addr(1);
        let handle = registry.create(&alice, Timestamp::new(1)).unwrap();

        assert_eq!(registry.owner_of(TokenId::FIRST).unwrap(), None);
        assert_eq!(registry.balance_of(&alice).unwrap(), 0);

        registry
            .on_attestation(&RegistryParams::RINKEBY_ORACLE, &handle, true, Timestamp::new(2))
            .unwrap();
        assert_eq!(registry.owner_of(TokenId::FIRST).unwrap(), Some(alice));
        assert_eq!(registry.balance_of(&alice).unwrap(), 1);
    }

    #[test]
    fn transfers_are_refused() {
        let (mut registry, _) = registry();
        let err = registry
            .transfer(&addr(1), &addr(2), TokenId::FIRST)
            .unwrap_err();
        assert!(matches!(err, RegistryError::NonTransferable(id) if id == TokenId::FIRST));
    }
}
