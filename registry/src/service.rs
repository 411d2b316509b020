//! Shared async handle over a [`CredentialRegistry`].
//!
//! Requests and attestation callbacks arrive from independent tasks; the
//! registry behind one async mutex is their single serialization point, so
//! two concurrent `create` calls for the same identity can never both pass
//! the existence check.

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::coordinator::AttestationOutcome;
use crate::error::RegistryError;
use crate::events::RegistryEvent;
use crate::registry::CredentialRegistry;
use keyring_oracle::{Attestation, AttestationAuthority};
use keyring_store::{CredentialRecord, CredentialStore, FeeStore, RequestStore};
use keyring_types::{Address, RequestHandle, Timestamp, TokenAmount};

pub struct RegistryService<S, A> {
    inner: Arc<Mutex<CredentialRegistry<S, A>>>,
    address: Address,
}

impl<S, A> Clone for RegistryService<S, A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            address: self.address,
        }
    }
}

impl<S, A> RegistryService<S, A>
where
    S: CredentialStore + RequestStore + FeeStore,
    A: AttestationAuthority,
{
    pub fn new(registry: CredentialRegistry<S, A>) -> Self {
        Self {
            address: registry.address(),
            inner: Arc::new(Mutex::new(registry)),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub async fn create(&self, caller: Address, now: Timestamp) -> Result<RequestHandle, RegistryError> {
        self.inner.lock().await.create(&caller, now)
    }

    pub async fn on_attestation(
        &self,
        caller: Address,
        handle: RequestHandle,
        attested: bool,
        observed_at: Timestamp,
    ) -> Result<AttestationOutcome, RegistryError> {
        self.inner
            .lock()
            .await
            .on_attestation(&caller, &handle, attested, observed_at)
    }

    /// Deliver an authority's answer as `caller`.
    pub async fn deliver(
        &self,
        caller: Address,
        attestation: Attestation,
    ) -> Result<AttestationOutcome, RegistryError> {
        self.on_attestation(
            caller,
            attestation.handle,
            attestation.attested,
            attestation.observed_at,
        )
        .await
    }

    pub async fn is_valid(&self, identity: Address, now: Timestamp) -> bool {
        self.inner.lock().await.is_valid(&identity, now)
    }

    pub async fn credential_of(&self, identity: Address) -> Result<Option<CredentialRecord>, RegistryError> {
        self.inner.lock().await.credential_of(&identity)
    }

    pub async fn fund(&self, amount: TokenAmount) -> Result<TokenAmount, RegistryError> {
        self.inner.lock().await.fund(amount)
    }

    pub async fn fee_balance(&self) -> Result<TokenAmount, RegistryError> {
        self.inner.lock().await.fee_balance()
    }

    pub async fn expire_stale_requests(&self, now: Timestamp) -> Result<Vec<RequestHandle>, RegistryError> {
        self.inner.lock().await.expire_stale_requests(now)
    }

    pub async fn drain_events(&self) -> Vec<RegistryEvent> {
        self.inner.lock().await.drain_events()
    }
}
