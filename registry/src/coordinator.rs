//! Oracle request coordinator. Bridges credential requests to the external
//! attestation authority and correlates its answers back to the requester.
//!
//! Flow: `request_credential` checks the one-credential invariant and the fee
//! balance, records the correlation entry and the Pending record, pays the
//! fee and dispatches the job. `on_attestation` activates or rolls back the
//! Pending record and only then consumes the correlation entry, so a failed
//! store write leaves the request outstanding for a retried callback or the
//! stale request sweep.

use crate::error::RegistryError;
use crate::events::RegistryEvent;
use keyring_crypto::derive_request_handle;
use keyring_oracle::{AttestationAuthority, OracleRequest};
use keyring_store::{
    CredentialRecord, CredentialStore, FeeStore, PendingRequest, RequestStore, StoreError,
};
use keyring_types::{Address, RegistryParams, RequestHandle, Timestamp, TokenId};

/// How an attestation callback resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttestationOutcome {
    /// The credential is now Active.
    Issued(CredentialRecord),
    /// The Pending credential was rolled back; the identity may request again.
    Rejected { owner: Address, token_id: TokenId },
}

/// Issues verification requests and resolves their callbacks.
///
/// Holds `&mut self` across every mutation, so a single coordinator is a
/// serialized state machine. Concurrent callers share it through
/// [`RegistryService`](crate::RegistryService).
pub struct OracleRequestCoordinator<S, A> {
    store: S,
    authority: A,
    /// Address attestations are delivered to; also seeds request handles.
    registry: Address,
    params: RegistryParams,
    pending_events: Vec<RegistryEvent>,
}

impl<S, A> OracleRequestCoordinator<S, A>
where
    S: CredentialStore + RequestStore + FeeStore,
    A: AttestationAuthority,
{
    pub fn new(store: S, authority: A, registry: Address, params: RegistryParams) -> Self {
        Self {
            store,
            authority,
            registry,
            params,
            pending_events: Vec::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Accept a credential request for `identity` and dispatch its verification job.
    ///
    /// Rejections (`AlreadyExists`, `InsufficientFunds`) happen before any
    /// state changes. Any later failure rolls back the correlation entry, the
    /// Pending record and the fee; only the token id it would have used is
    /// skipped.
    pub fn request_credential(
        &mut self,
        identity: &Address,
        now: Timestamp,
    ) -> Result<RequestHandle, RegistryError> {
        if self.store.has_record(identity)? {
            tracing::debug!(identity = %identity, "credential request rejected: record exists");
            return Err(RegistryError::AlreadyExists(*identity));
        }
        self.store.fee_account()?.ensure_covers(self.params.fee)?;

        let token_id = match self.store.last_token_id()? {
            Some(last) => last.next().ok_or(RegistryError::TokenIdsExhausted)?,
            None => TokenId::FIRST,
        };
        // Token ids are never reused, so neither are handles derived from them.
        let handle = derive_request_handle(&self.registry, token_id.get());

        let request = PendingRequest {
            handle,
            requester: *identity,
            token_id,
            requested_at: now,
        };
        self.store.put_request(&request)?;
        if let Err(e) = self.store.upsert_pending(identity, token_id, now) {
            self.consume_request(&handle);
            return Err(e.into());
        }
        if let Err(e) = self.store.debit(self.params.fee) {
            self.roll_back_request(&request);
            return Err(e.into());
        }

        let job = OracleRequest {
            handle,
            subject: *identity,
            job_id: self.params.job_id,
            fee: self.params.fee,
            payment_token: self.params.payment_token,
            callback: self.registry,
        };
        if let Err(e) = self.authority.dispatch(&job) {
            tracing::warn!(
                identity = %identity,
                handle = %handle,
                authority = self.authority.name(),
                error = %e,
                "dispatch failed, rolling back credential request"
            );
            if let Err(refund) = self.store.fund(self.params.fee) {
                tracing::error!(handle = %handle, error = %refund, "fee refund failed");
            }
            self.roll_back_request(&request);
            return Err(e.into());
        }

        tracing::info!(
            identity = %identity,
            token_id = %token_id,
            handle = %handle,
            fee = %self.params.fee,
            "credential requested"
        );
        self.pending_events.push(RegistryEvent::CredentialRequested {
            owner: *identity,
            token_id,
            handle,
        });
        Ok(handle)
    }

    /// Resolve the outstanding request `handle` with the authority's answer.
    ///
    /// Unknown or already consumed handles fail with `UnknownRequest` and
    /// change nothing. If the store write fails the request stays outstanding
    /// and the same callback may be retried. The fee is never revisited here.
    pub fn on_attestation(
        &mut self,
        handle: &RequestHandle,
        attested: bool,
        observed_at: Timestamp,
    ) -> Result<AttestationOutcome, RegistryError> {
        let Some(request) = self.store.get_request(handle)? else {
            tracing::warn!(handle = %handle, "attestation for unknown request ignored");
            return Err(RegistryError::UnknownRequest(*handle));
        };
        let owner = request.requester;

        if !self.backs_request(&request)? {
            tracing::error!(
                identity = %owner,
                handle = %handle,
                "invariant breach: request has no matching pending credential"
            );
            self.consume_request(handle);
            return Err(RegistryError::NoSuchPendingRecord(owner));
        }

        if attested {
            let record = self.store.finalize(&owner, observed_at).map_err(|e| {
                log_breach(&owner, handle, &e);
                RegistryError::from(e)
            })?;
            self.consume_request(handle);
            tracing::info!(
                identity = %owner,
                token_id = %record.token_id,
                issued_at = %observed_at,
                "credential issued"
            );
            self.pending_events.push(RegistryEvent::CredentialIssued {
                owner,
                token_id: record.token_id,
                issued_at: observed_at,
            });
            Ok(AttestationOutcome::Issued(record))
        } else {
            let record = self.store.discard_pending(&owner).map_err(|e| {
                log_breach(&owner, handle, &e);
                RegistryError::from(e)
            })?;
            self.consume_request(handle);
            tracing::info!(
                identity = %owner,
                token_id = %record.token_id,
                "verification failed, credential request rolled back"
            );
            self.pending_events.push(RegistryEvent::CredentialRejected {
                owner,
                token_id: record.token_id,
                handle: *handle,
            });
            Ok(AttestationOutcome::Rejected {
                owner,
                token_id: record.token_id,
            })
        }
    }

    /// Roll back every request left unanswered for `request_timeout_secs`.
    ///
    /// Returns the expired handles, oldest first. With a zero timeout nothing
    /// ever expires. Fees paid for expired jobs are not refunded. A request
    /// whose rollback fails stays outstanding for the next sweep.
    pub fn expire_stale_requests(
        &mut self,
        now: Timestamp,
    ) -> Result<Vec<RequestHandle>, RegistryError> {
        let timeout = self.params.request_timeout_secs;
        if timeout == 0 {
            return Ok(Vec::new());
        }

        let mut stale: Vec<PendingRequest> = self
            .store
            .outstanding_requests()?
            .into_iter()
            .filter(|r| r.requested_at.saturating_add_secs(timeout) <= now)
            .collect();
        stale.sort_by_key(|r| (r.requested_at, r.token_id));

        let mut expired = Vec::with_capacity(stale.len());
        for request in stale {
            if self.backs_request(&request)? {
                self.store.discard_pending(&request.requester)?;
            } else {
                tracing::error!(
                    identity = %request.requester,
                    handle = %request.handle,
                    "invariant breach: expired request had no pending credential"
                );
            }
            self.store.take_request(&request.handle)?;
            tracing::info!(
                identity = %request.requester,
                handle = %request.handle,
                requested_at = %request.requested_at,
                "stale credential request expired"
            );
            self.pending_events.push(RegistryEvent::RequestExpired {
                owner: request.requester,
                token_id: request.token_id,
                handle: request.handle,
            });
            expired.push(request.handle);
        }
        Ok(expired)
    }

    /// Whether the requester's record is the Pending record `request` created.
    fn backs_request(&self, request: &PendingRequest) -> Result<bool, RegistryError> {
        Ok(self
            .store
            .record_for(&request.requester)?
            .is_some_and(|r| r.is_pending() && r.token_id == request.token_id))
    }

    /// Drop a correlation entry whose credential transition already happened.
    ///
    /// A failure leaves an orphan entry, which the next callback or sweep for
    /// it consumes without touching any record.
    fn consume_request(&self, handle: &RequestHandle) {
        if let Err(e) = self.store.take_request(handle) {
            tracing::error!(handle = %handle, error = %e, "failed to consume request entry");
        }
    }

    /// Undo a request that never reached the authority.
    ///
    /// The entry is only consumed once its Pending record is gone, so a
    /// failed rollback stays visible to the stale request sweep.
    fn roll_back_request(&self, request: &PendingRequest) {
        match self.store.discard_pending(&request.requester) {
            Ok(_) => self.consume_request(&request.handle),
            Err(e) => tracing::error!(
                identity = %request.requester,
                handle = %request.handle,
                error = %e,
                "rollback failed, request left for the stale request sweep"
            ),
        }
    }

    /// Take all events emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<RegistryEvent> {
        std::mem::take(&mut self.pending_events)
    }
}

fn log_breach(owner: &Address, handle: &RequestHandle, e: &StoreError) {
    if matches!(e, StoreError::NoSuchPendingRecord(_)) {
        tracing::error!(
            identity = %owner,
            handle = %handle,
            "invariant breach: pending credential vanished during callback"
        );
    }
}
