//! End-to-end credential lifecycle through the registry facade:
//! create → dispatched job → attestation callback → validity query.
//!
//! Time, storage and the authority are all nullables, so every test is
//! deterministic and plays the oracle node by hand.

use std::sync::Arc;

use keyring_nullables::{NullAuthority, NullClock, NullStore};
use keyring_registry::{AttestationOutcome, CredentialRegistry, RegistryError, RegistryEvent};
use keyring_store::{CredentialStatus, CredentialStore, RequestStore};
use keyring_types::{Address, RegistryParams, RequestHandle, Timestamp, TokenAmount, TokenId};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

type TestRegistry = CredentialRegistry<NullStore, Arc<NullAuthority>>;

const FEE: u128 = 100;
const AUTHORITY: Address = RegistryParams::RINKEBY_ORACLE;

fn addr(b: u8) -> Address {
    Address::new([b; 20])
}

fn params(window: u64) -> RegistryParams {
    RegistryParams {
        fee: TokenAmount::new(FEE),
        validity_window_secs: window,
        ..RegistryParams::rinkeby_defaults()
    }
}

fn setup(window: u64, funding: u128) -> (TestRegistry, Arc<NullAuthority>, NullClock) {
    let authority = Arc::new(NullAuthority::new());
    let mut registry = CredentialRegistry::new(params(window), NullStore::new(), authority.clone());
    if funding > 0 {
        registry.fund(TokenAmount::new(funding)).unwrap();
    }
    (registry, authority, NullClock::default())
}

/// Create and immediately attest, returning the issuance time.
fn issue(registry: &mut TestRegistry, clock: &NullClock, who: Address, attested: bool) -> Timestamp {
    let handle = registry.create(&who, clock.now()).unwrap();
    let at = clock.advance(5);
    registry.on_attestation(&AUTHORITY, &handle, attested, at).unwrap();
    at
}

// ---------------------------------------------------------------------------
// Validity
// ---------------------------------------------------------------------------

#[test]
fn unknown_identity_is_never_valid() {
    let (registry, _, _) = setup(0, 0);
    for now in [0, 1, 1_700_000_000, u64::MAX] {
        assert!(!registry.is_valid(&addr(1), Timestamp::new(now)));
    }
}

#[test]
fn pending_credential_is_not_valid() {
    let (mut registry, _, clock) = setup(0, FEE);
    registry.create(&addr(1), clock.now()).unwrap();
    assert_eq!(registry.status_of(&addr(1)).unwrap(), CredentialStatus::Pending);
    assert!(!registry.is_valid(&addr(1), clock.now()));
}

#[test]
fn attested_credential_respects_the_window() {
    let window = 3_600;
    let (mut registry, _, clock) = setup(window, FEE);
    let alice = addr(1);

    let issued = issue(&mut registry, &clock, alice, true);
    assert!(registry.is_valid(&alice, issued));
    assert!(registry.is_valid(&alice, issued.saturating_add_secs(window)));
    assert!(!registry.is_valid(&alice, issued.saturating_add_secs(window + 1)));

    let record = registry.credential_of(&alice).unwrap().unwrap();
    assert_eq!(record.issued_at, Some(issued));
    assert_eq!(
        registry.expiry().expires_at(&record),
        Some(issued.saturating_add_secs(window))
    );
}

#[test]
fn zero_window_is_valid_forever() {
    let (mut registry, _, clock) = setup(0, FEE);
    let issued = issue(&mut registry, &clock, addr(1), true);
    assert!(registry.is_valid(&addr(1), issued.saturating_add_secs(100 * 365 * 86_400)));
    assert!(registry.is_valid(&addr(1), Timestamp::new(u64::MAX)));
}

#[test]
fn expired_credential_still_blocks_a_new_request() {
    let (mut registry, _, clock) = setup(10, 2 * FEE);
    issue(&mut registry, &clock, addr(1), true);
    clock.advance(1_000);
    assert!(!registry.is_valid(&addr(1), clock.now()));
    assert!(matches!(
        registry.create(&addr(1), clock.now()),
        Err(RegistryError::AlreadyExists(_))
    ));
}

// ---------------------------------------------------------------------------
// Request / callback state machine
// ---------------------------------------------------------------------------

#[test]
fn second_create_while_pending_is_rejected() {
    let (mut registry, authority, clock) = setup(0, 2 * FEE);
    registry.create(&addr(1), clock.now()).unwrap();
    let err = registry.create(&addr(1), clock.now()).unwrap_err();

    assert!(matches!(err, RegistryError::AlreadyExists(a) if a == addr(1)));
    assert_eq!(authority.dispatch_count(), 1);
    assert_eq!(registry.fee_balance().unwrap(), TokenAmount::new(FEE));
}

#[test]
fn negative_attestation_releases_the_identity() {
    let (mut registry, authority, clock) = setup(0, 2 * FEE);
    issue(&mut registry, &clock, addr(1), false);

    assert_eq!(registry.status_of(&addr(1)).unwrap(), CredentialStatus::Unrequested);
    assert!(!registry.is_valid(&addr(1), clock.now()));

    let issued = issue(&mut registry, &clock, addr(1), true);
    assert!(registry.is_valid(&addr(1), issued));
    assert_eq!(authority.dispatch_count(), 2);
    // The rolled back id is not reused.
    assert_eq!(registry.owner_of(TokenId::new(2)).unwrap(), Some(addr(1)));
}

#[test]
fn unknown_and_consumed_handles_change_nothing() {
    let (mut registry, _, clock) = setup(0, FEE);
    let handle = registry.create(&addr(1), clock.now()).unwrap();

    let bogus = RequestHandle::new([0x42; 32]);
    assert!(matches!(
        registry.on_attestation(&AUTHORITY, &bogus, true, clock.now()),
        Err(RegistryError::UnknownRequest(h)) if h == bogus
    ));
    assert_eq!(registry.status_of(&addr(1)).unwrap(), CredentialStatus::Pending);

    registry.on_attestation(&AUTHORITY, &handle, true, clock.now()).unwrap();
    let before = registry.credential_of(&addr(1)).unwrap();
    assert!(matches!(
        registry.on_attestation(&AUTHORITY, &handle, false, clock.now()),
        Err(RegistryError::UnknownRequest(_))
    ));
    assert_eq!(registry.credential_of(&addr(1)).unwrap(), before);
}

#[test]
fn insufficient_funds_leaves_no_record() {
    let (mut registry, authority, clock) = setup(0, FEE - 1);
    let err = registry.create(&addr(1), clock.now()).unwrap_err();

    assert!(matches!(
        err,
        RegistryError::InsufficientFunds { needed, available }
            if needed == TokenAmount::new(FEE) && available == TokenAmount::new(FEE - 1)
    ));
    assert!(!registry.store().has_record(&addr(1)).unwrap());
    assert_eq!(authority.dispatch_count(), 0);

    registry.fund(TokenAmount::new(1)).unwrap();
    registry.create(&addr(1), clock.now()).unwrap();
    assert!(registry.fee_balance().unwrap().is_zero());
}

#[test]
fn stranger_cannot_deliver_attestations() {
    let (mut registry, _, clock) = setup(0, FEE);
    let handle = registry.create(&addr(1), clock.now()).unwrap();

    let err = registry
        .on_attestation(&addr(1), &handle, true, clock.now())
        .unwrap_err();
    assert!(matches!(err, RegistryError::Unauthorized(_)));
    assert!(registry.store().contains_request(&handle).unwrap());
    assert_eq!(registry.status_of(&addr(1)).unwrap(), CredentialStatus::Pending);
}

#[test]
fn callbacks_resolve_to_their_own_requester() {
    let (mut registry, authority, clock) = setup(0, 3 * FEE);
    let ids: Vec<Address> = (1..=3).map(addr).collect();
    for who in &ids {
        registry.create(who, clock.now()).unwrap();
    }

    // Answer out of order: only the middle requester is attested.
    let jobs = authority.dispatched();
    for job in jobs.iter().rev() {
        let attested = job.subject == addr(2);
        registry
            .on_attestation(&AUTHORITY, &job.handle, attested, clock.now())
            .unwrap();
    }

    assert!(!registry.is_valid(&addr(1), clock.now()));
    assert!(registry.is_valid(&addr(2), clock.now()));
    assert!(!registry.is_valid(&addr(3), clock.now()));
    assert_eq!(registry.store().record_count().unwrap(), 1);
}

#[test]
fn credentials_cannot_move() {
    let (mut registry, _, clock) = setup(0, FEE);
    issue(&mut registry, &clock, addr(1), true);

    let err = registry
        .transfer(&addr(1), &addr(2), TokenId::FIRST)
        .unwrap_err();
    assert!(matches!(err, RegistryError::NonTransferable(_)));
    assert_eq!(registry.owner_of(TokenId::FIRST).unwrap(), Some(addr(1)));
    assert_eq!(registry.balance_of(&addr(2)).unwrap(), 0);
}

#[test]
fn events_trace_the_lifecycle() {
    let (mut registry, _, clock) = setup(0, 2 * FEE);
    let first = registry.create(&addr(1), clock.now()).unwrap();
    registry.on_attestation(&AUTHORITY, &first, false, clock.now()).unwrap();
    let second = registry.create(&addr(1), clock.now()).unwrap();
    let outcome = registry
        .on_attestation(&AUTHORITY, &second, true, clock.now())
        .unwrap();
    assert!(matches!(outcome, AttestationOutcome::Issued(_)));

    let kinds: Vec<&'static str> = registry
        .drain_events()
        .iter()
        .map(|e| match e {
            RegistryEvent::CredentialRequested { .. } => "requested",
            RegistryEvent::CredentialIssued { .. } => "issued",
            RegistryEvent::CredentialRejected { .. } => "rejected",
            RegistryEvent::RequestExpired { .. } => "expired",
        })
        .collect();
    assert_eq!(kinds, ["requested", "rejected", "requested", "issued"]);
    assert!(registry.drain_events().is_empty());
}

// ---------------------------------------------------------------------------
// Stale request sweep
// ---------------------------------------------------------------------------

#[test]
fn sweep_releases_identity_and_late_callback_is_unknown() {
    let authority = Arc::new(NullAuthority::new());
    let mut registry = CredentialRegistry::new(
        RegistryParams {
            request_timeout_secs: 600,
            ..params(0)
        },
        NullStore::new(),
        authority.clone(),
    );
    registry.fund(TokenAmount::new(2 * FEE)).unwrap();
    let clock = NullClock::default();

    let handle = registry.create(&addr(1), clock.now()).unwrap();
    clock.advance(599);
    assert!(registry.expire_stale_requests(clock.now()).unwrap().is_empty());
    clock.advance(1);
    assert_eq!(registry.expire_stale_requests(clock.now()).unwrap(), vec![handle]);

    assert_eq!(registry.status_of(&addr(1)).unwrap(), CredentialStatus::Unrequested);
    assert!(matches!(
        registry.on_attestation(&AUTHORITY, &handle, true, clock.now()),
        Err(RegistryError::UnknownRequest(_))
    ));
    registry.create(&addr(1), clock.now()).unwrap();
    assert!(registry.fee_balance().unwrap().is_zero());
}

#[test]
fn failed_store_write_during_callback_is_recoverable() {
    let authority = Arc::new(NullAuthority::new());
    let mut registry = CredentialRegistry::new(
        RegistryParams {
            request_timeout_secs: 10,
            ..params(0)
        },
        NullStore::new(),
        authority,
    );
    registry.fund(TokenAmount::new(2 * FEE)).unwrap();

    let handle = registry.create(&addr(1), Timestamp::new(0)).unwrap();
    registry.store().fail_next_writes(1);
    assert!(matches!(
        registry.on_attestation(&AUTHORITY, &handle, true, Timestamp::new(1)),
        Err(RegistryError::Store(_))
    ));
    assert_eq!(registry.status_of(&addr(1)).unwrap(), CredentialStatus::Pending);

    // The authority's retry still finds the request.
    registry.store().fail_next_writes(1);
    assert!(registry
        .on_attestation(&AUTHORITY, &handle, true, Timestamp::new(2))
        .is_err());

    // Unanswered, the request ages out and the identity may ask again.
    assert_eq!(
        registry.expire_stale_requests(Timestamp::new(1_000)).unwrap(),
        vec![handle]
    );
    assert_eq!(registry.status_of(&addr(1)).unwrap(), CredentialStatus::Unrequested);
    registry.create(&addr(1), Timestamp::new(1_000)).unwrap();
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    /// Asking twice with unchanged state gives the same answer.
    #[test]
    fn is_valid_is_idempotent(window in 0u64..10_000, offset in 0u64..20_000, attested: bool) {
        let (mut registry, _, clock) = setup(window, FEE);
        issue(&mut registry, &clock, addr(1), attested);
        let now = clock.now().saturating_add_secs(offset);
        prop_assert_eq!(registry.is_valid(&addr(1), now), registry.is_valid(&addr(1), now));
    }

    /// However requests and answers interleave, no identity ever holds more
    /// than one record and token ids never repeat.
    #[test]
    fn one_record_per_identity(ops in proptest::collection::vec((0u8..4, any::<bool>()), 1..40)) {
        let (mut registry, authority, clock) = setup(0, FEE * 100);
        for (who, attested) in ops {
            match registry.create(&addr(who), clock.now()) {
                Ok(handle) => {
                    registry.on_attestation(&AUTHORITY, &handle, attested, clock.now()).unwrap();
                }
                Err(RegistryError::AlreadyExists(_)) => {
                    prop_assert!(registry.store().has_record(&addr(who)).unwrap());
                }
                Err(e) => return Err(TestCaseError::fail(e.to_string())),
            }
            prop_assert!(registry.store().record_count().unwrap() <= 4);
        }
        let mut handles: Vec<RequestHandle> =
            authority.dispatched().iter().map(|job| job.handle).collect();
        let dispatched = handles.len();
        handles.sort();
        handles.dedup();
        prop_assert_eq!(handles.len(), dispatched);
        let last = registry.store().last_token_id().unwrap();
        prop_assert_eq!(last.map(|t| t.get()), Some(authority.dispatch_count() as u64));
    }
}
