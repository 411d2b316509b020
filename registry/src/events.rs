//! Events emitted by the registry for observers to drain.

use keyring_types::{Address, RequestHandle, Timestamp, TokenId};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegistryEvent {
    /// A verification job was dispatched; the credential is Pending.
    CredentialRequested {
        owner: Address,
        token_id: TokenId,
        handle: RequestHandle,
    },
    /// A positive attestation activated the credential.
    CredentialIssued {
        owner: Address,
        token_id: TokenId,
        issued_at: Timestamp,
    },
    /// A negative attestation rolled the Pending credential back.
    CredentialRejected {
        owner: Address,
        token_id: TokenId,
        handle: RequestHandle,
    },
    /// The authority never answered; the stale request sweep rolled it back.
    RequestExpired {
        owner: Address,
        token_id: TokenId,
        handle: RequestHandle,
    },
}
