//! Identifier derivation.
//!
//! Each derivation hashes a fixed domain tag first so a request handle can never
//! collide with a registry address preimage.

use crate::hash::blake2b_256_multi;
use keyring_types::{Address, RegistryParams, RequestHandle};

const HANDLE_TAG: &[u8] = b"keyring/request-handle";
const REGISTRY_TAG: &[u8] = b"keyring/registry";

/// Derive the handle for the `nonce`-th request a registry emits.
pub fn derive_request_handle(registry: &Address, nonce: u64) -> RequestHandle {
    RequestHandle::new(blake2b_256_multi(&[
        HANDLE_TAG,
        registry.as_bytes(),
        &nonce.to_be_bytes(),
    ]))
}

/// Derive the address a registry is reachable at from its construction parameters.
pub fn derive_registry_address(params: &RegistryParams) -> Address {
    let digest = blake2b_256_multi(&[
        REGISTRY_TAG,
        params.payment_token.as_bytes(),
        params.authority.as_bytes(),
        params.job_id.as_bytes(),
        &params.fee.raw().to_be_bytes(),
        &params.validity_window_secs.to_be_bytes(),
        &params.request_timeout_secs.to_be_bytes(),
    ]);
    Address::from_digest(&digest)
}
