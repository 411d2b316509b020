//! Payloads exchanged with the attestation authority.

use keyring_types::{Address, JobId, RequestHandle, Timestamp, TokenAmount};
use serde::{Deserialize, Serialize};

/// A verification job as handed to the authority.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleRequest {
    /// Correlation handle the authority must echo in its attestation.
    pub handle: RequestHandle,
    /// Identity the authority is asked to verify.
    pub subject: Address,
    pub job_id: JobId,
    /// Fee paid for this job, in `payment_token` units.
    pub fee: TokenAmount,
    pub payment_token: Address,
    /// Registry address the attestation must be delivered to.
    pub callback: Address,
}

/// The authority's answer to one [`OracleRequest`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attestation {
    pub handle: RequestHandle,
    pub attested: bool,
    pub observed_at: Timestamp,
}

impl OracleRequest {
    /// Build the attestation answering this request.
    pub fn answer(&self, attested: bool, observed_at: Timestamp) -> Attestation {
        Attestation {
            handle: self.handle,
            attested,
            observed_at,
        }
    }
}
