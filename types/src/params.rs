//! Registry construction parameters, fixed at instantiation and immutable thereafter.

use crate::{Address, JobId, TokenAmount};
use serde::{Deserialize, Serialize};

/// All parameters a registry is constructed with.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryParams {
    /// The fungible token fees are denominated in.
    pub payment_token: Address,

    /// The only account allowed to deliver attestation callbacks.
    pub authority: Address,

    /// Off-chain job the authority runs for each verification request.
    pub job_id: JobId,

    /// Fee charged per verification request, in the payment token's smallest unit.
    pub fee: TokenAmount,

    /// Seconds an issued credential stays valid. `0` means it never expires.
    pub validity_window_secs: u64,

    /// Seconds after which an unanswered request is rolled back by the stale
    /// request sweep. `0` disables the sweep and pending requests wait forever.
    #[serde(default)]
    pub request_timeout_secs: u64,
}

impl RegistryParams {
    /// LINK token on Rinkeby.
    pub const RINKEBY_LINK: Address = Address::new([
        0x01, 0xbe, 0x23, 0x58, 0x50, 0x60, 0x83, 0x5e, 0x02, 0xb7, 0x7e, 0xf4, 0x75, 0xb0, 0xcc,
        0x51, 0xaa, 0x1e, 0x07, 0x09,
    ]);

    /// Oracle operator used by the reference Rinkeby deployment.
    pub const RINKEBY_ORACLE: Address = Address::new([
        0xe7, 0x0c, 0x82, 0xf0, 0xbd, 0xc2, 0x71, 0x70, 0x76, 0x76, 0x93, 0xb9, 0xad, 0x4c, 0x0b,
        0x7e, 0x41, 0x93, 0xa7, 0xea,
    ]);

    /// 0.1 LINK at 18 decimals.
    pub const DEFAULT_FEE: TokenAmount = TokenAmount::new(100_000_000_000_000_000);

    /// The reference deployment: Rinkeby LINK and oracle, empty job id,
    /// 0.1 LINK per request, credentials that never expire.
    pub fn rinkeby_defaults() -> Self {
        Self {
            payment_token: Self::RINKEBY_LINK,
            authority: Self::RINKEBY_ORACLE,
            job_id: JobId::default(),
            fee: Self::DEFAULT_FEE,
            validity_window_secs: 0,
            request_timeout_secs: 0,
        }
    }
}

impl Default for RegistryParams {
    fn default() -> Self {
        Self::rinkeby_defaults()
    }
}
