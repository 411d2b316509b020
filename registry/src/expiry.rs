//! Validity judgement for stored credentials.

use keyring_store::CredentialRecord;
use keyring_types::Timestamp;

/// Decides whether a credential is valid at a given time.
///
/// Pure: the answer depends only on the record and `now`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExpiryPolicy {
    validity_window_secs: u64,
}

impl ExpiryPolicy {
    /// `validity_window_secs == 0` means credentials never expire.
    pub fn new(validity_window_secs: u64) -> Self {
        Self {
            validity_window_secs,
        }
    }

    /// Valid iff the record is Active and, when a window is configured,
    /// `now - issued_at <= window`. The boundary second is still valid.
    pub fn is_valid(&self, record: Option<&CredentialRecord>, now: Timestamp) -> bool {
        let Some(issued_at) = record.filter(|r| r.is_active()).and_then(|r| r.issued_at) else {
            return false;
        };
        self.validity_window_secs == 0 || issued_at.elapsed_since(now) <= self.validity_window_secs
    }

    /// Last second at which an Active record is still valid. `None` for
    /// records that are not Active or never expire.
    pub fn expires_at(&self, record: &CredentialRecord) -> Option<Timestamp> {
        if self.validity_window_secs == 0 || !record.is_active() {
            return None;
        }
        record
            .issued_at
            .map(|t| t.saturating_add_secs(self.validity_window_secs))
    }
}
