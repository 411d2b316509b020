//! Credential token identifier.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The externally visible handle of a credential.
///
/// Ids are assigned from a monotonically increasing counter starting at 1 and
/// are never reused, even when a pending credential is rolled back.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TokenId(u64);

impl TokenId {
    /// The id of the first credential ever issued.
    pub const FIRST: Self = Self(1);

    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(&self) -> u64 {
        self.0
    }

    /// The id following this one, or `None` on counter exhaustion.
    pub fn next(&self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
