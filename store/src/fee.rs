//! Fee balance storage trait.

use crate::StoreError;
use keyring_types::TokenAmount;
use serde::{Deserialize, Serialize};

/// Payment-token balance the registry pays verification fees from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeAccount {
    balance: TokenAmount,
}

impl FeeAccount {
    pub fn new(balance: TokenAmount) -> Self {
        Self { balance }
    }

    pub fn balance(&self) -> TokenAmount {
        self.balance
    }

    /// Fail unless `fee` can be paid right now.
    pub fn ensure_covers(&self, fee: TokenAmount) -> Result<(), StoreError> {
        if self.balance < fee {
            return Err(StoreError::InsufficientFunds {
                needed: fee,
                available: self.balance,
            });
        }
        Ok(())
    }

    /// The account after adding `amount`.
    pub fn credited(self, amount: TokenAmount) -> Result<Self, StoreError> {
        self.balance
            .checked_add(amount)
            .map(Self::new)
            .ok_or(StoreError::FeeOverflow)
    }

    /// The account after paying `fee`.
    pub fn debited(self, fee: TokenAmount) -> Result<Self, StoreError> {
        self.ensure_covers(fee)?;
        self.balance
            .checked_sub(fee)
            .map(Self::new)
            .ok_or(StoreError::InsufficientFunds {
                needed: fee,
                available: self.balance,
            })
    }
}

/// Durable fee balance.
///
/// `fund` and `debit` are atomic read-modify-writes; a failed call leaves the
/// stored balance unchanged.
pub trait FeeStore {
    fn fee_account(&self) -> Result<FeeAccount, StoreError>;

    /// Add `amount`, returning the updated account.
    fn fund(&self, amount: TokenAmount) -> Result<FeeAccount, StoreError>;

    /// Pay `fee`. Fails with [`StoreError::InsufficientFunds`] when the
    /// balance is short.
    fn debit(&self, fee: TokenAmount) -> Result<FeeAccount, StoreError>;
}
