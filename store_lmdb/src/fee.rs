//! LMDB implementation of FeeStore.

use heed::RoTxn;

use keyring_store::fee::{FeeAccount, FeeStore};
use keyring_store::StoreError;
use keyring_types::TokenAmount;

use crate::environment::{LmdbEnvironment, FEE_ACCOUNT_KEY};
use crate::error::{decode, encode, heed_err};

impl LmdbEnvironment {
    fn read_fee_account(&self, txn: &RoTxn<'_>) -> Result<FeeAccount, StoreError> {
        match self.meta_db.get(txn, FEE_ACCOUNT_KEY).map_err(heed_err)? {
            Some(bytes) => decode(bytes),
            None => Ok(FeeAccount::default()),
        }
    }

    fn update_fee_account(
        &self,
        apply: impl FnOnce(FeeAccount) -> Result<FeeAccount, StoreError>,
    ) -> Result<FeeAccount, StoreError> {
        let mut wtxn = self.env.write_txn().map_err(heed_err)?;
        let updated = apply(self.read_fee_account(&wtxn)?)?;
        self.meta_db
            .put(&mut wtxn, FEE_ACCOUNT_KEY, &encode(&updated)?)
            .map_err(heed_err)?;
        wtxn.commit().map_err(heed_err)?;
        Ok(updated)
    }
}

impl FeeStore for LmdbEnvironment {
    fn fee_account(&self) -> Result<FeeAccount, StoreError> {
        let rtxn = self.env.read_txn().map_err(heed_err)?;
        self.read_fee_account(&rtxn)
    }

    fn fund(&self, amount: TokenAmount) -> Result<FeeAccount, StoreError> {
        self.update_fee_account(|account| account.credited(amount))
    }

    fn debit(&self, fee: TokenAmount) -> Result<FeeAccount, StoreError> {
        self.update_fee_account(|account| account.debited(fee))
    }
}
