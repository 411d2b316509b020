//! LMDB implementation of CredentialStore.
//!
//! Records are keyed by the 20 identity bytes. The last assigned token id lives
//! in the meta database and is bumped in the same write transaction that
//! inserts the Pending record and its token id → identity index entry.

use heed::RoTxn;

use keyring_store::credential::{check_new_pending, CredentialRecord, CredentialStore};
use keyring_store::StoreError;
use keyring_types::{Address, Timestamp, TokenId};

use crate::environment::{LmdbEnvironment, LAST_TOKEN_ID_KEY};
use crate::error::{decode, encode, heed_err};

impl LmdbEnvironment {
    fn read_record(
        &self,
        txn: &RoTxn<'_>,
        identity: &Address,
    ) -> Result<Option<CredentialRecord>, StoreError> {
        match self
            .credentials_db
            .get(txn, identity.as_bytes())
            .map_err(heed_err)?
        {
            Some(bytes) => decode(bytes).map(Some),
            None => Ok(None),
        }
    }

    fn read_last_token_id(&self, txn: &RoTxn<'_>) -> Result<Option<TokenId>, StoreError> {
        let Some(bytes) = self.meta_db.get(txn, LAST_TOKEN_ID_KEY).map_err(heed_err)? else {
            return Ok(None);
        };
        let raw: [u8; 8] = bytes
            .try_into()
            .map_err(|_| StoreError::Corruption(format!("last token id is {} bytes", bytes.len())))?;
        Ok(Some(TokenId::new(u64::from_be_bytes(raw))))
    }
}

impl CredentialStore for LmdbEnvironment {
    fn has_record(&self, identity: &Address) -> Result<bool, StoreError> {
        let rtxn = self.env.read_txn().map_err(heed_err)?;
        Ok(self
            .credentials_db
            .get(&rtxn, identity.as_bytes())
            .map_err(heed_err)?
            .is_some())
    }

    fn record_for(&self, identity: &Address) -> Result<Option<CredentialRecord>, StoreError> {
        let rtxn = self.env.read_txn().map_err(heed_err)?;
        self.read_record(&rtxn, identity)
    }

    fn upsert_pending(
        &self,
        identity: &Address,
        token_id: TokenId,
        requested_at: Timestamp,
    ) -> Result<CredentialRecord, StoreError> {
        let mut wtxn = self.env.write_txn().map_err(heed_err)?;
        let existing = self.read_record(&wtxn, identity)?;
        let last = self.read_last_token_id(&wtxn)?;
        let record = check_new_pending(existing.as_ref(), last, identity, token_id, requested_at)?;

        self.credentials_db
            .put(&mut wtxn, identity.as_bytes(), &encode(&record)?)
            .map_err(heed_err)?;
        self.tokens_db
            .put(&mut wtxn, &token_id.get().to_be_bytes(), identity.as_bytes())
            .map_err(heed_err)?;
        self.meta_db
            .put(&mut wtxn, LAST_TOKEN_ID_KEY, &token_id.get().to_be_bytes())
            .map_err(heed_err)?;
        wtxn.commit().map_err(heed_err)?;
        Ok(record)
    }

    fn finalize(
        &self,
        identity: &Address,
        issued_at: Timestamp,
    ) -> Result<CredentialRecord, StoreError> {
        let mut wtxn = self.env.write_txn().map_err(heed_err)?;
        let active = self
            .read_record(&wtxn, identity)?
            .and_then(|r| r.activated(issued_at))
            .ok_or(StoreError::NoSuchPendingRecord(*identity))?;

        self.credentials_db
            .put(&mut wtxn, identity.as_bytes(), &encode(&active)?)
            .map_err(heed_err)?;
        wtxn.commit().map_err(heed_err)?;
        Ok(active)
    }

    fn discard_pending(&self, identity: &Address) -> Result<CredentialRecord, StoreError> {
        let mut wtxn = self.env.write_txn().map_err(heed_err)?;
        let record = self
            .read_record(&wtxn, identity)?
            .filter(CredentialRecord::is_pending)
            .ok_or(StoreError::NoSuchPendingRecord(*identity))?;

        self.credentials_db
            .delete(&mut wtxn, identity.as_bytes())
            .map_err(heed_err)?;
        self.tokens_db
            .delete(&mut wtxn, &record.token_id.get().to_be_bytes())
            .map_err(heed_err)?;
        wtxn.commit().map_err(heed_err)?;
        Ok(record)
    }

    fn last_token_id(&self) -> Result<Option<TokenId>, StoreError> {
        let rtxn = self.env.read_txn().map_err(heed_err)?;
        self.read_last_token_id(&rtxn)
    }

    fn owner_of(&self, token_id: TokenId) -> Result<Option<Address>, StoreError> {
        let rtxn = self.env.read_txn().map_err(heed_err)?;
        let Some(bytes) = self
            .tokens_db
            .get(&rtxn, &token_id.get().to_be_bytes())
            .map_err(heed_err)?
        else {
            return Ok(None);
        };
        let raw: [u8; 20] = bytes.try_into().map_err(|_| {
            StoreError::Corruption(format!("owner of token {token_id} is {} bytes", bytes.len()))
        })?;
        Ok(Some(Address::new(raw)))
    }

    fn record_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.env.read_txn().map_err(heed_err)?;
        self.credentials_db.len(&rtxn).map_err(heed_err)
    }
}
