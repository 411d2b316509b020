//! LMDB implementation of RequestStore.

use keyring_store::request::{PendingRequest, RequestStore};
use keyring_store::StoreError;
use keyring_types::RequestHandle;

use crate::environment::LmdbEnvironment;
use crate::error::{decode, encode, heed_err};

impl RequestStore for LmdbEnvironment {
    fn put_request(&self, request: &PendingRequest) -> Result<(), StoreError> {
        let key = request.handle.as_bytes();
        let mut wtxn = self.env.write_txn().map_err(heed_err)?;
        if self.requests_db.get(&wtxn, key).map_err(heed_err)?.is_some() {
            return Err(StoreError::DuplicateRequest(request.handle));
        }
        self.requests_db
            .put(&mut wtxn, key, &encode(request)?)
            .map_err(heed_err)?;
        wtxn.commit().map_err(heed_err)?;
        Ok(())
    }

    fn take_request(&self, handle: &RequestHandle) -> Result<Option<PendingRequest>, StoreError> {
        let mut wtxn = self.env.write_txn().map_err(heed_err)?;
        let request: Option<PendingRequest> = match self
            .requests_db
            .get(&wtxn, handle.as_bytes())
            .map_err(heed_err)?
        {
            Some(bytes) => Some(decode(bytes)?),
            None => None,
        };
        if request.is_some() {
            self.requests_db
                .delete(&mut wtxn, handle.as_bytes())
                .map_err(heed_err)?;
            wtxn.commit().map_err(heed_err)?;
        }
        Ok(request)
    }

    fn get_request(&self, handle: &RequestHandle) -> Result<Option<PendingRequest>, StoreError> {
        let rtxn = self.env.read_txn().map_err(heed_err)?;
        match self
            .requests_db
            .get(&rtxn, handle.as_bytes())
            .map_err(heed_err)?
        {
            Some(bytes) => decode(bytes).map(Some),
            None => Ok(None),
        }
    }

    fn contains_request(&self, handle: &RequestHandle) -> Result<bool, StoreError> {
        let rtxn = self.env.read_txn().map_err(heed_err)?;
        Ok(self
            .requests_db
            .get(&rtxn, handle.as_bytes())
            .map_err(heed_err)?
            .is_some())
    }

    fn outstanding_requests(&self) -> Result<Vec<PendingRequest>, StoreError> {
        let rtxn = self.env.read_txn().map_err(heed_err)?;
        let mut requests = Vec::new();
        for entry in self.requests_db.iter(&rtxn).map_err(heed_err)? {
            let (_key, bytes) = entry.map_err(heed_err)?;
            requests.push(decode(bytes)?);
        }
        Ok(requests)
    }
}
