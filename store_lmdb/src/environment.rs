//! LMDB environment setup.

use std::path::Path;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};

use crate::LmdbError;

const CREDENTIALS_DB: &str = "credentials";
const REQUESTS_DB: &str = "requests";
const TOKENS_DB: &str = "tokens";
const META_DB: &str = "meta";

/// Key in the meta database holding the last assigned token id (u64, big endian).
pub(crate) const LAST_TOKEN_ID_KEY: &[u8] = b"last_token_id";
/// Key in the meta database holding the bincode `FeeAccount`.
pub(crate) const FEE_ACCOUNT_KEY: &[u8] = b"fee_account";

/// Wraps the LMDB environment and all database handles.
///
/// Cloning is cheap; clones share the same environment.
#[derive(Clone)]
pub struct LmdbEnvironment {
    pub(crate) env: Env,
    /// identity bytes → bincode `CredentialRecord`
    pub(crate) credentials_db: Database<Bytes, Bytes>,
    /// handle bytes → bincode `PendingRequest`
    pub(crate) requests_db: Database<Bytes, Bytes>,
    /// token id (u64, big endian) → identity bytes, for every live record
    pub(crate) tokens_db: Database<Bytes, Bytes>,
    pub(crate) meta_db: Database<Bytes, Bytes>,
}

impl LmdbEnvironment {
    /// Default map size: 64 MiB holds several hundred thousand credentials.
    pub const DEFAULT_MAP_SIZE: usize = 64 * 1024 * 1024;

    /// Open or create an LMDB environment at the given directory.
    pub fn open(path: &Path, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path)?;

        // SAFETY: the registry is the only process opening this directory, and
        // the environment is opened once per process and shared through clones.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(4)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let credentials_db = env.create_database(&mut wtxn, Some(CREDENTIALS_DB))?;
        let requests_db = env.create_database(&mut wtxn, Some(REQUESTS_DB))?;
        let tokens_db = env.create_database(&mut wtxn, Some(TOKENS_DB))?;
        let meta_db = env.create_database(&mut wtxn, Some(META_DB))?;
        wtxn.commit()?;

        tracing::debug!(path = %path.display(), map_size, "opened LMDB environment");

        Ok(Self {
            env,
            credentials_db,
            requests_db,
            tokens_db,
            meta_db,
        })
    }
}
