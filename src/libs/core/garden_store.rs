use crate::libs::config::StoreConfig;
use crate::libs::core::credentials::CredentialHasher;
use crate::libs::storage::database::database::open_database;
use crate::libs::storage::database::storage_sqllite::SqliteStore;
use crate::libs::storage::database::storage_traits::StoreError;

/// Accounts, the friendship relation and plant journals over one SQLite file.
///
/// Every public operation runs in its own transaction; see
/// [`SqliteStore::with_transaction`].
#[derive(Debug)]
pub struct GardenStore {
    pub(crate) database: SqliteStore,
    pub(crate) hasher: CredentialHasher,
    pub(crate) config: StoreConfig,
}

impl GardenStore {
    pub fn open(config: StoreConfig) -> Result<Self, StoreError> {
        let hasher =
            CredentialHasher::new(config.credential_memory_kib, config.credential_iterations)?;
        let database = open_database(&config)?;
        Ok(Self {
            database,
            hasher,
            config,
        })
    }

    pub fn database(&self) -> &SqliteStore {
        &self.database
    }
}

pub(crate) fn now() -> i64 {
    chrono::Utc::now().timestamp()
}
