use crate::libs::config::StoreConfig;
use crate::libs::storage::database::storage_sqllite::SqliteStore;
use crate::libs::storage::database::storage_traits::StoreError;
use rusqlite::OptionalExtension;
use tracing::info;

pub const SCHEMA_VERSION: i64 = 1;

pub fn open_database(config: &StoreConfig) -> Result<SqliteStore, StoreError> {
    let store = SqliteStore::open(config)?;
    db_migration(&store)?;
    info!("Database opened at {}", config.db_path);
    Ok(store)
}

pub fn db_migration(store: &SqliteStore) -> Result<(), StoreError> {
    store.with_transaction(|sqlite_transaction| {
        let has_settings: bool = sqlite_transaction.inner().query_row(
            "SELECT EXISTS (SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'app_settings')",
            [],
            |row| row.get(0),
        )?;

        let existing: Option<String> = if has_settings {
            sqlite_transaction
                .inner()
                .query_row(
                    "SELECT value FROM app_settings WHERE key = 'schema_version'",
                    [],
                    |row| row.get(0),
                )
                .optional()?
        } else {
            None
        };

        if let Some(version) = existing {
            let version: i64 = version.parse().map_err(|_| {
                StoreError::Initialization(format!("Unreadable schema version: {}", version))
            })?;
            if version > SCHEMA_VERSION {
                return Err(StoreError::Initialization(format!(
                    "Database schema {} is newer than supported {}",
                    version, SCHEMA_VERSION
                )));
            }
        }

        sqlite_transaction.inner().execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                user_id TEXT PRIMARY KEY,
                username TEXT NOT NULL UNIQUE,
                credential TEXT NOT NULL,
                created_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
            );

            -- one row per unordered pair, stored with user_a < user_b
            CREATE TABLE IF NOT EXISTS relationships (
                user_a TEXT NOT NULL,
                user_b TEXT NOT NULL,
                requester TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending',
                created_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now')),
                updated_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now')),

                UNIQUE (user_a, user_b),
                CHECK (user_a < user_b),
                CHECK (requester IN (user_a, user_b)),
                CHECK (status IN ('pending', 'accepted')),
                FOREIGN KEY (user_a) REFERENCES users(user_id) ON DELETE CASCADE,
                FOREIGN KEY (user_b) REFERENCES users(user_id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_relationships_user_b
                ON relationships(user_b);

            CREATE TABLE IF NOT EXISTS plants (
                plant_id TEXT PRIMARY KEY,
                owner_id TEXT NOT NULL,
                name TEXT NOT NULL,
                age TEXT NOT NULL DEFAULT '',
                shade BOOLEAN NOT NULL DEFAULT false,
                notes TEXT NOT NULL DEFAULT '',
                photo TEXT,
                archived BOOLEAN NOT NULL DEFAULT false,
                created_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now')),
                updated_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now')),

                UNIQUE (owner_id, name, notes),
                FOREIGN KEY (owner_id) REFERENCES users(user_id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_plants_owner
                ON plants(owner_id, archived, created_at);

            CREATE TABLE IF NOT EXISTS app_settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
            );
            "#,
        )?;

        sqlite_transaction.inner().execute(
            "INSERT OR IGNORE INTO app_settings (key, value) VALUES ('schema_version', ?1)",
            [SCHEMA_VERSION.to_string()],
        )?;

        Ok(())
    })?;

    info!("Database migrations complete");
    Ok(())
}

pub fn schema_version(store: &SqliteStore) -> Result<Option<i64>, StoreError> {
    store.with_read_transaction(|sqlite_transaction| {
        let version: Option<String> = sqlite_transaction
            .inner()
            .query_row(
                "SELECT value FROM app_settings WHERE key = 'schema_version'",
                [],
                |row| row.get(0),
            )
            .optional()?;
        version
            .map(|v| {
                v.parse::<i64>().map_err(|_| {
                    StoreError::Initialization(format!("Unreadable schema version: {}", v))
                })
            })
            .transpose()
    })
}
