use crate::libs::config::StoreConfig;
use crate::libs::core::models::{canonical_pair, PlantId, RelationshipStatus, UserId};
use crate::libs::storage::database::storage_traits::{
    is_unique_violation, FriendStore, PlantStore, StoreError, Transactional, UserStore,
};
use crate::libs::storage::records::{PlantRecord, RelationshipRecord, UserRecord};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension, Row, Transaction, TransactionBehavior};
use std::time::Duration;
use tracing::debug;

pub struct SqliteTransaction<'conn> {
    tx: Transaction<'conn>,
}

impl<'conn> SqliteTransaction<'conn> {
    /// Opens an `IMMEDIATE` transaction: the write lock is taken up front so
    /// concurrent writers queue on `busy_timeout` instead of failing mid-way.
    pub fn new(
        conn: &'conn mut PooledConnection<SqliteConnectionManager>,
    ) -> Result<Self, StoreError> {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        Ok(Self { tx })
    }

    pub fn read_only(
        conn: &'conn mut PooledConnection<SqliteConnectionManager>,
    ) -> Result<Self, StoreError> {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Deferred)?;
        Ok(Self { tx })
    }

    pub fn inner(&self) -> &Transaction<'conn> {
        &self.tx
    }
}

impl<'conn> Transactional for SqliteTransaction<'conn> {
    fn commit(self) -> Result<(), StoreError> {
        Ok(self.tx.commit()?)
    }

    fn rollback(self) -> Result<(), StoreError> {
        Ok(self.tx.rollback()?)
    }
}

#[derive(Debug)]
pub struct SqliteStore {
    conn_pool: Pool<SqliteConnectionManager>,
}

impl SqliteStore {
    pub fn open(config: &StoreConfig) -> Result<Self, StoreError> {
        let busy_timeout = Duration::from_millis(config.busy_timeout_ms);
        let manager = SqliteConnectionManager::file(&config.db_path).with_init(move |conn| {
            conn.busy_timeout(busy_timeout)?;
            conn.pragma_update(None, "foreign_keys", "ON")?;
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
                row.get::<_, String>(0)
            })?;
            Ok(())
        });
        // r2d2 rejects a zero timeout
        let connection_timeout = Duration::from_millis(config.busy_timeout_ms.max(1));
        let conn_pool = Pool::builder()
            .max_size(config.max_connections.max(1))
            .connection_timeout(connection_timeout)
            .build(manager)
            .map_err(|e| {
                StoreError::Initialization(format!("cannot open {}: {}", config.db_path, e))
            })?;
        Ok(Self { conn_pool })
    }

    pub fn new_connection(
        &self,
    ) -> Result<PooledConnection<SqliteConnectionManager>, StoreError> {
        Ok(self.conn_pool.get()?)
    }

    /// Runs `f` inside one write transaction. Commits on `Ok`, rolls back on
    /// `Err`, so an operation either fully applies or leaves no trace.
    pub fn with_transaction<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut SqliteTransaction<'_>) -> Result<T, StoreError>,
    {
        let mut connection = self.new_connection()?;
        let tx = SqliteTransaction::new(&mut connection)?;
        finish(tx, f)
    }

    pub fn with_read_transaction<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut SqliteTransaction<'_>) -> Result<T, StoreError>,
    {
        let mut connection = self.new_connection()?;
        let tx = SqliteTransaction::read_only(&mut connection)?;
        finish(tx, f)
    }
}

fn finish<T, F>(mut tx: SqliteTransaction<'_>, f: F) -> Result<T, StoreError>
where
    F: FnOnce(&mut SqliteTransaction<'_>) -> Result<T, StoreError>,
{
    match f(&mut tx) {
        Ok(value) => {
            tx.commit()?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback() {
                debug!("rollback failed after {}: {}", err, rollback_err);
            }
            Err(err)
        }
    }
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRecord> {
    Ok(UserRecord {
        user_id: row.get(0)?,
        username: row.get(1)?,
        credential: row.get(2)?,
        created_at: row.get(3)?,
    })
}

impl<'conn> UserStore for SqliteTransaction<'conn> {
    fn insert_user(&mut self, record: &UserRecord) -> Result<(), StoreError> {
        self.tx
            .execute(
                "INSERT INTO users (user_id, username, credential, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    record.user_id,
                    record.username,
                    record.credential,
                    record.created_at
                ],
            )
            .map_err(|err| {
                if is_unique_violation(&err) {
                    StoreError::DuplicateName(record.username.clone())
                } else {
                    StoreError::Sqlite(err)
                }
            })?;
        Ok(())
    }

    fn load_user_by_name(&mut self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        let user = self
            .tx
            .query_row(
                "SELECT user_id, username, credential, created_at
                 FROM users WHERE username = ?1",
                [username],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    fn load_user_by_id(&mut self, user_id: &UserId) -> Result<Option<UserRecord>, StoreError> {
        let user = self
            .tx
            .query_row(
                "SELECT user_id, username, credential, created_at
                 FROM users WHERE user_id = ?1",
                [user_id],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    fn update_credential(
        &mut self,
        user_id: &UserId,
        credential: &str,
    ) -> Result<(), StoreError> {
        let updated = self.tx.execute(
            "UPDATE users SET credential = ?1 WHERE user_id = ?2",
            params![credential, user_id],
        )?;
        if updated == 0 {
            return Err(StoreError::UnknownUser(user_id.to_string()));
        }
        Ok(())
    }
}

fn relationship_from_row(row: &Row<'_>) -> rusqlite::Result<RelationshipRecord> {
    Ok(RelationshipRecord {
        user_a: row.get(0)?,
        user_b: row.get(1)?,
        requester: row.get(2)?,
        status: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

impl<'conn> FriendStore for SqliteTransaction<'conn> {
    fn load_relationship(
        &mut self,
        a: &UserId,
        b: &UserId,
    ) -> Result<Option<RelationshipRecord>, StoreError> {
        let (user_a, user_b) = canonical_pair(a, b);
        let relationship = self
            .tx
            .query_row(
                "SELECT user_a, user_b, requester, status, created_at, updated_at
                 FROM relationships WHERE user_a = ?1 AND user_b = ?2",
                params![user_a, user_b],
                relationship_from_row,
            )
            .optional()?;
        Ok(relationship)
    }

    fn insert_relationship(&mut self, record: &RelationshipRecord) -> Result<(), StoreError> {
        self.tx
            .execute(
                "INSERT INTO relationships
                 (user_a, user_b, requester, status, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    record.user_a,
                    record.user_b,
                    record.requester,
                    record.status,
                    record.created_at,
                    record.updated_at
                ],
            )
            .map_err(|err| {
                if is_unique_violation(&err) {
                    StoreError::DuplicateRequest
                } else {
                    StoreError::Sqlite(err)
                }
            })?;
        Ok(())
    }

    fn update_relationship_status(
        &mut self,
        a: &UserId,
        b: &UserId,
        status: RelationshipStatus,
        updated_at: i64,
    ) -> Result<usize, StoreError> {
        let (user_a, user_b) = canonical_pair(a, b);
        Ok(self.tx.execute(
            "UPDATE relationships SET status = ?1, updated_at = ?2
             WHERE user_a = ?3 AND user_b = ?4",
            params![status, updated_at, user_a, user_b],
        )?)
    }

    fn delete_relationship(&mut self, a: &UserId, b: &UserId) -> Result<usize, StoreError> {
        let (user_a, user_b) = canonical_pair(a, b);
        Ok(self.tx.execute(
            "DELETE FROM relationships WHERE user_a = ?1 AND user_b = ?2",
            params![user_a, user_b],
        )?)
    }

    fn load_relationships_for(
        &mut self,
        user_id: &UserId,
    ) -> Result<Vec<RelationshipRecord>, StoreError> {
        let mut stmt = self.tx.prepare(
            "SELECT user_a, user_b, requester, status, created_at, updated_at
             FROM relationships WHERE user_a = ?1 OR user_b = ?1",
        )?;
        let relationships = stmt
            .query_map([user_id], relationship_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(relationships)
    }
}

fn plant_from_row(row: &Row<'_>) -> rusqlite::Result<PlantRecord> {
    Ok(PlantRecord {
        plant_id: row.get(0)?,
        owner_id: row.get(1)?,
        name: row.get(2)?,
        age: row.get(3)?,
        shade: row.get(4)?,
        notes: row.get(5)?,
        photo: row.get(6)?,
        archived: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

fn map_plant_conflict(err: rusqlite::Error) -> StoreError {
    if is_unique_violation(&err) {
        StoreError::DuplicatePlant
    } else {
        StoreError::Sqlite(err)
    }
}

impl<'conn> PlantStore for SqliteTransaction<'conn> {
    fn insert_plant(&mut self, record: &PlantRecord) -> Result<(), StoreError> {
        self.tx
            .execute(
                "INSERT INTO plants
                 (plant_id, owner_id, name, age, shade, notes, photo, archived, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    record.plant_id,
                    record.owner_id,
                    record.name,
                    record.age,
                    record.shade,
                    record.notes,
                    record.photo,
                    record.archived,
                    record.created_at,
                    record.updated_at
                ],
            )
            .map_err(map_plant_conflict)?;
        Ok(())
    }

    fn update_plant(&mut self, record: &PlantRecord) -> Result<usize, StoreError> {
        self.tx
            .execute(
                "UPDATE plants
                 SET name = ?1, age = ?2, shade = ?3, notes = ?4, photo = ?5, updated_at = ?6
                 WHERE plant_id = ?7 AND owner_id = ?8",
                params![
                    record.name,
                    record.age,
                    record.shade,
                    record.notes,
                    record.photo,
                    record.updated_at,
                    record.plant_id,
                    record.owner_id
                ],
            )
            .map_err(map_plant_conflict)
    }

    fn delete_plant(
        &mut self,
        owner_id: &UserId,
        plant_id: &PlantId,
    ) -> Result<usize, StoreError> {
        Ok(self.tx.execute(
            "DELETE FROM plants WHERE plant_id = ?1 AND owner_id = ?2",
            params![plant_id, owner_id],
        )?)
    }

    fn set_plant_archived(
        &mut self,
        owner_id: &UserId,
        plant_id: &PlantId,
        archived: bool,
        updated_at: i64,
    ) -> Result<usize, StoreError> {
        Ok(self.tx.execute(
            "UPDATE plants SET archived = ?1, updated_at = ?2
             WHERE plant_id = ?3 AND owner_id = ?4",
            params![archived, updated_at, plant_id, owner_id],
        )?)
    }

    fn load_plant(
        &mut self,
        owner_id: &UserId,
        plant_id: &PlantId,
    ) -> Result<Option<PlantRecord>, StoreError> {
        let plant = self
            .tx
            .query_row(
                "SELECT plant_id, owner_id, name, age, shade, notes, photo, archived, created_at, updated_at
                 FROM plants WHERE plant_id = ?1 AND owner_id = ?2",
                params![plant_id, owner_id],
                plant_from_row,
            )
            .optional()?;
        Ok(plant)
    }

    fn load_plants(
        &mut self,
        owner_id: &UserId,
        archived: bool,
    ) -> Result<Vec<PlantRecord>, StoreError> {
        // plant_id is UUID v7, so it breaks created_at ties in insertion order
        let mut stmt = self.tx.prepare(
            "SELECT plant_id, owner_id, name, age, shade, notes, photo, archived, created_at, updated_at
             FROM plants WHERE owner_id = ?1 AND archived = ?2
             ORDER BY created_at DESC, plant_id DESC",
        )?;
        let plants = stmt
            .query_map(params![owner_id, archived], plant_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(plants)
    }
}
