use crate::libs::core::models::{PlantId, RelationshipStatus, UserId};
use crate::libs::storage::records::{PlantRecord, RelationshipRecord, UserRecord};
use rusqlite::ErrorCode;
use thiserror::Error;

pub trait Transactional {
    fn commit(self) -> Result<(), StoreError>;
    fn rollback(self) -> Result<(), StoreError>;
}

pub trait UserStore {
    fn insert_user(&mut self, record: &UserRecord) -> Result<(), StoreError>;
    fn load_user_by_name(&mut self, username: &str) -> Result<Option<UserRecord>, StoreError>;
    fn load_user_by_id(&mut self, user_id: &UserId) -> Result<Option<UserRecord>, StoreError>;
    fn update_credential(&mut self, user_id: &UserId, credential: &str)
        -> Result<(), StoreError>;
}

pub trait FriendStore {
    fn load_relationship(
        &mut self,
        a: &UserId,
        b: &UserId,
    ) -> Result<Option<RelationshipRecord>, StoreError>;
    fn insert_relationship(&mut self, record: &RelationshipRecord) -> Result<(), StoreError>;
    fn update_relationship_status(
        &mut self,
        a: &UserId,
        b: &UserId,
        status: RelationshipStatus,
        updated_at: i64,
    ) -> Result<usize, StoreError>;
    fn delete_relationship(&mut self, a: &UserId, b: &UserId) -> Result<usize, StoreError>;
    fn load_relationships_for(
        &mut self,
        user_id: &UserId,
    ) -> Result<Vec<RelationshipRecord>, StoreError>;
}

pub trait PlantStore {
    fn insert_plant(&mut self, record: &PlantRecord) -> Result<(), StoreError>;
    fn update_plant(&mut self, record: &PlantRecord) -> Result<usize, StoreError>;
    fn delete_plant(&mut self, owner_id: &UserId, plant_id: &PlantId)
        -> Result<usize, StoreError>;
    fn set_plant_archived(
        &mut self,
        owner_id: &UserId,
        plant_id: &PlantId,
        archived: bool,
        updated_at: i64,
    ) -> Result<usize, StoreError>;
    fn load_plant(
        &mut self,
        owner_id: &UserId,
        plant_id: &PlantId,
    ) -> Result<Option<PlantRecord>, StoreError>;
    fn load_plants(
        &mut self,
        owner_id: &UserId,
        archived: bool,
    ) -> Result<Vec<PlantRecord>, StoreError>;
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Sqlite Error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("ConnectionPool Error: {0}")]
    ConnectionPool(#[from] r2d2::Error),
    #[error("Initialization Error: {0}")]
    Initialization(String),
    #[error("Credential Error: {0}")]
    Credential(String),
    #[error("Username already exists: {0}")]
    DuplicateName(String),
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("You cannot add yourself")]
    SelfRequest,
    #[error("Already connected or request pending")]
    DuplicateRequest,
    #[error("No such {0}")]
    NotFound(&'static str),
    #[error("User does not exist: {0}")]
    UnknownUser(String),
    #[error("A plant with this name and notes already exists")]
    DuplicatePlant,
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl StoreError {
    /// True when an open store was momentarily unavailable (pool checkout
    /// timed out, database busy or locked); the caller may retry the same
    /// operation. Failing to open the store at all is `Initialization`.
    pub fn is_retryable(&self) -> bool {
        match self {
            StoreError::ConnectionPool(_) => true,
            StoreError::Sqlite(rusqlite::Error::SqliteFailure(err, _)) => matches!(
                err.code,
                ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked
            ),
            _ => false,
        }
    }
}

pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}
