pub mod libs;

use crate::libs::config::StoreConfig;
use crate::libs::core::garden_store::GardenStore;
use crate::libs::core::models::{PlantId, RelationshipStatus, UserId};
use crate::libs::logging::{self, LoggingError};
use crate::libs::storage::database::storage_traits::StoreError;
use crate::libs::storage::records::UserRecord;
use crate::libs::uniffi::models::{Plant, PlantDetails, RequestCounts, User, UserType};
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::info;

uniffi::setup_scaffolding!("garden_tracker_lib");

/// Errors handed to the UI. `Display` is the status line shown to the user.
#[derive(Debug, thiserror::Error, uniffi::Error)]
#[uniffi(flat_error)]
pub enum GardenError {
    #[error("Username already exists")]
    DuplicateName,
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("You cannot add yourself")]
    SelfRequest,
    #[error("You are already connected or a request is pending")]
    DuplicateRequest,
    #[error("No such {0}")]
    NotFound(String),
    #[error("User does not exist")]
    UnknownUser,
    #[error("A plant with that name and notes already exists")]
    DuplicatePlant,
    #[error("{0}")]
    InvalidInput(String),
    #[error("Passwords do not match")]
    SecretMismatch,
    #[error("Not signed in")]
    NotSignedIn,
    #[error("Storage is busy, try again ({0})")]
    Unavailable(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Logging error: {0}")]
    Logging(String),
}

impl GardenError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, GardenError::Unavailable(_))
    }
}

impl From<StoreError> for GardenError {
    fn from(err: StoreError) -> Self {
        if err.is_retryable() {
            return GardenError::Unavailable(err.to_string());
        }
        match err {
            StoreError::DuplicateName(_) => GardenError::DuplicateName,
            StoreError::InvalidCredentials => GardenError::InvalidCredentials,
            StoreError::SelfRequest => GardenError::SelfRequest,
            StoreError::DuplicateRequest => GardenError::DuplicateRequest,
            StoreError::NotFound(what) => GardenError::NotFound(what.to_string()),
            StoreError::UnknownUser(_) => GardenError::UnknownUser,
            StoreError::DuplicatePlant => GardenError::DuplicatePlant,
            StoreError::InvalidInput(message) => GardenError::InvalidInput(message),
            other => GardenError::Storage(other.to_string()),
        }
    }
}

impl From<LoggingError> for GardenError {
    fn from(err: LoggingError) -> Self {
        GardenError::Logging(err.to_string())
    }
}

#[uniffi::export]
pub fn init_logging(directives: String) -> Result<(), GardenError> {
    Ok(logging::init_logging(&directives)?)
}

#[uniffi::export]
pub fn default_config(db_path: String) -> StoreConfig {
    StoreConfig::new(db_path)
}

/// Application state for one window: the store plus whoever is signed in.
#[derive(uniffi::Object)]
pub struct GardenApp {
    store: GardenStore,
    current_user: Mutex<Option<UserRecord>>,
}

impl GardenApp {
    fn session(&self) -> MutexGuard<'_, Option<UserRecord>> {
        // the guarded value is a plain Option, so a poisoned lock is still usable
        self.current_user
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn signed_in(&self) -> Result<UserRecord, GardenError> {
        self.session()
            .as_ref()
            .cloned()
            .ok_or(GardenError::NotSignedIn)
    }

    fn sign_in(&self, user_id: &UserId) -> Result<User, GardenError> {
        let record = self.store.load_user(user_id)?;
        let user = User::from_record(&record, UserType::Current);
        *self.session() = Some(record);
        info!("Signed in as {}", user.username);
        Ok(user)
    }

    fn resolve(&self, username: &str) -> Result<UserId, GardenError> {
        if username.trim().is_empty() {
            return Err(GardenError::InvalidInput("Enter a username".to_string()));
        }
        Ok(self.store.lookup_user(username)?)
    }

    fn users(&self, ids: &BTreeSet<UserId>, user_type: UserType) -> Result<Vec<User>, GardenError> {
        Ok(self
            .store
            .load_users(ids)?
            .iter()
            .map(|record| User::from_record(record, user_type))
            .collect())
    }
}

fn parse_plant_id(plant_id: &str) -> Result<PlantId, GardenError> {
    PlantId::parse(plant_id).map_err(|_| GardenError::NotFound("plant".to_string()))
}

#[uniffi::export]
impl GardenApp {
    #[uniffi::constructor]
    pub fn open(config: StoreConfig) -> Result<Arc<Self>, GardenError> {
        let store = GardenStore::open(config)?;
        Ok(Arc::new(Self {
            store,
            current_user: Mutex::new(None),
        }))
    }

    /// Registers and signs the new user in.
    pub fn register(
        &self,
        username: String,
        secret: String,
        confirm: String,
    ) -> Result<User, GardenError> {
        if secret != confirm {
            return Err(GardenError::SecretMismatch);
        }
        let user_id = self.store.register(&username, &secret)?;
        self.sign_in(&user_id)
    }

    pub fn login(&self, username: String, secret: String) -> Result<User, GardenError> {
        let user_id = self.store.authenticate(&username, &secret)?;
        self.sign_in(&user_id)
    }

    pub fn logout(&self) {
        if let Some(user) = self.session().take() {
            info!("Signed out {}", user.username);
        }
    }

    pub fn current_user(&self) -> Option<User> {
        self.session()
            .as_ref()
            .map(|record| User::from_record(record, UserType::Current))
    }

    pub fn change_secret(
        &self,
        old_secret: String,
        new_secret: String,
        confirm: String,
    ) -> Result<(), GardenError> {
        let me = self.signed_in()?;
        if new_secret != confirm {
            return Err(GardenError::SecretMismatch);
        }
        Ok(self
            .store
            .change_secret(&me.user_id, &old_secret, &new_secret)?)
    }

    pub fn send_friend_request(&self, username: String) -> Result<(), GardenError> {
        let me = self.signed_in()?;
        let target = self.resolve(&username)?;
        Ok(self.store.send_request(&me.user_id, &target)?)
    }

    pub fn accept_friend_request(&self, from: String) -> Result<(), GardenError> {
        let me = self.signed_in()?;
        let sender = self.resolve(&from)?;
        Ok(self.store.accept_request(&sender, &me.user_id)?)
    }

    pub fn decline_friend_request(&self, from: String) -> Result<(), GardenError> {
        let me = self.signed_in()?;
        let sender = self.resolve(&from)?;
        Ok(self.store.decline_request(&sender, &me.user_id)?)
    }

    pub fn cancel_friend_request(&self, to: String) -> Result<(), GardenError> {
        let me = self.signed_in()?;
        let receiver = self.resolve(&to)?;
        Ok(self.store.cancel_request(&me.user_id, &receiver)?)
    }

    pub fn remove_friend(&self, username: String) -> Result<(), GardenError> {
        let me = self.signed_in()?;
        let friend = self.resolve(&username)?;
        Ok(self.store.remove_friendship(&me.user_id, &friend)?)
    }

    pub fn friends(&self) -> Result<Vec<User>, GardenError> {
        let me = self.signed_in()?;
        let ids = self.store.list_friends(&me.user_id)?;
        self.users(&ids, UserType::Friend)
    }

    pub fn incoming_requests(&self) -> Result<Vec<User>, GardenError> {
        let me = self.signed_in()?;
        let ids = self.store.list_incoming(&me.user_id)?;
        self.users(&ids, UserType::IncomingRequest)
    }

    pub fn outgoing_requests(&self) -> Result<Vec<User>, GardenError> {
        let me = self.signed_in()?;
        let ids = self.store.list_outgoing(&me.user_id)?;
        self.users(&ids, UserType::OutgoingRequest)
    }

    /// How `username` relates to the signed-in user: `Friend`, `IncomingRequest`,
    /// `OutgoingRequest`, or `None` when unconnected.
    pub fn relationship_with(&self, username: String) -> Result<Option<UserType>, GardenError> {
        let me = self.signed_in()?;
        let other = self.resolve(&username)?;
        let relationship = self.store.relationship_between(&me.user_id, &other)?;
        Ok(relationship.map(|relationship| match relationship.status {
            RelationshipStatus::Accepted => UserType::Friend,
            RelationshipStatus::Pending if relationship.requester == me.user_id => {
                UserType::OutgoingRequest
            }
            RelationshipStatus::Pending => UserType::IncomingRequest,
        }))
    }

    pub fn request_counts(&self) -> Result<RequestCounts, GardenError> {
        let me = self.signed_in()?;
        Ok(self.store.request_counts(&me.user_id)?.into())
    }

    pub fn add_plant(&self, details: PlantDetails) -> Result<Plant, GardenError> {
        let me = self.signed_in()?;
        Ok(self.store.add_plant(&me.user_id, details.into())?.into())
    }

    pub fn update_plant(
        &self,
        plant_id: String,
        details: PlantDetails,
    ) -> Result<Plant, GardenError> {
        let me = self.signed_in()?;
        let plant_id = parse_plant_id(&plant_id)?;
        Ok(self
            .store
            .update_plant(&me.user_id, &plant_id, details.into())?
            .into())
    }

    pub fn delete_plant(&self, plant_id: String) -> Result<(), GardenError> {
        let me = self.signed_in()?;
        let plant_id = parse_plant_id(&plant_id)?;
        Ok(self.store.delete_plant(&me.user_id, &plant_id)?)
    }

    pub fn archive_plant(&self, plant_id: String) -> Result<(), GardenError> {
        let me = self.signed_in()?;
        let plant_id = parse_plant_id(&plant_id)?;
        Ok(self.store.set_archived(&me.user_id, &plant_id, true)?)
    }

    pub fn unarchive_plant(&self, plant_id: String) -> Result<(), GardenError> {
        let me = self.signed_in()?;
        let plant_id = parse_plant_id(&plant_id)?;
        Ok(self.store.set_archived(&me.user_id, &plant_id, false)?)
    }

    pub fn plant(&self, plant_id: String) -> Result<Plant, GardenError> {
        let me = self.signed_in()?;
        let plant_id = parse_plant_id(&plant_id)?;
        Ok(self.store.load_plant(&me.user_id, &plant_id)?.into())
    }

    pub fn plants(&self, archived: bool) -> Result<Vec<Plant>, GardenError> {
        let me = self.signed_in()?;
        Ok(self
            .store
            .list_plants(&me.user_id, archived)?
            .into_iter()
            .map(Plant::from)
            .collect())
    }
}
