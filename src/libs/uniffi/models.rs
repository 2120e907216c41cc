// Rust models for the exported types that will be used by front-end

use crate::libs::core::relationships::RequestCounts as CoreRequestCounts;
use crate::libs::storage::records::{PlantDraft, PlantRecord, UserRecord};

#[derive(Clone, Copy, Hash, Eq, PartialEq, uniffi::Enum, Debug)]
pub enum UserType {
    Current,
    Friend,
    IncomingRequest,
    OutgoingRequest,
}

#[derive(Clone, Hash, Eq, PartialEq, uniffi::Record, Debug)]
pub struct User {
    pub user_id: String,
    pub username: String,
    pub user_type: UserType,
}

impl User {
    pub fn from_record(record: &UserRecord, user_type: UserType) -> Self {
        Self {
            user_id: record.user_id.to_string(),
            username: record.username.clone(),
            user_type,
        }
    }
}

#[derive(Clone, PartialEq, uniffi::Record, Debug)]
pub struct PlantDetails {
    pub name: String,
    pub age: String,
    pub shade: bool,
    pub notes: String,
    pub photo: Option<String>,
}

impl From<PlantDetails> for PlantDraft {
    fn from(details: PlantDetails) -> Self {
        PlantDraft {
            name: details.name,
            age: details.age,
            shade: details.shade,
            notes: details.notes,
            photo: details.photo,
        }
    }
}

#[derive(Clone, PartialEq, uniffi::Record, Debug)]
pub struct Plant {
    pub plant_id: String,
    pub name: String,
    pub age: String,
    pub shade: bool,
    pub notes: String,
    pub photo: Option<String>,
    pub archived: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<PlantRecord> for Plant {
    fn from(record: PlantRecord) -> Self {
        Self {
            plant_id: record.plant_id.to_string(),
            name: record.name,
            age: record.age,
            shade: record.shade,
            notes: record.notes,
            photo: record.photo,
            archived: record.archived,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, uniffi::Record, Debug)]
pub struct RequestCounts {
    pub incoming: u32,
    pub outgoing: u32,
}

impl From<CoreRequestCounts> for RequestCounts {
    fn from(counts: CoreRequestCounts) -> Self {
        Self {
            incoming: counts.incoming,
            outgoing: counts.outgoing,
        }
    }
}
