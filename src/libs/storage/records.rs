use crate::libs::core::models::{canonical_pair, PlantId, RelationshipStatus, UserId};
use std::fmt;

#[derive(Clone)]
pub struct UserRecord {
    pub user_id: UserId,
    pub username: String,
    pub credential: String,
    pub created_at: i64,
}

impl UserRecord {
    pub fn new(username: String, credential: String, created_at: i64) -> Self {
        Self {
            user_id: UserId::generate(),
            username,
            credential,
            created_at,
        }
    }
}

impl fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserRecord")
            .field("user_id", &self.user_id)
            .field("username", &self.username)
            .field("credential", &"[REDACTED]")
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// One row of the `relationships` table. `user_a < user_b` always holds;
/// the direction of a pending request lives in `requester`.
#[derive(Clone, Debug, PartialEq)]
pub struct RelationshipRecord {
    pub user_a: UserId,
    pub user_b: UserId,
    pub requester: UserId,
    pub status: RelationshipStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

impl RelationshipRecord {
    pub fn pending(from: &UserId, to: &UserId, now: i64) -> Self {
        let (user_a, user_b) = canonical_pair(from, to);
        Self {
            user_a: user_a.clone(),
            user_b: user_b.clone(),
            requester: from.clone(),
            status: RelationshipStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// The party the request was sent to.
    pub fn addressee(&self) -> &UserId {
        self.other(&self.requester)
    }

    /// The other side of the pair as seen from `user`.
    pub fn other(&self, user: &UserId) -> &UserId {
        if *user == self.user_a {
            &self.user_b
        } else {
            &self.user_a
        }
    }

    pub fn is_pending_from(&self, from: &UserId) -> bool {
        self.status == RelationshipStatus::Pending && self.requester == *from
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlantDraft {
    pub name: String,
    pub age: String,
    pub shade: bool,
    pub notes: String,
    pub photo: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlantRecord {
    pub plant_id: PlantId,
    pub owner_id: UserId,
    pub name: String,
    pub age: String,
    pub shade: bool,
    pub notes: String,
    pub photo: Option<String>,
    pub archived: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl PlantRecord {
    pub fn new(owner_id: &UserId, draft: PlantDraft, now: i64) -> Self {
        Self {
            plant_id: PlantId::generate(),
            owner_id: owner_id.clone(),
            name: draft.name,
            age: draft.age,
            shade: draft.shade,
            notes: draft.notes,
            photo: draft.photo,
            archived: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, draft: PlantDraft, now: i64) {
        self.name = draft.name;
        self.age = draft.age;
        self.shade = draft.shade;
        self.notes = draft.notes;
        self.photo = draft.photo;
        self.updated_at = now;
    }
}
