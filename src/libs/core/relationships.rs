use crate::libs::core::garden_store::{now, GardenStore};
use crate::libs::core::models::{RelationshipStatus, UserId};
use crate::libs::storage::database::storage_sqllite::SqliteTransaction;
use crate::libs::storage::database::storage_traits::{FriendStore, StoreError, UserStore};
use crate::libs::storage::records::RelationshipRecord;
use std::collections::BTreeSet;
use tracing::{debug, info};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RequestCounts {
    pub incoming: u32,
    pub outgoing: u32,
}

// Lifecycle per ordered pair (A, B):
//   NONE --send(A,B)--> PENDING(A->B) --accept(A,B)--> ACCEPTED --remove--> NONE
//   PENDING(A->B) --decline/cancel(A,B)--> NONE
impl GardenStore {
    pub fn send_request(&self, from: &UserId, to: &UserId) -> Result<(), StoreError> {
        if from == to {
            return Err(StoreError::SelfRequest);
        }

        self.database.with_transaction(|tx| {
            ensure_user(tx, from)?;
            ensure_user(tx, to)?;
            if tx.load_relationship(from, to)?.is_some() {
                return Err(StoreError::DuplicateRequest);
            }
            tx.insert_relationship(&RelationshipRecord::pending(from, to, now()))
        })?;

        info!("Friend request {} -> {}", from, to);
        Ok(())
    }

    pub fn accept_request(&self, from: &UserId, to: &UserId) -> Result<(), StoreError> {
        self.database.with_transaction(|tx| {
            match tx.load_relationship(from, to)? {
                Some(relationship) if relationship.is_pending_from(from) => {
                    tx.update_relationship_status(
                        from,
                        to,
                        RelationshipStatus::Accepted,
                        now(),
                    )?;
                    Ok(())
                }
                _ => Err(StoreError::NotFound("pending request")),
            }
        })?;

        info!("Friend request {} -> {} accepted", from, to);
        Ok(())
    }

    /// Receiver turns down a pending request from `from`.
    pub fn decline_request(&self, from: &UserId, to: &UserId) -> Result<(), StoreError> {
        self.delete_pending(from, to)?;
        info!("Friend request {} -> {} declined", from, to);
        Ok(())
    }

    /// Sender withdraws its own pending request to `to`.
    pub fn cancel_request(&self, from: &UserId, to: &UserId) -> Result<(), StoreError> {
        self.delete_pending(from, to)?;
        info!("Friend request {} -> {} cancelled", from, to);
        Ok(())
    }

    pub fn remove_friendship(&self, a: &UserId, b: &UserId) -> Result<(), StoreError> {
        self.database.with_transaction(|tx| match tx.load_relationship(a, b)? {
            Some(relationship) if relationship.status == RelationshipStatus::Accepted => {
                tx.delete_relationship(a, b)?;
                Ok(())
            }
            _ => Err(StoreError::NotFound("friendship")),
        })?;

        info!("Friendship {} <-> {} removed", a, b);
        Ok(())
    }

    pub fn list_friends(&self, user: &UserId) -> Result<BTreeSet<UserId>, StoreError> {
        Ok(self
            .relationships_for(user)?
            .iter()
            .filter(|r| r.status == RelationshipStatus::Accepted)
            .map(|r| r.other(user).clone())
            .collect())
    }

    pub fn list_incoming(&self, user: &UserId) -> Result<BTreeSet<UserId>, StoreError> {
        Ok(self
            .relationships_for(user)?
            .iter()
            .filter(|r| r.status == RelationshipStatus::Pending && r.requester != *user)
            .map(|r| r.requester.clone())
            .collect())
    }

    pub fn list_outgoing(&self, user: &UserId) -> Result<BTreeSet<UserId>, StoreError> {
        Ok(self
            .relationships_for(user)?
            .iter()
            .filter(|r| r.is_pending_from(user))
            .map(|r| r.addressee().clone())
            .collect())
    }

    pub fn request_counts(&self, user: &UserId) -> Result<RequestCounts, StoreError> {
        let counts = self
            .relationships_for(user)?
            .iter()
            .filter(|r| r.status == RelationshipStatus::Pending)
            .fold(RequestCounts::default(), |mut counts, r| {
                if r.requester == *user {
                    counts.outgoing += 1;
                } else {
                    counts.incoming += 1;
                }
                counts
            });
        Ok(counts)
    }

    pub fn relationship_between(
        &self,
        a: &UserId,
        b: &UserId,
    ) -> Result<Option<RelationshipRecord>, StoreError> {
        self.database
            .with_read_transaction(|tx| tx.load_relationship(a, b))
    }

    fn delete_pending(&self, from: &UserId, to: &UserId) -> Result<(), StoreError> {
        self.database.with_transaction(|tx| match tx.load_relationship(from, to)? {
            Some(relationship) if relationship.is_pending_from(from) => {
                tx.delete_relationship(from, to)?;
                Ok(())
            }
            _ => Err(StoreError::NotFound("pending request")),
        })
    }

    fn relationships_for(&self, user: &UserId) -> Result<Vec<RelationshipRecord>, StoreError> {
        let relationships = self
            .database
            .with_read_transaction(|tx| tx.load_relationships_for(user))?;
        debug!("Loaded {} relationships for {}", relationships.len(), user);
        Ok(relationships)
    }
}

fn ensure_user(tx: &mut SqliteTransaction<'_>, user_id: &UserId) -> Result<(), StoreError> {
    match tx.load_user_by_id(user_id)? {
        Some(_) => Ok(()),
        None => Err(StoreError::UnknownUser(user_id.to_string())),
    }
}
