use crate::libs::core::credentials::Verification;
use crate::libs::core::garden_store::{now, GardenStore};
use crate::libs::core::models::UserId;
use crate::libs::storage::database::storage_traits::{StoreError, UserStore};
use crate::libs::storage::records::UserRecord;
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

impl GardenStore {
    pub fn register(&self, name: &str, secret: &str) -> Result<UserId, StoreError> {
        let username = self.validate_username(name)?;
        self.validate_secret(secret)?;
        let credential = self.hasher.hash(secret)?;

        let user_id = self.database.with_transaction(|tx| {
            if tx.load_user_by_name(&username)?.is_some() {
                return Err(StoreError::DuplicateName(username.clone()));
            }
            let record = UserRecord::new(username.clone(), credential, now());
            tx.insert_user(&record)?;
            Ok(record.user_id)
        })?;

        info!("Registered user {} ({})", username, user_id);
        Ok(user_id)
    }

    /// Unknown names and wrong secrets both come back as `InvalidCredentials`,
    /// after the same amount of hashing work.
    pub fn authenticate(&self, name: &str, secret: &str) -> Result<UserId, StoreError> {
        let username = name.trim();
        let user = self
            .database
            .with_read_transaction(|tx| tx.load_user_by_name(username))?;

        let verification = match &user {
            Some(user) => self.hasher.verify(secret, &user.credential)?,
            None => self.hasher.verify_missing(secret),
        };

        match (user, verification) {
            (Some(user), Verification::Valid) => Ok(user.user_id),
            (Some(user), Verification::ValidLegacy) => {
                let upgraded = self.hasher.hash(secret)?;
                let replaced = self.replace_credential(&user, &upgraded)?;
                if replaced {
                    info!("Upgraded legacy credential for {}", user.username);
                }
                Ok(user.user_id)
            }
            _ => {
                warn!("Failed login for {:?}", username);
                Err(StoreError::InvalidCredentials)
            }
        }
    }

    pub fn change_secret(
        &self,
        user_id: &UserId,
        old_secret: &str,
        new_secret: &str,
    ) -> Result<(), StoreError> {
        self.validate_secret(new_secret)?;
        let user = self.load_user(user_id).map_err(|err| match err {
            StoreError::UnknownUser(_) => StoreError::InvalidCredentials,
            other => other,
        })?;
        if self.hasher.verify(old_secret, &user.credential)? == Verification::Invalid {
            return Err(StoreError::InvalidCredentials);
        }

        let credential = self.hasher.hash(new_secret)?;
        // a concurrent change since the check invalidates the old secret
        if !self.replace_credential(&user, &credential)? {
            return Err(StoreError::InvalidCredentials);
        }

        info!("Rotated credential for {}", user_id);
        Ok(())
    }

    /// Swaps in `credential` only if the stored one is still the one that was
    /// verified. Returns false when someone else changed it first.
    fn replace_credential(
        &self,
        verified: &UserRecord,
        credential: &str,
    ) -> Result<bool, StoreError> {
        self.database.with_transaction(|tx| {
            match tx.load_user_by_id(&verified.user_id)? {
                Some(current) if current.credential == verified.credential => {
                    tx.update_credential(&verified.user_id, credential)?;
                    Ok(true)
                }
                _ => Ok(false),
            }
        })
    }

    pub fn lookup_user(&self, name: &str) -> Result<UserId, StoreError> {
        let username = name.trim();
        self.database.with_read_transaction(|tx| {
            tx.load_user_by_name(username)?
                .map(|user| user.user_id)
                .ok_or_else(|| StoreError::UnknownUser(username.to_string()))
        })
    }

    pub fn load_user(&self, user_id: &UserId) -> Result<UserRecord, StoreError> {
        self.database.with_read_transaction(|tx| {
            tx.load_user_by_id(user_id)?
                .ok_or_else(|| StoreError::UnknownUser(user_id.to_string()))
        })
    }

    /// Loads the records for `user_ids`, sorted by username. Ids with no
    /// matching user are skipped.
    pub fn load_users(&self, user_ids: &BTreeSet<UserId>) -> Result<Vec<UserRecord>, StoreError> {
        let mut users = self.database.with_read_transaction(|tx| {
            let mut users = Vec::with_capacity(user_ids.len());
            for user_id in user_ids {
                match tx.load_user_by_id(user_id)? {
                    Some(user) => users.push(user),
                    None => debug!("Skipping unknown user {}", user_id),
                }
            }
            Ok(users)
        })?;
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    fn validate_username(&self, name: &str) -> Result<String, StoreError> {
        let username = name.trim();
        if username.is_empty() {
            return Err(StoreError::InvalidInput("Enter a username".to_string()));
        }
        if username.chars().count() < self.config.min_username_len as usize {
            return Err(StoreError::InvalidInput(format!(
                "Username must be at least {} characters",
                self.config.min_username_len
            )));
        }
        Ok(username.to_string())
    }

    fn validate_secret(&self, secret: &str) -> Result<(), StoreError> {
        let min_len = self.config.min_secret_len.max(1) as usize;
        if secret.chars().count() < min_len {
            return Err(StoreError::InvalidInput(format!(
                "Password must be at least {} characters",
                min_len
            )));
        }
        Ok(())
    }
}
