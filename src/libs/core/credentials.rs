use crate::libs::storage::database::storage_traits::StoreError;
use argon2::password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use rand_core::OsRng;
use sha2::{Digest, Sha256};
use std::fmt;

// Unsalted SHA-256 hex digests written by earlier versions of the app.
const LEGACY_DIGEST_LEN: usize = 64;

#[derive(Debug, PartialEq, Eq)]
pub enum Verification {
    Valid,
    /// Matched a legacy digest; the caller should store a fresh hash.
    ValidLegacy,
    Invalid,
}

#[derive(Clone)]
pub struct CredentialHasher {
    argon2: Argon2<'static>,
    // Hashed with the configured cost so a miss costs the same as a bad secret.
    dummy: String,
}

impl fmt::Debug for CredentialHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialHasher")
            .field("params", self.argon2.params())
            .finish()
    }
}

impl CredentialHasher {
    pub fn new(memory_kib: u32, iterations: u32) -> Result<Self, StoreError> {
        let params = Params::new(memory_kib, iterations, Params::DEFAULT_P_COST, None)
            .map_err(|e| StoreError::Credential(e.to_string()))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        let salt = SaltString::generate(&mut OsRng);
        let dummy = argon2
            .hash_password(b"garden-tracker", &salt)
            .map_err(|e| StoreError::Credential(e.to_string()))?
            .to_string();
        Ok(Self { argon2, dummy })
    }

    /// Produces a PHC string (`$argon2id$v=19$...`) with a fresh random salt.
    pub fn hash(&self, secret: &str) -> Result<String, StoreError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(secret.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| StoreError::Credential(e.to_string()))
    }

    pub fn verify(&self, secret: &str, credential: &str) -> Result<Verification, StoreError> {
        if is_legacy_digest(credential) {
            return Ok(
                if legacy_digest(secret).eq_ignore_ascii_case(credential) {
                    Verification::ValidLegacy
                } else {
                    Verification::Invalid
                },
            );
        }

        let parsed =
            PasswordHash::new(credential).map_err(|e| StoreError::Credential(e.to_string()))?;

        match self.argon2.verify_password(secret.as_bytes(), &parsed) {
            Ok(()) => Ok(Verification::Valid),
            Err(password_hash::Error::Password) => Ok(Verification::Invalid),
            Err(e) => Err(StoreError::Credential(e.to_string())),
        }
    }

    /// Burns one verification for a user that does not exist. Always `Invalid`.
    pub fn verify_missing(&self, secret: &str) -> Verification {
        if let Ok(parsed) = PasswordHash::new(&self.dummy) {
            let _ = self.argon2.verify_password(secret.as_bytes(), &parsed);
        }
        Verification::Invalid
    }
}

pub fn is_legacy_digest(credential: &str) -> bool {
    credential.len() == LEGACY_DIGEST_LEN && credential.bytes().all(|b| b.is_ascii_hexdigit())
}

pub fn legacy_digest(secret: &str) -> String {
    Sha256::digest(secret.as_bytes())
        .iter()
        .map(|byte| format!("{:02x}", byte))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap_hasher() -> CredentialHasher {
        CredentialHasher::new(8, 1).expect("valid params")
    }

    #[test]
    fn hashes_are_salted() {
        let hasher = cheap_hasher();
        let first = hasher.hash("pw1").unwrap();
        let second = hasher.hash("pw1").unwrap();

        assert_ne!(first, second);
        assert!(first.starts_with("$argon2id$"));
        assert_eq!(hasher.verify("pw1", &first).unwrap(), Verification::Valid);
        assert_eq!(hasher.verify("pw1", &second).unwrap(), Verification::Valid);
    }

    #[test]
    fn wrong_secret_is_invalid() {
        let hasher = cheap_hasher();
        let credential = hasher.hash("correct horse").unwrap();

        assert_eq!(
            hasher.verify("battery staple", &credential).unwrap(),
            Verification::Invalid
        );
    }

    #[test]
    fn legacy_digest_matches_hexdigest() {
        assert!(is_legacy_digest(&legacy_digest("pw1")));
        assert_eq!(
            legacy_digest("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn legacy_credentials_verify_and_flag_upgrade() {
        let hasher = cheap_hasher();
        let stored = legacy_digest("pw2").to_uppercase();

        assert!(is_legacy_digest(&stored));
        assert_eq!(
            hasher.verify("pw2", &stored).unwrap(),
            Verification::ValidLegacy
        );
        assert_eq!(hasher.verify("nope", &stored).unwrap(), Verification::Invalid);
    }

    #[test]
    fn corrupt_credential_is_an_error() {
        let hasher = cheap_hasher();
        assert!(matches!(
            hasher.verify("pw", "not-a-phc-string"),
            Err(StoreError::Credential(_))
        ));
    }

    #[test]
    fn missing_user_pays_the_configured_cost() {
        let hasher = cheap_hasher();
        let real = hasher.hash("pw").unwrap();
        let params = |phc: &str| phc.split('$').nth(3).map(str::to_string);

        assert_eq!(params(&hasher.dummy), params(&real));
        assert_eq!(params(&hasher.dummy).as_deref(), Some("m=8,t=1,p=1"));
        assert_eq!(hasher.verify_missing("garden-tracker"), Verification::Invalid);
        assert_eq!(hasher.verify_missing("pw"), Verification::Invalid);
    }
}
