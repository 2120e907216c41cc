#![allow(dead_code)]

use garden_tracker_lib::libs::config::StoreConfig;
use garden_tracker_lib::libs::core::garden_store::GardenStore;
use garden_tracker_lib::libs::core::models::UserId;
use std::ops::Deref;
use tempfile::TempDir;

// Each test gets its own database file; the directory is removed on drop.
pub struct TestStore {
    pub store: GardenStore,
    pub dir: TempDir,
}

impl Deref for TestStore {
    type Target = GardenStore;

    fn deref(&self) -> &GardenStore {
        &self.store
    }
}

pub fn test_config(dir: &TempDir) -> StoreConfig {
    let db_path = dir.path().join("garden.db");
    StoreConfig::new(db_path.to_string_lossy().into_owned())
        .with_busy_timeout_ms(2_000)
        // minimum Argon2 cost so that hashing doesn't dominate test time
        .with_credential_cost(8, 1)
}

pub fn open_test_store() -> TestStore {
    let dir = TempDir::new().expect("Failed to create test directory");
    let store = GardenStore::open(test_config(&dir)).expect("Failed to open store");
    TestStore { store, dir }
}

pub fn register(store: &GardenStore, name: &str) -> UserId {
    store
        .register(name, &format!("{}-secret", name))
        .unwrap_or_else(|e| panic!("Failed to register {}: {}", name, e))
}
