use serde::Deserialize;

/// Settings for opening a [`GardenStore`](crate::libs::core::garden_store::GardenStore).
///
/// Every field has a default, so a host can deserialize a partial config
/// (`{"db_path": "garden.db"}`) from whatever format it already uses.
#[derive(Clone, Debug, PartialEq, Deserialize, uniffi::Record)]
#[serde(default)]
pub struct StoreConfig {
    pub db_path: String,
    pub max_connections: u32,
    pub busy_timeout_ms: u64,
    pub min_username_len: u32,
    pub min_secret_len: u32,
    /// Argon2id memory cost in KiB.
    pub credential_memory_kib: u32,
    pub credential_iterations: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: "garden.db".to_string(),
            max_connections: 4,
            busy_timeout_ms: 5_000,
            min_username_len: 1,
            min_secret_len: 1,
            credential_memory_kib: argon2::Params::DEFAULT_M_COST,
            credential_iterations: argon2::Params::DEFAULT_T_COST,
        }
    }
}

impl StoreConfig {
    pub fn new(db_path: impl Into<String>) -> Self {
        Self {
            db_path: db_path.into(),
            ..Self::default()
        }
    }

    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }

    pub fn with_busy_timeout_ms(mut self, busy_timeout_ms: u64) -> Self {
        self.busy_timeout_ms = busy_timeout_ms;
        self
    }

    pub fn with_min_username_len(mut self, min_username_len: u32) -> Self {
        self.min_username_len = min_username_len;
        self
    }

    pub fn with_min_secret_len(mut self, min_secret_len: u32) -> Self {
        self.min_secret_len = min_secret_len;
        self
    }

    pub fn with_credential_cost(mut self, memory_kib: u32, iterations: u32) -> Self {
        self.credential_memory_kib = memory_kib;
        self.credential_iterations = iterations;
        self
    }
}
