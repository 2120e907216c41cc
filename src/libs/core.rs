pub mod accounts;
pub mod credentials;
pub mod garden_store;
pub mod models;
pub mod plant_journal;
pub mod relationships;
