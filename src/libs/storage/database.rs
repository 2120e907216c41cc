pub mod database;
pub mod storage_sqllite;
pub mod storage_traits;
