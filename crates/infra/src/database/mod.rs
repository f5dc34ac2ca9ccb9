//! Database implementations

pub mod event_repository;
pub mod manager;
pub mod pool;
pub mod settings_repository;

pub use event_repository::SqliteEventRepository;
pub use manager::DbManager;
pub use pool::{create_pool, DbConnection, DbPool};
pub use settings_repository::SqliteSettingsRepository;
