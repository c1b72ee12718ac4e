pub mod auth;
pub mod database;
pub mod storage;

pub use auth::{MockAuthService, DEMO_EMAIL, DEMO_PASSWORD};
pub use database::MockDatabaseService;
pub use storage::MockStorageService;
