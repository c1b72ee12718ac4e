pub mod auth;
pub mod client;
pub mod database;
pub mod storage;

pub use auth::LiveAuthService;
pub use client::BackendClient;
pub use database::LiveDatabaseService;
pub use storage::LiveStorageService;
