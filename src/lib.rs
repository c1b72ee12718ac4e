pub mod backend;
pub mod catalog;
pub mod config;
pub mod container;
pub mod data;
pub mod error;
pub mod models;
pub mod services;

pub use catalog::Catalog;
pub use config::{AppConfig, BackendKind};
pub use container::ServiceContainer;
pub use error::{AppError, ServiceError, ServiceResult};
