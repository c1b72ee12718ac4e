pub mod auth_service;
pub mod database_service;
pub mod notification_service;
pub mod search_adapter;
pub mod search_service;
pub mod storage_service;
