pub mod auth;
pub mod catalog;
pub mod order;
pub mod page;
pub mod prefs;
pub mod search;
pub mod social;
