pub mod live;
pub mod mock;
