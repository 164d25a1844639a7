pub mod category;
pub mod item;
pub mod store;
