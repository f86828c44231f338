pub mod selection;
pub mod store;
