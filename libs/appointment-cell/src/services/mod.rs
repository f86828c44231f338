pub mod scheduling;
pub mod store;
pub mod validation;
