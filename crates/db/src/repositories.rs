pub mod batch;
pub mod entry;
pub mod user;
