pub mod batch;
pub mod entry;
pub mod requests;
pub mod user;
