pub mod entry;
pub mod schedule;
