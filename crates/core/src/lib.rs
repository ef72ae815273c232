//! # Shiftdesk Core
//!
//! Domain model and rules for scheduling work shifts in batches.
//!
//! - [`time_range`]: wall-clock ranges, parsing, durations and overlap
//! - [`conflict`]: the same-user, same-date double-booking rule
//! - [`models`]: entries, batches, contacts and request bodies
//! - [`lifecycle`]: the DRAFTED -> PUBLISHED transition
//! - [`engine`]: the operations, run against a [`store::ScheduleStore`]
//! - [`notification`]: manifests produced by transitions
//! - [`draft`]: caller-side drafting before a batch is submitted

pub mod conflict;
pub mod draft;
pub mod engine;
pub mod errors;
pub mod lifecycle;
pub mod models;
pub mod notification;
pub mod store;
pub mod time_range;

pub use engine::ScheduleEngine;
pub use errors::{ErrorKind, ScheduleError, ScheduleResult, ValidationError};
