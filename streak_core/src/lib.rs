#![forbid(unsafe_code)]

//! Core domain model and business logic for the Streak habit tracker.
//!
//! This crate provides:
//! - Domain types (habits, cycles, completion records)
//! - The cycle engine (due-ness, next due date, phase enumeration)
//! - Calendar-date helpers
//! - Persistence (habit book, completion journal)

pub mod types;
pub mod error;
pub mod dates;
pub mod cycle;
pub mod config;
pub mod logging;
pub mod store;
pub mod journal;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use cycle::{is_due_on, next_due_date, phase_dates, phase_label};
pub use config::Config;
pub use store::HabitBook;
pub use journal::{completed_dates, CompletionSink, JsonlSink};
