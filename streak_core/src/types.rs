//! Core domain types for the habit tracker.
//!
//! This module defines the fundamental types used throughout the system:
//! - Recurrence cycles (unit, slots, rest/phase)
//! - Habits and their identity
//! - Completion records for the append-only log
//! - Phase descriptors for the phase-selection UI

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Cycle Types
// ============================================================================

/// Sentinel slot value for MONTH cycles meaning "last day of the month",
/// resolved dynamically against the month length.
pub const LAST_DAY_SLOT: i32 = -1;

/// Granularity of a habit's repetition
///
/// `Unknown` absorbs unrecognized unit strings from persisted records so
/// that old or foreign data still deserializes; the due-ness predicate
/// treats it as "always due" rather than failing.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CycleUnit {
    Day,
    Week,
    Month,
    #[serde(other)]
    Unknown,
}

/// A habit's recurrence configuration
///
/// Semantics of `slots` depend on `unit`:
/// - `Week`: weekday indices 0..=6, where 0 = Sunday.
/// - `Month`: zero-indexed days of month 0..=30, or [`LAST_DAY_SLOT`].
/// - `Day`: slots are ignored.
///
/// An empty `slots` list means "no restriction within the unit".
///
/// `rest` is the number of whole units skipped between active occurrences;
/// `phase` selects which residue class modulo `rest + 1` of units elapsed
/// since 1970-01-01 counts as active. When `rest == 0` every unit is
/// active and `phase` is meaningless.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CycleConfig {
    pub unit: CycleUnit,

    #[serde(default)]
    pub slots: Vec<i32>,

    #[serde(default)]
    pub rest: u32,

    #[serde(default)]
    pub phase: u32,
}

impl CycleConfig {
    /// A cycle that repeats every single unit with no slot restriction
    pub fn every(unit: CycleUnit) -> Self {
        Self {
            unit,
            slots: Vec::new(),
            rest: 0,
            phase: 0,
        }
    }

    /// Validate invariants, returning a list of human-readable violations
    ///
    /// Validation is advisory: the cycle engine itself never rejects a
    /// config, it degrades to "due" instead. Callers that create configs
    /// (habit creation) should refuse configs with violations.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        match self.unit {
            CycleUnit::Week => {
                for slot in &self.slots {
                    if !(0..=6).contains(slot) {
                        errors.push(format!(
                            "week slot {} out of range (expected 0-6, 0 = Sunday)",
                            slot
                        ));
                    }
                }
            }
            CycleUnit::Month => {
                for slot in &self.slots {
                    if !(LAST_DAY_SLOT..=30).contains(slot) {
                        errors.push(format!(
                            "month slot {} out of range (expected -1 to 30)",
                            slot
                        ));
                    }
                }
            }
            CycleUnit::Day | CycleUnit::Unknown => {}
        }

        if self.rest > 0 && self.phase > self.rest {
            errors.push(format!(
                "phase {} out of range for rest {} (expected 0-{})",
                self.phase, self.rest, self.rest
            ));
        }

        errors
    }
}

/// The first upcoming date at which a residue class becomes active
///
/// Produced by phase enumeration to populate a phase-selection control;
/// never persisted.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PhaseDescriptor {
    pub phase: u32,
    pub date: NaiveDate,
}

// ============================================================================
// Habit and Completion Types
// ============================================================================

/// A tracked habit
///
/// `cycle: None` means the habit is due every day.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Habit {
    pub id: Uuid,
    pub name: String,

    #[serde(default)]
    pub cycle: Option<CycleConfig>,

    pub created_at: DateTime<Utc>,

    #[serde(default)]
    pub archived: bool,
}

impl Habit {
    /// Create a new habit with a fresh identity
    pub fn new(name: impl Into<String>, cycle: Option<CycleConfig>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            cycle,
            created_at: Utc::now(),
            archived: false,
        }
    }
}

/// What a completion record does to the (habit, date) pair
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CompletionAction {
    Done,
    Undone,
}

/// One entry in the append-only completion log
///
/// Toggling a habit appends a record rather than rewriting history; the
/// effective state for a (habit, date) pair is the last action recorded.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CompletionRecord {
    pub habit_id: Uuid,
    pub date: NaiveDate,
    pub action: CompletionAction,
    pub recorded_at: DateTime<Utc>,
}

impl CompletionRecord {
    pub fn new(habit_id: Uuid, date: NaiveDate, action: CompletionAction) -> Self {
        Self {
            habit_id,
            date,
            action,
            recorded_at: Utc::now(),
        }
    }
}
