//! The cycle engine: recurrence logic for habits.
//!
//! This module answers three questions about a habit's recurrence:
//! - is the habit due on a given calendar date? ([`is_due_on`])
//! - when is it next due from a reference date? ([`next_due_date`])
//! - what are the upcoming phase boundaries of a rest cycle?
//!   ([`phase_dates`], labeled by [`phase_label`])
//!
//! Everything is a pure function of its arguments. Units elapsed are
//! counted from the epoch 1970-01-01 (a Thursday), and all modular
//! arithmetic uses `rem_euclid` so dates before the epoch keep the same
//! periodicity as dates after it.
//!
//! The due-ness predicate fails open: a missing cycle or an unrecognized
//! unit resolves to "due". A habit silently never shown is worse than one
//! shown too often.

use crate::dates;
use crate::types::{CycleConfig, CycleUnit, PhaseDescriptor, LAST_DAY_SLOT};
use chrono::{Datelike, Duration, NaiveDate};

/// Upper bound on the forward scan in [`next_due_date`], roughly 27 years.
///
/// Guarantees termination for configurations that can never match
/// (possible only when data-model invariants are violated).
pub const MAX_SEARCH_DAYS: u32 = 10_000;

/// Whether a habit with the given cycle is due on `date`
///
/// A habit without a cycle (`None`) is due every day.
pub fn is_due_on(cycle: Option<&CycleConfig>, date: NaiveDate) -> bool {
    let Some(cycle) = cycle else {
        return true;
    };

    let period = i64::from(cycle.rest) + 1;
    let phase = i64::from(cycle.phase);

    match cycle.unit {
        CycleUnit::Day => {
            if cycle.rest == 0 {
                return true;
            }
            epoch_days(date).rem_euclid(period) == phase
        }

        CycleUnit::Week => {
            let weekday = date.weekday().num_days_from_sunday() as i32;
            if !cycle.slots.is_empty() && !cycle.slots.contains(&weekday) {
                return false;
            }
            if cycle.rest == 0 {
                return true;
            }
            epoch_weeks(date).rem_euclid(period) == phase
        }

        CycleUnit::Month => {
            if !cycle.slots.is_empty() {
                let day0 = date.day0() as i32;
                let matches = cycle.slots.contains(&day0)
                    || (cycle.slots.contains(&LAST_DAY_SLOT)
                        && dates::is_last_day_of_month(date));
                if !matches {
                    return false;
                }
            }
            if cycle.rest == 0 {
                return true;
            }
            epoch_months(date).rem_euclid(period) == phase
        }

        // Fail open for units we don't understand
        CycleUnit::Unknown => true,
    }
}

/// Find the first date on or after `from` at which the cycle is due
///
/// Scans forward one day at a time, bounded by [`MAX_SEARCH_DAYS`].
/// Returns `None` only for configurations that can never be satisfied,
/// which a valid [`CycleConfig`] cannot produce.
pub fn next_due_date(cycle: &CycleConfig, from: NaiveDate) -> Option<NaiveDate> {
    let mut date = from;
    for _ in 0..MAX_SEARCH_DAYS {
        if is_due_on(Some(cycle), date) {
            return Some(date);
        }
        date = date.succ_opt()?;
    }

    tracing::warn!(
        "No due date within {} days of {}; cycle is unsatisfiable",
        MAX_SEARCH_DAYS,
        dates::format_date(from)
    );
    None
}

/// Enumerate the upcoming start date of each residue class of a rest cycle
///
/// Returns one descriptor per phase value `0..=rest`: the earliest date on
/// or after `today` whose epoch-unit count modulo `rest + 1` equals that
/// phase. Slot filtering is deliberately ignored; this enumerates the
/// cycle's alignment, not individual due days.
///
/// The result is sorted by ascending date, not by phase index. When today
/// falls partway into the cycle a higher phase can precede phase 0, and
/// the first entry is always the earliest upcoming phase.
///
/// `rest == 0` yields an empty list: there is only one implicit phase and
/// nothing to choose between.
pub fn phase_dates(unit: CycleUnit, rest: u32, today: NaiveDate) -> Vec<PhaseDescriptor> {
    if rest == 0 {
        return Vec::new();
    }

    let period = i64::from(rest) + 1;
    // Each phase begins within period units of today; scanning one extra
    // unit's worth of days absorbs partial-unit alignment.
    let horizon = period
        .saturating_add(1)
        .saturating_mul(unit_span_days(unit));

    let mut descriptors = Vec::with_capacity(rest as usize + 1);
    for phase in 0..=rest {
        let target = i64::from(phase);
        let mut date = today;
        for _ in 0..=horizon {
            if unit_count(unit, date).rem_euclid(period) == target {
                descriptors.push(PhaseDescriptor { phase, date });
                break;
            }
            match date.succ_opt() {
                Some(next) => date = next,
                None => break,
            }
        }
    }

    descriptors.sort_by_key(|d| d.date);
    descriptors
}

/// Human-readable label for the period containing `date`, by unit
///
/// - `Month`: full month name and year, e.g. "January 2025".
/// - `Week`: the Sunday-through-Saturday range containing `date`, e.g.
///   "5 January, 2025 - 11 January, 2025".
/// - `Day` (and anything else): full weekday, month, day and year, e.g.
///   "Wednesday, January 1, 2025".
pub fn phase_label(unit: CycleUnit, date: NaiveDate) -> String {
    match unit {
        CycleUnit::Month => date.format("%B %Y").to_string(),
        CycleUnit::Week => {
            let sunday = dates::start_of_week(date);
            let saturday = sunday + Duration::days(6);
            format!("{} - {}", week_edge(sunday), week_edge(saturday))
        }
        CycleUnit::Day | CycleUnit::Unknown => {
            format!("{}, {} {}, {}", date.format("%A"), date.format("%B"), date.day(), date.year())
        }
    }
}

fn week_edge(date: NaiveDate) -> String {
    format!("{} {}, {}", date.day(), date.format("%B"), date.year())
}

// ============================================================================
// Epoch-unit counting
// ============================================================================

fn epoch() -> NaiveDate {
    // chrono's default NaiveDate is the Unix epoch, 1970-01-01
    NaiveDate::default()
}

/// Whole days elapsed since 1970-01-01 (negative before the epoch)
fn epoch_days(date: NaiveDate) -> i64 {
    (date - epoch()).num_days()
}

/// Whole weeks elapsed since 1970-01-01, floored toward negative infinity
fn epoch_weeks(date: NaiveDate) -> i64 {
    epoch_days(date).div_euclid(7)
}

/// Whole months elapsed since January 1970
fn epoch_months(date: NaiveDate) -> i64 {
    i64::from(date.year() - 1970) * 12 + i64::from(date.month0())
}

fn unit_count(unit: CycleUnit, date: NaiveDate) -> i64 {
    match unit {
        CycleUnit::Week => epoch_weeks(date),
        CycleUnit::Month => epoch_months(date),
        CycleUnit::Day | CycleUnit::Unknown => epoch_days(date),
    }
}

/// Worst-case days a single unit can span, for bounding the phase scan
fn unit_span_days(unit: CycleUnit) -> i64 {
    match unit {
        CycleUnit::Week => 7,
        CycleUnit::Month => 31,
        CycleUnit::Day | CycleUnit::Unknown => 1,
    }
}
