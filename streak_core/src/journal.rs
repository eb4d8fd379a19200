//! Append-only completion journal.
//!
//! Completions are appended to a JSONL (JSON Lines) file with file locking
//! to ensure safe concurrent access. Toggling a habit off appends an
//! `Undone` record rather than rewriting the file; the effective state for
//! a (habit, date) pair is whatever was recorded last.

use crate::{CompletionAction, CompletionRecord, Result};
use chrono::NaiveDate;
use fs2::FileExt;
use std::collections::BTreeSet;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Completion sink trait for persisting records
pub trait CompletionSink {
    fn append(&mut self, record: &CompletionRecord) -> Result<()>;
}

/// JSONL-based completion sink with file locking
pub struct JsonlSink {
    path: PathBuf,
}

impl JsonlSink {
    /// Create a new JSONL sink for the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Ensure the parent directory exists
    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl CompletionSink for JsonlSink {
    fn append(&mut self, record: &CompletionRecord) -> Result<()> {
        self.ensure_parent_dir()?;

        // Open file for appending
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        // Acquire exclusive lock
        file.lock_exclusive()?;

        // Write record as JSON line
        let mut writer = std::io::BufWriter::new(&file);
        let line = serde_json::to_string(record)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        // Lock is automatically released when file is dropped
        file.unlock()?;

        tracing::debug!(
            "Appended {:?} for habit {} on {}",
            record.action,
            record.habit_id,
            record.date
        );
        Ok(())
    }
}

/// Read all records from a journal file
pub fn read_records(path: &Path) -> Result<Vec<CompletionRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    // Acquire shared lock for reading
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut records = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<CompletionRecord>(&line) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!("Failed to parse record at line {}: {}", line_num + 1, e);
                // Continue reading, don't fail completely
            }
        }
    }

    file.unlock()?;
    tracing::debug!("Read {} records from journal", records.len());
    Ok(records)
}

/// Replay the journal into the set of dates a habit is completed on
///
/// Records are replayed in file order; the last action for each date wins.
pub fn completed_dates(path: &Path, habit_id: Uuid) -> Result<BTreeSet<NaiveDate>> {
    let mut dates = BTreeSet::new();
    for record in read_records(path)? {
        if record.habit_id != habit_id {
            continue;
        }
        match record.action {
            CompletionAction::Done => {
                dates.insert(record.date);
            }
            CompletionAction::Undone => {
                dates.remove(&record.date);
            }
        }
    }
    Ok(dates)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        crate::dates::parse_date(s).unwrap()
    }

    #[test]
    fn test_append_and_read_single_record() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("journal.jsonl");

        let habit_id = Uuid::new_v4();
        let record = CompletionRecord::new(habit_id, d("2025-01-06"), CompletionAction::Done);

        let mut sink = JsonlSink::new(&path);
        sink.append(&record).unwrap();

        let records = read_records(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].habit_id, habit_id);
        assert_eq!(records[0].date, d("2025-01-06"));
    }

    #[test]
    fn test_read_empty_journal() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nonexistent.jsonl");

        let records = read_records(&path).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_corrupt_lines_are_skipped() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("journal.jsonl");

        let habit_id = Uuid::new_v4();
        let mut sink = JsonlSink::new(&path);
        sink.append(&CompletionRecord::new(habit_id, d("2025-01-06"), CompletionAction::Done))
            .unwrap();

        // Corrupt the middle of the file, then append another valid record
        {
            let mut file = OpenOptions::new().append(true).open(&path).unwrap();
            writeln!(file, "not json at all").unwrap();
        }
        sink.append(&CompletionRecord::new(habit_id, d("2025-01-07"), CompletionAction::Done))
            .unwrap();

        let records = read_records(&path).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_last_action_wins() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("journal.jsonl");

        let habit_id = Uuid::new_v4();
        let mut sink = JsonlSink::new(&path);
        sink.append(&CompletionRecord::new(habit_id, d("2025-01-06"), CompletionAction::Done))
            .unwrap();
        sink.append(&CompletionRecord::new(habit_id, d("2025-01-07"), CompletionAction::Done))
            .unwrap();
        sink.append(&CompletionRecord::new(habit_id, d("2025-01-06"), CompletionAction::Undone))
            .unwrap();

        let dates = completed_dates(&path, habit_id).unwrap();
        assert_eq!(dates.len(), 1);
        assert!(dates.contains(&d("2025-01-07")));
    }

    #[test]
    fn test_completed_dates_filters_by_habit() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("journal.jsonl");

        let mine = Uuid::new_v4();
        let other = Uuid::new_v4();
        let mut sink = JsonlSink::new(&path);
        sink.append(&CompletionRecord::new(mine, d("2025-01-06"), CompletionAction::Done))
            .unwrap();
        sink.append(&CompletionRecord::new(other, d("2025-01-06"), CompletionAction::Done))
            .unwrap();

        let dates = completed_dates(&path, mine).unwrap();
        assert_eq!(dates.len(), 1);
    }
}
