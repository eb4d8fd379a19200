//! Habit collection persistence with file locking.
//!
//! The full set of habits is small, so it lives in a single JSON file
//! that is read whole and replaced atomically on every change.

use crate::{Error, Habit, Result};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use uuid::Uuid;

/// The persisted collection of habits
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct HabitBook {
    pub habits: Vec<Habit>,
}

impl HabitBook {
    /// Load the habit book from a file with shared locking
    ///
    /// Returns an empty book if the file doesn't exist.
    /// If the file is corrupted, logs a warning and returns an empty book.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("No habit file found, starting with an empty book");
            return Ok(Self::default());
        }

        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!("Unable to open habit file {:?}: {}. Using empty book.", path, e);
                return Ok(Self::default());
            }
        };

        // Acquire shared lock for reading
        if let Err(e) = file.lock_shared() {
            tracing::warn!("Unable to lock habit file {:?}: {}. Using empty book.", path, e);
            return Ok(Self::default());
        }

        let mut contents = String::new();
        let mut reader = std::io::BufReader::new(&file);
        if let Err(e) = reader.read_to_string(&mut contents) {
            let _ = file.unlock();
            tracing::warn!("Failed to read habit file {:?}: {}. Using empty book.", path, e);
            return Ok(Self::default());
        }

        file.unlock()?;

        match serde_json::from_str::<HabitBook>(&contents) {
            Ok(book) => {
                tracing::debug!("Loaded {} habits from {:?}", book.habits.len(), path);
                Ok(book)
            }
            Err(e) => {
                tracing::warn!("Failed to parse habit file {:?}: {}. Using empty book.", path, e);
                Ok(Self::default())
            }
        }
    }

    /// Save the habit book to a file with exclusive locking
    ///
    /// Atomically writes by:
    /// 1. Writing to a temp file
    /// 2. Syncing to disk
    /// 3. Renaming over the original
    pub fn save(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Create unique temp file in the same directory for atomic rename
        let temp = NamedTempFile::new_in(path.parent().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::Other, "habit path missing parent")
        })?)?;

        // Acquire exclusive lock on the temp file to serialize concurrent writers
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string(self)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        // Atomically replace old habit file
        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved {} habits to {:?}", self.habits.len(), path);
        Ok(())
    }

    /// Load the book, modify it, and save it back atomically
    pub fn update<F>(path: &Path, f: F) -> Result<Self>
    where
        F: FnOnce(&mut HabitBook) -> Result<()>,
    {
        let mut book = Self::load(path)?;
        f(&mut book)?;
        book.save(path)?;
        Ok(book)
    }

    /// Add a habit, rejecting duplicate names
    pub fn add(&mut self, habit: Habit) -> Result<()> {
        if self.find_by_name(&habit.name).is_some() {
            return Err(Error::Store(format!(
                "A habit named '{}' already exists",
                habit.name
            )));
        }
        self.habits.push(habit);
        Ok(())
    }

    /// Remove a habit by name, returning it if found
    pub fn remove_by_name(&mut self, name: &str) -> Option<Habit> {
        let idx = self.habits.iter().position(|h| h.name == name)?;
        Some(self.habits.remove(idx))
    }

    /// Find a habit by exact name
    pub fn find_by_name(&self, name: &str) -> Option<&Habit> {
        self.habits.iter().find(|h| h.name == name)
    }

    /// Find a habit by id
    pub fn find_by_id(&self, id: Uuid) -> Option<&Habit> {
        self.habits.iter().find(|h| h.id == id)
    }

    /// All habits that haven't been archived
    pub fn active(&self) -> impl Iterator<Item = &Habit> {
        self.habits.iter().filter(|h| !h.archived)
    }
}
