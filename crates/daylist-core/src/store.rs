use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use chrono::{DateTime, Utc};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::day::DayKey;
use crate::task::{self, Task};

const STORE_FILE: &str = "tasks.json";

pub type DayMap = BTreeMap<DayKey, Vec<Task>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Updated,
    Unchanged,
}

/// Mapping from day to its ordered task list, backed by a single JSON
/// file that is rewritten in full after every mutation.
#[derive(Debug)]
pub struct TaskStore {
    path: PathBuf,
    days: DayMap,
}

impl TaskStore {
    #[tracing::instrument(skip(data_dir))]
    pub fn open(data_dir: &Path) -> anyhow::Result<Self> {
        fs::create_dir_all(data_dir)
            .with_context(|| format!("failed to create {}", data_dir.display()))?;

        let path = data_dir.join(STORE_FILE);
        let days = load_days(&path);

        info!(
            file = %path.display(),
            days = days.len(),
            "opened task store"
        );

        Ok(Self { path, days })
    }

    pub fn days(&self) -> &DayMap {
        &self.days
    }

    pub fn tasks_for(&self, day: DayKey) -> &[Task] {
        self.days.get(&day).map_or(&[], Vec::as_slice)
    }

    #[tracing::instrument(skip(self, raw_text, now), fields(day = %day))]
    pub fn add(&mut self, day: DayKey, raw_text: &str, now: DateTime<Utc>) -> anyhow::Result<Task> {
        let text = task::validate_text(raw_text)?;

        let id = next_id(self.tasks_for(day), now);
        let created = Task::new(id, text);
        self.days.entry(day).or_default().push(created.clone());
        self.persist()?;

        debug!(id, "task added");
        Ok(created)
    }

    /// Flips completion on the matching task. A lookup miss is a silent
    /// no-op and does not touch storage.
    #[tracing::instrument(skip(self), fields(day = %day))]
    pub fn toggle(&mut self, day: DayKey, id: i64) -> anyhow::Result<Option<bool>> {
        let Some(found) = self
            .days
            .get_mut(&day)
            .and_then(|list| list.iter_mut().find(|t| t.id == id))
        else {
            debug!("toggle on unknown task");
            return Ok(None);
        };

        found.completed = !found.completed;
        let state = found.completed;
        self.persist()?;

        debug!(completed = state, "task toggled");
        Ok(Some(state))
    }

    /// Replaces the task's text. Empty or unchanged input reverts to the
    /// original; over-length input fails without touching the task.
    #[tracing::instrument(skip(self, raw_text), fields(day = %day))]
    pub fn edit(&mut self, day: DayKey, id: i64, raw_text: &str) -> anyhow::Result<EditOutcome> {
        let trimmed = raw_text.trim();

        let Some(found) = self
            .days
            .get_mut(&day)
            .and_then(|list| list.iter_mut().find(|t| t.id == id))
        else {
            debug!("edit on unknown task");
            return Ok(EditOutcome::Unchanged);
        };

        if trimmed.is_empty() || trimmed == found.text {
            debug!("edit reverted to original text");
            return Ok(EditOutcome::Unchanged);
        }

        found.text = task::validate_text(raw_text)?;
        self.persist()?;

        debug!("task text replaced");
        Ok(EditOutcome::Updated)
    }

    /// Removes the matching task. Storage is rewritten whether or not a
    /// match existed.
    #[tracing::instrument(skip(self), fields(day = %day))]
    pub fn delete(&mut self, day: DayKey, id: i64) -> anyhow::Result<bool> {
        let removed = match self.days.get_mut(&day) {
            Some(list) => {
                let before = list.len();
                list.retain(|t| t.id != id);
                list.len() != before
            }
            None => false,
        };

        self.persist()?;

        debug!(removed, "task delete processed");
        Ok(removed)
    }

    #[tracing::instrument(skip(self))]
    fn persist(&self) -> anyhow::Result<()> {
        save_days(&self.path, &self.days)
            .with_context(|| format!("failed to save {}", self.path.display()))
    }
}

/// Allocates the next task id for a day: the creation timestamp in
/// milliseconds, bumped past the day's current maximum so ids stay unique
/// and monotonic even when the clock collides or runs backwards.
fn next_id(tasks: &[Task], now: DateTime<Utc>) -> i64 {
    let floor = tasks
        .iter()
        .map(|t| t.id)
        .max()
        .map_or(i64::MIN, |max| max.saturating_add(1));
    now.timestamp_millis().max(floor)
}

fn load_days(path: &Path) -> DayMap {
    if !path.exists() {
        debug!(file = %path.display(), "no task file yet; starting empty");
        return DayMap::new();
    }

    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) => {
            warn!(
                file = %path.display(),
                error = %err,
                "unreadable task file; starting empty"
            );
            return DayMap::new();
        }
    };

    match serde_json::from_str::<DayMap>(&raw) {
        Ok(days) => {
            debug!(days = days.len(), "loaded task mapping");
            days
        }
        Err(err) => {
            warn!(
                file = %path.display(),
                error = %err,
                "malformed task file; starting empty"
            );
            DayMap::new()
        }
    }
}

fn save_days(path: &Path, days: &DayMap) -> anyhow::Result<()> {
    debug!(file = %path.display(), days = days.len(), "saving task mapping atomically");

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut temp = NamedTempFile::new_in(dir)?;
    let serialized = serde_json::to_string(days)?;
    temp.write_all(serialized.as_bytes())?;
    temp.flush()?;

    temp.persist(path)
        .map_err(|err| anyhow!("failed to persist {}: {}", path.display(), err))?;

    Ok(())
}
