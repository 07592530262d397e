use std::collections::VecDeque;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use skillpath_algo::{CompetencyId, Difficulty, MasteryRecord};

use super::file::write_json_atomic;
use super::{validate_user_id, StoreError, UserSlots};
use crate::engine::LearningStyle;

/// Entries kept per user by the in-memory store; oldest are dropped first.
const MAX_HISTORY_ENTRIES: usize = 1000;

// ==================== Types ====================

/// Saved learner preferences used when a path request leaves them out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnerProfile {
    pub level: Difficulty,
    pub style: Option<LearningStyle>,
    pub goals: Vec<CompetencyId>,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProgressStatus {
    Started,
    InProgress,
    Completed,
}

impl ProgressStatus {
    /// Completed at or above `high_mastery`; started on the first observation.
    pub fn classify(record: &MasteryRecord, high_mastery: f64) -> Self {
        if record.score >= high_mastery {
            ProgressStatus::Completed
        } else if record.observation_count <= 1 {
            ProgressStatus::Started
        } else {
            ProgressStatus::InProgress
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressSource {
    Quiz,
    Interaction,
}

/// One accepted observation and the mastery it produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEntry {
    pub competency_id: CompetencyId,
    pub status: ProgressStatus,
    pub source: ProgressSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quiz_id: Option<String>,
    pub signal: f64,
    pub mastery: f64,
    pub timestamp: i64,
}

/// Learner profiles and their progress history.
pub trait ProfileStore: Send + Sync {
    fn read_profile(&self, user_id: &str) -> Result<Option<LearnerProfile>, StoreError>;

    /// Replace the user's profile.
    fn write_profile(&self, user_id: &str, profile: &LearnerProfile) -> Result<(), StoreError>;

    fn append_history(&self, user_id: &str, entry: &ProgressEntry) -> Result<(), StoreError>;

    /// Newest entries first, at most `limit` of them.
    fn read_history(&self, user_id: &str, limit: usize) -> Result<Vec<ProgressEntry>, StoreError>;
}

// ==================== In-memory ====================

#[derive(Default)]
struct UserProfileData {
    profile: Option<LearnerProfile>,
    history: VecDeque<ProgressEntry>,
}

/// Process-local profile store; contents are lost on restart.
pub struct InMemoryProfileStore {
    users: UserSlots<UserProfileData>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self {
            users: UserSlots::new(),
        }
    }
}

impl Default for InMemoryProfileStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ProfileStore for InMemoryProfileStore {
    fn read_profile(&self, user_id: &str) -> Result<Option<LearnerProfile>, StoreError> {
        Ok(self
            .users
            .existing(user_id)
            .and_then(|slot| slot.lock().profile.clone()))
    }

    fn write_profile(&self, user_id: &str, profile: &LearnerProfile) -> Result<(), StoreError> {
        self.users.slot(user_id).lock().profile = Some(profile.clone());
        Ok(())
    }

    fn append_history(&self, user_id: &str, entry: &ProgressEntry) -> Result<(), StoreError> {
        let slot = self.users.slot(user_id);
        let mut data = slot.lock();
        if data.history.len() >= MAX_HISTORY_ENTRIES {
            data.history.pop_front();
        }
        data.history.push_back(entry.clone());
        Ok(())
    }

    fn read_history(&self, user_id: &str, limit: usize) -> Result<Vec<ProgressEntry>, StoreError> {
        Ok(self
            .users
            .existing(user_id)
            .map(|slot| slot.lock().history.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default())
    }
}

// ==================== File ====================

/// `<user>.json` holds the profile; `<user>.history.jsonl` is an append-only log,
/// one entry per line.
pub struct FileProfileStore {
    dir: PathBuf,
    locks: UserSlots<()>,
}

impl FileProfileStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            locks: UserSlots::new(),
        })
    }

    fn profile_path(&self, user_id: &str) -> Result<PathBuf, StoreError> {
        validate_user_id(user_id)?;
        Ok(self.dir.join(format!("{user_id}.json")))
    }

    fn history_path(&self, user_id: &str) -> Result<PathBuf, StoreError> {
        validate_user_id(user_id)?;
        Ok(self.dir.join(format!("{user_id}.history.jsonl")))
    }
}

fn read_optional(path: &Path) -> Result<Option<Vec<u8>>, StoreError> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err.into()),
    }
}

impl ProfileStore for FileProfileStore {
    fn read_profile(&self, user_id: &str) -> Result<Option<LearnerProfile>, StoreError> {
        match read_optional(&self.profile_path(user_id)?)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn write_profile(&self, user_id: &str, profile: &LearnerProfile) -> Result<(), StoreError> {
        let path = self.profile_path(user_id)?;
        self.locks
            .with_transient(user_id, |_| write_json_atomic(&path, profile))
    }

    fn append_history(&self, user_id: &str, entry: &ProgressEntry) -> Result<(), StoreError> {
        let path = self.history_path(user_id)?;
        let mut line = serde_json::to_vec(entry)?;
        line.push(b'\n');
        self.locks.with_transient(user_id, |_| {
            let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
            file.write_all(&line)?;
            Ok(())
        })
    }

    /// Lines that do not parse (a write cut short, say) are skipped.
    fn read_history(&self, user_id: &str, limit: usize) -> Result<Vec<ProgressEntry>, StoreError> {
        let Some(bytes) = read_optional(&self.history_path(user_id)?)? else {
            return Ok(Vec::new());
        };
        let text = String::from_utf8_lossy(&bytes);
        let mut entries = Vec::new();
        for (number, line) in text.lines().enumerate().filter(|(_, l)| !l.trim().is_empty()) {
            match serde_json::from_str::<ProgressEntry>(line) {
                Ok(entry) => entries.push(entry),
                Err(err) => tracing::warn!(
                    user_id = %user_id,
                    line = number + 1,
                    error = %err,
                    "skipping unreadable history entry"
                ),
            }
        }
        Ok(entries.into_iter().rev().take(limit).collect())
    }
}
