use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use skillpath_algo::{MasteryRecord, MasterySnapshot};

use super::{now_ms, validate_user_id, MasteryStore, StoreError, UserSlots};

/// One JSON document per user under a directory.
///
/// Nothing is cached: every operation reads the user's file, and writes go
/// through a temp file + rename while the user's lock is held, so the on-disk
/// state never interleaves two updates for the same user. Readers take no lock
/// and always see a complete file.
pub struct FileMasteryStore {
    dir: PathBuf,
    // held only while a write for the user is in flight
    locks: UserSlots<()>,
}

impl FileMasteryStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            locks: UserSlots::new(),
        })
    }

    fn user_path(&self, user_id: &str) -> Result<PathBuf, StoreError> {
        validate_user_id(user_id)?;
        Ok(self.dir.join(format!("{user_id}.json")))
    }

    fn load(path: &Path) -> Result<MasterySnapshot, StoreError> {
        match fs::read(path) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(MasterySnapshot::new()),
            Err(err) => Err(err.into()),
        }
    }

    /// Load, modify and persist the user's records under the user's lock.
    fn modify<R>(
        &self,
        user_id: &str,
        f: impl FnOnce(&mut MasterySnapshot) -> R,
    ) -> Result<R, StoreError> {
        let path = self.user_path(user_id)?;
        self.locks.with_transient(user_id, |_| {
            let mut records = Self::load(&path)?;
            let out = f(&mut records);
            write_json_atomic(&path, &records)?;
            Ok(out)
        })
    }
}

impl MasteryStore for FileMasteryStore {
    fn read_mastery(&self, user_id: &str) -> Result<MasterySnapshot, StoreError> {
        Self::load(&self.user_path(user_id)?)
    }

    fn write_mastery(
        &self,
        user_id: &str,
        competency_id: &str,
        record: MasteryRecord,
    ) -> Result<(), StoreError> {
        self.modify(user_id, |records| {
            records.insert(competency_id.to_string(), record);
        })
    }

    fn update_mastery(
        &self,
        user_id: &str,
        competency_id: &str,
        apply: &mut dyn FnMut(&MasteryRecord) -> MasteryRecord,
    ) -> Result<MasteryRecord, StoreError> {
        self.modify(user_id, |records| {
            let current = records
                .get(competency_id)
                .cloned()
                .unwrap_or_else(|| MasteryRecord::fresh(now_ms()));
            let next = apply(&current);
            records.insert(competency_id.to_string(), next.clone());
            next
        })
    }

    /// Deletes the user's file without reading it, so an unreadable file can
    /// always be cleared.
    fn reset_user(&self, user_id: &str) -> Result<bool, StoreError> {
        let path = self.user_path(user_id)?;
        self.locks.with_transient(user_id, |_| match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        })
    }
}

/// Write `value` as JSON next to `path` and rename it into place.
pub(super) fn write_json_atomic(path: &Path, value: &impl Serialize) -> Result<(), StoreError> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, serde_json::to_vec_pretty(value)?)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
