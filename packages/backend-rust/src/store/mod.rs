//! Per-user mastery and learner-profile persistence.
//!
//! Every implementation serializes read-modify-write cycles per user through a
//! dedicated lock, so two submissions for the same user cannot lose an update,
//! while different users never contend on anything but the slot-map lookup.

mod file;
mod memory;
mod profile;

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use skillpath_algo::{MasteryRecord, MasterySnapshot};

pub use file::FileMasteryStore;
pub use memory::InMemoryMasteryStore;
pub use profile::{
    FileProfileStore, InMemoryProfileStore, LearnerProfile, ProfileStore, ProgressEntry,
    ProgressSource, ProgressStatus,
};

const MAX_USER_ID_LEN: usize = 128;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("invalid user id: {0:?}")]
    InvalidUserId(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Key-value style mastery storage keyed by (user, competency).
pub trait MasteryStore: Send + Sync {
    /// All records of one user; empty for unknown users.
    fn read_mastery(&self, user_id: &str) -> Result<MasterySnapshot, StoreError>;

    /// Overwrite a single record.
    fn write_mastery(
        &self,
        user_id: &str,
        competency_id: &str,
        record: MasteryRecord,
    ) -> Result<(), StoreError>;

    /// Atomic read-modify-write of one record. `apply` receives the current record
    /// (a fresh zero record if none exists yet) and returns its successor, which is
    /// committed before the user's lock is released.
    fn update_mastery(
        &self,
        user_id: &str,
        competency_id: &str,
        apply: &mut dyn FnMut(&MasteryRecord) -> MasteryRecord,
    ) -> Result<MasteryRecord, StoreError>;

    /// Drop every record of a user. Returns whether anything was removed.
    fn reset_user(&self, user_id: &str) -> Result<bool, StoreError>;
}

/// Lazily created per-user locks.
pub(crate) struct UserSlots<T> {
    slots: RwLock<HashMap<String, Arc<Mutex<T>>>>,
}

impl<T: Default> UserSlots<T> {
    pub(crate) fn new() -> Self {
        Self {
            slots: RwLock::new(HashMap::new()),
        }
    }

    pub(crate) fn slot(&self, user_id: &str) -> Arc<Mutex<T>> {
        if let Some(slot) = self.slots.read().get(user_id) {
            return Arc::clone(slot);
        }
        let mut slots = self.slots.write();
        Arc::clone(slots.entry(user_id.to_string()).or_default())
    }

    pub(crate) fn existing(&self, user_id: &str) -> Option<Arc<Mutex<T>>> {
        self.slots.read().get(user_id).cloned()
    }

    pub(crate) fn remove(&self, user_id: &str) -> Option<Arc<Mutex<T>>> {
        self.slots.write().remove(user_id)
    }

    /// Run `f` under the user's lock, then drop the slot unless another caller
    /// still holds it. The map only contains users with an operation in flight.
    pub(crate) fn with_transient<R>(&self, user_id: &str, f: impl FnOnce(&mut T) -> R) -> R {
        let slot = self.slot(user_id);
        let result = f(&mut slot.lock());

        let mut slots = self.slots.write();
        let idle = Arc::strong_count(&slot) == 2
            && slots.get(user_id).is_some_and(|held| Arc::ptr_eq(held, &slot));
        if idle {
            slots.remove(user_id);
        }
        result
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.slots.read().len()
    }
}

/// User ids double as file names in the file-backed stores.
pub(crate) fn validate_user_id(user_id: &str) -> Result<(), StoreError> {
    let valid = !user_id.is_empty()
        && user_id.len() <= MAX_USER_ID_LEN
        && !user_id.starts_with('.')
        && user_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidUserId(user_id.to_string()))
    }
}

pub(crate) fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_user_shares_slot() {
        let slots: UserSlots<u32> = UserSlots::new();
        let a = slots.slot("alice");
        let b = slots.slot("alice");
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &slots.slot("bob")));
        assert!(slots.existing("carol").is_none());
    }

    #[test]
    fn test_transient_slot_is_released() {
        let slots: UserSlots<u32> = UserSlots::new();
        let out = slots.with_transient("alice", |n| {
            *n += 1;
            *n
        });
        assert_eq!(out, 1);
        assert_eq!(slots.len(), 0);
    }

    #[test]
    fn test_transient_slot_kept_while_shared() {
        let slots: UserSlots<u32> = UserSlots::new();
        let held = slots.slot("alice");
        slots.with_transient("alice", |n| *n += 1);
        assert_eq!(slots.len(), 1);
        assert_eq!(*held.lock(), 1);

        drop(held);
        slots.with_transient("alice", |n| *n += 1);
        assert_eq!(slots.len(), 0);
    }

    #[test]
    fn test_remove_drops_slot() {
        let slots: UserSlots<u32> = UserSlots::new();
        slots.slot("alice");
        assert!(slots.remove("alice").is_some());
        assert!(slots.remove("alice").is_none());
        assert_eq!(slots.len(), 0);
    }

    #[test]
    fn test_user_id_rules() {
        for good in ["alice", "user_01", "a.b-c"] {
            assert!(validate_user_id(good).is_ok());
        }
        let long = "x".repeat(MAX_USER_ID_LEN + 1);
        for bad in ["", "../etc", "a/b", ".hidden", "with space", long.as_str()] {
            assert!(matches!(
                validate_user_id(bad),
                Err(StoreError::InvalidUserId(_))
            ));
        }
    }
}
