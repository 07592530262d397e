use skillpath_algo::{MasteryRecord, MasterySnapshot};

use super::{now_ms, MasteryStore, StoreError, UserSlots};

/// Process-local store; contents are lost on restart.
pub struct InMemoryMasteryStore {
    users: UserSlots<MasterySnapshot>,
}

impl InMemoryMasteryStore {
    pub fn new() -> Self {
        Self {
            users: UserSlots::new(),
        }
    }
}

impl Default for InMemoryMasteryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MasteryStore for InMemoryMasteryStore {
    fn read_mastery(&self, user_id: &str) -> Result<MasterySnapshot, StoreError> {
        Ok(self
            .users
            .existing(user_id)
            .map(|slot| slot.lock().clone())
            .unwrap_or_default())
    }

    fn write_mastery(
        &self,
        user_id: &str,
        competency_id: &str,
        record: MasteryRecord,
    ) -> Result<(), StoreError> {
        let slot = self.users.slot(user_id);
        slot.lock().insert(competency_id.to_string(), record);
        Ok(())
    }

    fn update_mastery(
        &self,
        user_id: &str,
        competency_id: &str,
        apply: &mut dyn FnMut(&MasteryRecord) -> MasteryRecord,
    ) -> Result<MasteryRecord, StoreError> {
        let slot = self.users.slot(user_id);
        let mut records = slot.lock();
        let current = records
            .get(competency_id)
            .cloned()
            .unwrap_or_else(|| MasteryRecord::fresh(now_ms()));
        let next = apply(&current);
        records.insert(competency_id.to_string(), next.clone());
        Ok(next)
    }

    fn reset_user(&self, user_id: &str) -> Result<bool, StoreError> {
        let Some(slot) = self.users.remove(user_id) else {
            return Ok(false);
        };
        let mut records = slot.lock();
        let had_records = !records.is_empty();
        records.clear();
        Ok(had_records)
    }
}
