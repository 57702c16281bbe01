use std::collections::HashMap;
use std::sync::Mutex;

use crate::entities;
use crate::ports;

/// Process-local record cache, keyed by user id.
///
/// The observed client kept a single slot per device; keying by user id lets
/// multiple accounts share a device without evicting each other.
#[derive(Debug, Default)]
pub struct InMemoryDrawRecordCache {
    entries: Mutex<HashMap<entities::UserId, entities::DrawRecord>>,
}

impl InMemoryDrawRecordCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ports::DrawRecordCache for InMemoryDrawRecordCache {
    fn load(&self, user_id: &entities::UserId) -> Option<entities::DrawRecord> {
        self.entries
            .lock()
            .ok()
            .and_then(|entries| entries.get(user_id).cloned())
    }

    fn save(&self, record: &entities::DrawRecord) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(record.user_id.clone(), record.clone());
        }
    }

    fn remove(&self, user_id: &entities::UserId) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(user_id);
        }
    }
}
