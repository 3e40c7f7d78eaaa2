/// In-memory refresh record store
///
/// For development and tests. Records are never evicted, so memory grows with
/// every login and rotation until the process restarts.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use uuid::Uuid;

use crate::auth::TokenDigest;
use crate::error::StoreError;
use crate::store::{RefreshRecord, RefreshRecordStore};

#[derive(Default)]
struct Records {
    by_id: HashMap<Uuid, RefreshRecord>,
    by_digest: HashMap<TokenDigest, Uuid>,
}

/// Process-local store, every operation runs under a single lock
///
/// Not meant for long-running deployments: nothing is ever removed. Use the
/// postgres backend there.
#[derive(Default)]
pub struct InMemoryStore {
    records: Mutex<Records>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Records>, StoreError> {
        self.records
            .lock()
            .map_err(|_| StoreError::Backend("in-memory store lock poisoned".to_string()))
    }
}

#[async_trait::async_trait]
impl RefreshRecordStore for InMemoryStore {
    async fn create(&self, record: &RefreshRecord) -> Result<Uuid, StoreError> {
        let mut records = self.lock()?;
        if records.by_digest.contains_key(&record.token_digest) {
            return Err(StoreError::Conflict);
        }

        let id = Uuid::new_v4();
        let mut stored = record.clone();
        stored.id = Some(id);
        records.by_digest.insert(stored.token_digest, id);
        records.by_id.insert(id, stored);
        Ok(id)
    }

    async fn find_by_digest(&self, digest: &TokenDigest) -> Result<RefreshRecord, StoreError> {
        let records = self.lock()?;
        records
            .by_digest
            .get(digest)
            .and_then(|id| records.by_id.get(id))
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn find_by_subject(&self, subject: &str) -> Result<Vec<RefreshRecord>, StoreError> {
        let records = self.lock()?;
        Ok(records
            .by_id
            .values()
            .filter(|r| r.subject == subject)
            .cloned()
            .collect())
    }

    async fn mark_used(&self, id: Uuid) -> Result<(), StoreError> {
        let mut records = self.lock()?;
        let record = records.by_id.get_mut(&id).ok_or(StoreError::NotFound)?;
        if record.used {
            return Err(StoreError::AlreadyUsed);
        }
        record.used = true;
        Ok(())
    }
}
