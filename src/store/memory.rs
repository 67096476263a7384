use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use uuid::Uuid;

use super::{RefreshRecord, RefreshStore, StoreError};

/// In-process store for local runs and tests. Not durable.
#[derive(Debug, Default)]
pub struct MemoryRefreshStore {
    records: Mutex<HashMap<Uuid, RefreshRecord>>,
}

impl MemoryRefreshStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
impl MemoryRefreshStore {
    pub fn records_for(&self, subject: &str) -> Vec<RefreshRecord> {
        self.records
            .lock()
            .values()
            .filter(|r| r.subject == subject)
            .cloned()
            .collect()
    }

    pub fn contains(&self, token_id: Uuid) -> bool {
        self.records.lock().contains_key(&token_id)
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

/// Removes `token_id` only when its stored hash matches.
fn take(records: &mut HashMap<Uuid, RefreshRecord>, token_id: Uuid, token_hash: &str) -> bool {
    match records.get(&token_id) {
        Some(r) if r.token_hash == token_hash => records.remove(&token_id).is_some(),
        _ => false,
    }
}

#[async_trait]
impl RefreshStore for MemoryRefreshStore {
    async fn put(&self, record: RefreshRecord) -> Result<(), StoreError> {
        self.records.lock().insert(record.token_id, record);
        Ok(())
    }

    async fn delete_by_token_id(
        &self,
        token_id: Uuid,
        token_hash: &str,
    ) -> Result<bool, StoreError> {
        Ok(take(&mut self.records.lock(), token_id, token_hash))
    }

    async fn replace(
        &self,
        previous: Uuid,
        previous_hash: &str,
        record: RefreshRecord,
    ) -> Result<bool, StoreError> {
        let mut records = self.records.lock();
        if !take(&mut records, previous, previous_hash) {
            return Ok(false);
        }
        records.insert(record.token_id, record);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn record(subject: &str) -> RefreshRecord {
        let token_id = Uuid::new_v4();
        RefreshRecord {
            token_id,
            subject: subject.into(),
            token_hash: format!("hash-{token_id}"),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn delete_reports_whether_found() {
        let store = MemoryRefreshStore::new();
        let r = record("alice");
        let (id, hash) = (r.token_id, r.token_hash.clone());
        store.put(r).await.unwrap();

        assert!(store.delete_by_token_id(id, &hash).await.unwrap());
        assert!(!store.delete_by_token_id(id, &hash).await.unwrap());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn replace_requires_previous() {
        let store = MemoryRefreshStore::new();
        let first = record("alice");
        let (first_id, first_hash) = (first.token_id, first.token_hash.clone());
        store.put(first).await.unwrap();

        let second = record("alice");
        let second_id = second.token_id;
        assert!(store.replace(first_id, &first_hash, second).await.unwrap());
        assert!(!store.contains(first_id));
        assert!(store.contains(second_id));

        // the superseded id cannot be replaced again, and nothing is written
        let third = record("alice");
        let third_id = third.token_id;
        assert!(!store.replace(first_id, &first_hash, third).await.unwrap());
        assert!(!store.contains(third_id));
        assert_eq!(store.records_for("alice").len(), 1);
    }

    #[tokio::test]
    async fn hash_must_match_the_stored_record() {
        let store = MemoryRefreshStore::new();
        let r = record("alice");
        let id = r.token_id;
        store.put(r).await.unwrap();

        assert!(!store.delete_by_token_id(id, "other").await.unwrap());
        assert!(!store.replace(id, "other", record("alice")).await.unwrap());
        assert!(store.contains(id));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn records_are_per_subject() {
        let store = MemoryRefreshStore::new();
        store.put(record("alice")).await.unwrap();
        store.put(record("bob")).await.unwrap();
        store.put(record("bob")).await.unwrap();

        assert_eq!(store.records_for("alice").len(), 1);
        assert_eq!(store.records_for("bob").len(), 2);
        assert_eq!(store.len(), 3);
    }
}
