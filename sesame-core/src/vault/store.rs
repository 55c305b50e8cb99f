//! Record store over the host secure store.

use std::sync::Arc;

use crate::platform::SecureKeyValueStore;

use super::error::VaultError;
use super::types::{CredentialRecord, RecordDraft};
use super::{index, keys, VaultResult};

/// CRUD over credential records plus the identifier index.
///
/// Each mutation touches at most two keys — the record and the index — and
/// the store cannot write them atomically. `add` rolls back its record
/// write when the index write fails; the failure mode `delete` can leave
/// behind (a dangling index entry) is tolerated by [`Self::list_all`] and
/// repaired by [`Self::reconcile`].
///
/// Timestamps are passed in by the caller; this layer never reads the
/// clock.
pub struct RecordStore {
    store: Arc<dyn SecureKeyValueStore>,
}

impl RecordStore {
    /// Creates a record store over the given secure store.
    #[must_use]
    pub fn new(store: Arc<dyn SecureKeyValueStore>) -> Self {
        Self { store }
    }

    /// Reads every record referenced by the index, in index order.
    ///
    /// An index entry whose backing record is missing or undecodable is
    /// logged and skipped — the read path tolerates drift but never
    /// repairs it (see [`Self::reconcile`]).
    ///
    /// # Errors
    ///
    /// Returns an error if the index itself cannot be read or decoded, or
    /// if the backend fails a record read.
    pub fn list_all(&self) -> VaultResult<Vec<CredentialRecord>> {
        let ids = index::load(self.store.as_ref())?;
        let mut records = Vec::with_capacity(ids.len());
        for id in ids {
            let raw = self
                .store
                .get(keys::record_key(&id))
                .map_err(|e| VaultError::storage("reading record", &e))?;
            match raw {
                Some(json) => match serde_json::from_str(&json) {
                    Ok(record) => records.push(record),
                    Err(err) => {
                        log::warn!("skipping undecodable record {id}: {err}");
                    }
                },
                None => log::warn!("index references missing record {id}"),
            }
        }
        Ok(records)
    }

    /// Creates a record from `draft` and appends its id to the index.
    ///
    /// The record is written first. If the index write then fails, the
    /// just-written record is deleted again (best effort) so no orphan is
    /// left behind, and the index failure is returned.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty title or secret, and a
    /// storage error if either write fails.
    pub fn add(&self, draft: &RecordDraft, now: u64) -> VaultResult<CredentialRecord> {
        let record = CredentialRecord::create(draft.normalized()?, now);
        let mut ids = index::load(self.store.as_ref())?;

        let key = keys::record_key(&record.id);
        self.write_record(&key, &record)?;

        ids.push(record.id.clone());
        if let Err(err) = index::save(self.store.as_ref(), &ids) {
            if let Err(rollback) = self.store.delete(key) {
                log::warn!(
                    "failed to roll back orphaned record {}: {rollback}",
                    record.id
                );
            }
            return Err(err);
        }
        Ok(record)
    }

    /// Overwrites an existing record with the caller's mutable fields,
    /// stamping `updated_at = now`. The index is not touched.
    ///
    /// The stored record is re-read first: its `id` and `created_at` are
    /// authoritative, so creation metadata cannot be rewritten from the
    /// outside.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::RecordNotFound`] if no record exists under the
    /// id, a validation error for an empty title or secret, and a storage
    /// error if the read or write fails.
    pub fn update(&self, record: &CredentialRecord, now: u64) -> VaultResult<CredentialRecord> {
        let key = keys::record_key(&record.id);
        let stored = self.read_record(&key)?.ok_or_else(|| {
            VaultError::RecordNotFound {
                id: record.id.clone(),
            }
        })?;
        let updated = stored.apply(RecordDraft::from_record(record).normalized()?, now);
        self.write_record(&key, &updated)?;
        Ok(updated)
    }

    /// Deletes the record and removes its id from the index.
    ///
    /// The record key is deleted first. If the index write then fails the
    /// index keeps a dangling entry; [`Self::list_all`] skips it and
    /// [`Self::reconcile`] prunes it.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::RecordNotFound`] if no record exists under the
    /// id — deleting twice fails the second time without mutating the
    /// index — and a storage error if a write fails.
    pub fn delete(&self, id: &str) -> VaultResult<()> {
        let key = keys::record_key(id);
        if self.read_record(&key)?.is_none() {
            return Err(VaultError::RecordNotFound { id: id.to_owned() });
        }
        self.store
            .delete(key)
            .map_err(|e| VaultError::storage("deleting record", &e))?;

        let mut ids = index::load(self.store.as_ref())?;
        ids.retain(|entry| entry.as_str() != id);
        index::save(self.store.as_ref(), &ids)
    }

    /// Prunes index entries whose backing record no longer exists.
    ///
    /// This is the explicit recovery pass for the drift a crash between a
    /// record delete and the index write can cause. Returns the number of
    /// entries pruned; the index is only rewritten when something changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the index cannot be read or rewritten, or if a
    /// record probe fails.
    pub fn reconcile(&self) -> VaultResult<usize> {
        let ids = index::load(self.store.as_ref())?;
        let mut kept = Vec::with_capacity(ids.len());
        let mut pruned = 0;
        for id in ids {
            let present = self
                .store
                .get(keys::record_key(&id))
                .map_err(|e| VaultError::storage("probing record", &e))?
                .is_some();
            if present {
                kept.push(id);
            } else {
                log::warn!("pruning dangling index entry {id}");
                pruned += 1;
            }
        }
        if pruned > 0 {
            index::save(self.store.as_ref(), &kept)?;
        }
        Ok(pruned)
    }

    fn read_record(&self, key: &str) -> VaultResult<Option<CredentialRecord>> {
        let raw = self
            .store
            .get(key.to_owned())
            .map_err(|e| VaultError::storage("reading record", &e))?;
        match raw {
            Some(json) => serde_json::from_str(&json)
                .map(Some)
                .map_err(|e| VaultError::serialization("decoding record", &e)),
            None => Ok(None),
        }
    }

    fn write_record(&self, key: &str, record: &CredentialRecord) -> VaultResult<()> {
        let json = serde_json::to_string(record)
            .map_err(|e| VaultError::serialization("encoding record", &e))?;
        self.store
            .set(key.to_owned(), json)
            .map_err(|e| VaultError::storage("writing record", &e))
    }
}

#[cfg(test)]
mod tests {
    use crate::platform::memory::MemorySecureStore;

    use super::*;

    fn new_store() -> (RecordStore, Arc<MemorySecureStore>) {
        let backend = Arc::new(MemorySecureStore::new());
        let backend_dyn: Arc<dyn SecureKeyValueStore> = backend.clone();
        (RecordStore::new(backend_dyn), backend)
    }

    fn draft(title: &str) -> RecordDraft {
        RecordDraft {
            title: title.into(),
            username: None,
            secret: "hunter2".into(),
            url: None,
            notes: None,
        }
    }

    #[test]
    fn test_add_then_list() {
        let (store, _) = new_store();
        let record = store.add(&draft("Email"), 100).unwrap();

        let listed = store.list_all().unwrap();
        assert_eq!(listed, vec![record.clone()]);
        assert!(!record.id.is_empty());
        assert_eq!(record.created_at, 100);
    }

    #[test]
    fn test_add_two_records_index_order() {
        let (store, backend) = new_store();
        let email = store.add(&draft("Email"), 100).unwrap();
        let bank = store.add(&draft("Bank"), 101).unwrap();
        assert_ne!(email.id, bank.id);

        let listed = store.list_all().unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].title, "Email");
        assert_eq!(listed[1].title, "Bank");

        let ids = index::load(backend.as_ref()).unwrap();
        assert_eq!(ids, vec![email.id, bank.id]);
    }

    #[test]
    fn test_add_validation_failure_touches_nothing() {
        let (store, backend) = new_store();
        assert!(matches!(
            store.add(&draft("   "), 100),
            Err(VaultError::InvalidField { .. })
        ));
        assert!(backend.is_empty());
    }

    #[test]
    fn test_interrupted_add_rolls_back_orphan() {
        let (store, backend) = new_store();
        store.add(&draft("Email"), 100).unwrap();

        backend.poison_writes_to(keys::INDEX_KEY);
        let err = store.add(&draft("Bank"), 101).unwrap_err();
        assert!(matches!(err, VaultError::StorageFailure { .. }));
        backend.heal();

        // The rollback removed the orphan: only the first record and the
        // index remain.
        assert_eq!(store.list_all().unwrap().len(), 1);
        assert_eq!(backend.len(), 2);
    }

    #[test]
    fn test_orphan_record_is_invisible_to_list() {
        let (store, backend) = new_store();
        store.add(&draft("Email"), 100).unwrap();

        // An orphan blob not referenced by the index, as a failed rollback
        // would leave behind.
        backend.raw_set(&keys::record_key("ghost"), "{\"not\":\"a record\"}");

        let listed = store.list_all().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].title, "Email");
    }

    #[test]
    fn test_update_changes_only_target() {
        let (store, _) = new_store();
        let email = store.add(&draft("Email"), 100).unwrap();
        let bank = store.add(&draft("Bank"), 101).unwrap();

        let mut edited = email.clone();
        edited.title = "Email (work)".into();
        edited.secret = "correct horse".into();
        let updated = store.update(&edited, 200).unwrap();

        assert_eq!(updated.id, email.id);
        assert_eq!(updated.created_at, 100);
        assert_eq!(updated.updated_at, Some(200));
        assert_eq!(updated.title, "Email (work)");

        let listed = store.list_all().unwrap();
        assert_eq!(listed, vec![updated, bank]);
    }

    #[test]
    fn test_update_cannot_rewrite_creation_time() {
        let (store, _) = new_store();
        let record = store.add(&draft("Email"), 100).unwrap();

        let mut tampered = record;
        tampered.created_at = 1;
        let updated = store.update(&tampered, 200).unwrap();
        assert_eq!(updated.created_at, 100);
    }

    #[test]
    fn test_update_missing_record_fails() {
        let (store, _) = new_store();
        let ghost = CredentialRecord {
            id: "ghost".into(),
            title: "t".into(),
            username: None,
            secret: "s".into(),
            url: None,
            notes: None,
            created_at: 1,
            updated_at: None,
        };
        assert!(matches!(
            store.update(&ghost, 2),
            Err(VaultError::RecordNotFound { id }) if id == "ghost"
        ));
    }

    #[test]
    fn test_delete_removes_record_and_index_entry() {
        let (store, backend) = new_store();
        let email = store.add(&draft("Email"), 100).unwrap();
        let bank = store.add(&draft("Bank"), 101).unwrap();

        store.delete(&email.id).unwrap();

        assert!(!backend.contains(&keys::record_key(&email.id)));
        let ids = index::load(backend.as_ref()).unwrap();
        assert_eq!(ids, vec![bank.id]);
    }

    #[test]
    fn test_second_delete_fails_without_mutating_index() {
        let (store, backend) = new_store();
        let email = store.add(&draft("Email"), 100).unwrap();
        let bank = store.add(&draft("Bank"), 101).unwrap();
        store.delete(&email.id).unwrap();
        let index_before = backend.raw_get(keys::INDEX_KEY);

        assert!(matches!(
            store.delete(&email.id),
            Err(VaultError::RecordNotFound { .. })
        ));
        assert_eq!(backend.raw_get(keys::INDEX_KEY), index_before);
        assert_eq!(index::load(backend.as_ref()).unwrap(), vec![bank.id]);
    }

    #[test]
    fn test_interrupted_delete_leaves_dangling_entry() {
        let (store, backend) = new_store();
        let email = store.add(&draft("Email"), 100).unwrap();

        backend.poison_writes_to(keys::INDEX_KEY);
        assert!(store.delete(&email.id).is_err());
        backend.heal();

        // Record gone, index entry dangling; the read path skips it.
        assert!(!backend.contains(&keys::record_key(&email.id)));
        assert_eq!(index::load(backend.as_ref()).unwrap(), vec![email.id]);
        assert!(store.list_all().unwrap().is_empty());
    }

    #[test]
    fn test_reconcile_prunes_dangling_entries() {
        let (store, backend) = new_store();
        let email = store.add(&draft("Email"), 100).unwrap();
        let bank = store.add(&draft("Bank"), 101).unwrap();

        backend.poison_writes_to(keys::INDEX_KEY);
        assert!(store.delete(&email.id).is_err());
        backend.heal();

        assert_eq!(store.reconcile().unwrap(), 1);
        assert_eq!(index::load(backend.as_ref()).unwrap(), vec![bank.id]);
        // A clean index reconciles to zero without rewriting.
        assert_eq!(store.reconcile().unwrap(), 0);
    }

    #[test]
    fn test_corrupt_record_is_skipped_on_read() {
        let (store, backend) = new_store();
        let email = store.add(&draft("Email"), 100).unwrap();
        backend.raw_set(&keys::record_key(&email.id), "{corrupt");

        assert!(store.list_all().unwrap().is_empty());
        // But a targeted update refuses to silently rewrite it.
        assert!(matches!(
            store.update(&email, 200),
            Err(VaultError::Serialization { .. })
        ));
    }
}
