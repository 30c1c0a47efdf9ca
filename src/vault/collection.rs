//! Generic record collection over a single storage key.

use crate::error::{Error, Result};
use crate::storage::KeyValueStore;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use tracing::warn;

/// A record kept in a JSON array under one storage key.
pub trait Record: Serialize + DeserializeOwned + Clone {
    /// Storage key of the collection.
    const KEY: &'static str;

    /// Human-readable kind, used in error messages.
    const KIND: &'static str;

    /// Unique id within the collection.
    fn id(&self) -> &str;

    /// Stamp a modification time. No-op for records without one.
    fn touch(&mut self, _now: DateTime<Utc>) {}
}

/// All records of one kind, in insertion order.
pub struct Collection<'a, T> {
    store: &'a dyn KeyValueStore,
    _marker: PhantomData<T>,
}

impl<'a, T: Record> Collection<'a, T> {
    /// Collection stored under `T::KEY` in `store`.
    #[must_use]
    pub fn new(store: &'a dyn KeyValueStore) -> Self {
        Self {
            store,
            _marker: PhantomData,
        }
    }

    /// All records. A corrupt array reads as empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails.
    pub fn list(&self) -> Result<Vec<T>> {
        let Some(raw) = self.store.get(T::KEY)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&raw) {
            Ok(records) => Ok(records),
            Err(e) => {
                warn!(key = T::KEY, error = %e, "collection corrupt, treating as empty");
                Ok(Vec::new())
            }
        }
    }

    /// Find one record by id or by an unambiguous id prefix. An exact id
    /// match wins over prefix matches.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for a blank or ambiguous id, `NotFound` if
    /// nothing matches, or a storage error.
    pub fn find(&self, id: &str) -> Result<T> {
        let id = id.trim();
        if id.is_empty() {
            return Err(Error::InvalidInput("id is required".to_string()));
        }

        let records = self.list()?;
        if let Some(record) = records.iter().find(|r| r.id() == id) {
            return Ok(record.clone());
        }

        let mut matches = records.into_iter().filter(|r| r.id().starts_with(id));
        match (matches.next(), matches.next()) {
            (Some(record), None) => Ok(record),
            (Some(_), _) => Err(Error::InvalidInput(format!(
                "id prefix '{id}' matches more than one {}",
                T::KIND
            ))),
            (None, _) => Err(Error::NotFound(format!("{} {id}", T::KIND))),
        }
    }

    /// Append a record.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails.
    pub fn insert(&self, record: T) -> Result<T> {
        let mut records = self.list()?;
        records.push(record.clone());
        self.write(&records)?;
        Ok(record)
    }

    /// Replace the record with the same id, stamping its modification time.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no record has that id, or a storage error.
    pub fn update(&self, mut record: T) -> Result<T> {
        let mut records = self.list()?;
        let slot = records
            .iter_mut()
            .find(|r| r.id() == record.id())
            .ok_or_else(|| Error::NotFound(format!("{} {}", T::KIND, record.id())))?;
        record.touch(Utc::now());
        *slot = record.clone();
        self.write(&records)?;
        Ok(record)
    }

    /// Delete the record with `id`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no record has `id`, or a storage error.
    pub fn remove(&self, id: &str) -> Result<()> {
        let mut records = self.list()?;
        let before = records.len();
        records.retain(|r| r.id() != id);
        if records.len() == before {
            return Err(Error::NotFound(format!("{} {id}", T::KIND)));
        }
        self.write(&records)
    }

    fn write(&self, records: &[T]) -> Result<()> {
        let json = serde_json::to_string(records)?;
        self.store.put(T::KEY, &json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{IDEAS_KEY, MemoryBackend};
    use crate::vault::models::{Idea, IdeaStatus};

    #[test]
    fn empty_collection() {
        let store = MemoryBackend::new();
        let ideas: Collection<Idea> = Collection::new(&store);
        assert!(ideas.list().unwrap().is_empty());
    }

    #[test]
    fn insert_get_and_list_in_order() {
        let store = MemoryBackend::new();
        let ideas = Collection::new(&store);
        let a = ideas.insert(Idea::new("a", "first", "", "").unwrap()).unwrap();
        let b = ideas.insert(Idea::new("b", "second", "", "").unwrap()).unwrap();

        let all: Vec<Idea> = ideas.list().unwrap();
        assert_eq!(all, vec![a.clone(), b]);
        assert_eq!(ideas.find(&a.id).unwrap(), a);
    }

    #[test]
    fn update_bumps_updated_at() {
        let store = MemoryBackend::new();
        let ideas = Collection::new(&store);
        let mut idea = ideas.insert(Idea::new("a", "b", "", "").unwrap()).unwrap();
        idea.updated_at = DateTime::from_timestamp(0, 0).unwrap();
        idea.status = IdeaStatus::Shipped;

        let updated = ideas.update(idea.clone()).unwrap();

        assert_eq!(updated.status, IdeaStatus::Shipped);
        assert!(updated.updated_at > idea.updated_at);
        assert_eq!(ideas.find(&idea.id).unwrap().status, IdeaStatus::Shipped);
    }

    fn idea_with_id(id: &str) -> Idea {
        let mut idea = Idea::new("t", "d", "", "").unwrap();
        idea.id = id.to_string();
        idea
    }

    #[test]
    fn find_accepts_unique_prefix() {
        let store = MemoryBackend::new();
        let ideas = Collection::new(&store);
        ideas.insert(idea_with_id("abc123")).unwrap();
        ideas.insert(idea_with_id("def456")).unwrap();

        assert_eq!(ideas.find("de").unwrap().id, "def456");
        assert_eq!(ideas.find(" abc123 ").unwrap().id, "abc123");
    }

    #[test]
    fn find_prefers_exact_id_over_prefix() {
        let store = MemoryBackend::new();
        let ideas = Collection::new(&store);
        ideas.insert(idea_with_id("abc")).unwrap();
        ideas.insert(idea_with_id("abcd")).unwrap();

        assert_eq!(ideas.find("abc").unwrap().id, "abc");
    }

    #[test]
    fn find_rejects_ambiguous_and_blank() {
        let store = MemoryBackend::new();
        let ideas = Collection::new(&store);
        ideas.insert(idea_with_id("abc123")).unwrap();
        ideas.insert(idea_with_id("abd456")).unwrap();

        assert!(matches!(ideas.find("ab"), Err(Error::InvalidInput(_))));
        assert!(matches!(ideas.find("  "), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn missing_ids_are_not_found() {
        let store = MemoryBackend::new();
        let ideas: Collection<Idea> = Collection::new(&store);
        assert!(matches!(ideas.find("nope"), Err(Error::NotFound(_))));
        assert!(matches!(ideas.remove("nope"), Err(Error::NotFound(_))));
        let orphan = Idea::new("a", "b", "", "").unwrap();
        assert!(matches!(ideas.update(orphan), Err(Error::NotFound(_))));
    }

    #[test]
    fn remove_deletes_only_that_record() {
        let store = MemoryBackend::new();
        let ideas = Collection::new(&store);
        let a = ideas.insert(Idea::new("a", "a", "", "").unwrap()).unwrap();
        let b = ideas.insert(Idea::new("b", "b", "", "").unwrap()).unwrap();

        ideas.remove(&a.id).unwrap();

        assert_eq!(ideas.list().unwrap(), vec![b]);
    }

    #[test]
    fn corrupt_collection_reads_as_empty() {
        let store = MemoryBackend::new();
        store.put(IDEAS_KEY, "not json").unwrap();
        let ideas: Collection<Idea> = Collection::new(&store);
        assert!(ideas.list().unwrap().is_empty());
    }
}
