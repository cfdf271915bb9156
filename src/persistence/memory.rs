use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use serde_json::Value;

use super::{EntityKind, Record, Store, StoreError, Tracked};

type Collections = HashMap<EntityKind, BTreeMap<String, Value>>;

/// Document store keeping each record as JSON, one collection per entity kind.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    collections: Mutex<Collections>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Collections>, StoreError> {
        self.collections
            .lock()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))
    }
}

fn decode<E: Record>(id: &str, document: &Value) -> Result<E, StoreError> {
    serde_json::from_value(document.clone()).map_err(|source| StoreError::Corrupt {
        kind: E::KIND,
        id: id.to_string(),
        source,
    })
}

fn encode<E: Record>(record: &E) -> Result<Value, StoreError> {
    serde_json::to_value(record).map_err(|source| StoreError::Corrupt {
        kind: E::KIND,
        id: record.record_id().to_string(),
        source,
    })
}

impl Store for InMemoryStore {
    fn get<E: Record>(&self, id: &str) -> Result<E, StoreError> {
        let collections = self.lock()?;
        let document = collections
            .get(&E::KIND)
            .and_then(|collection| collection.get(id))
            .ok_or_else(|| StoreError::NotFound {
                kind: E::KIND,
                id: id.to_string(),
            })?;
        decode(id, document)
    }

    fn find_where<E: Record>(
        &self,
        predicate: &dyn Fn(&E) -> bool,
    ) -> Result<Vec<E>, StoreError> {
        let collections = self.lock()?;
        let Some(collection) = collections.get(&E::KIND) else {
            return Ok(Vec::new());
        };

        let mut matches = Vec::new();
        for (id, document) in collection {
            let record: E = decode(id, document)?;
            if predicate(&record) {
                matches.push(record);
            }
        }
        Ok(matches)
    }

    fn create<E: Record>(&self, record: E) -> Result<E, StoreError> {
        let document = encode(&record)?;
        let mut collections = self.lock()?;
        let collection = collections.entry(E::KIND).or_default();
        if collection.contains_key(record.record_id()) {
            return Err(StoreError::AlreadyExists {
                kind: E::KIND,
                id: record.record_id().to_string(),
            });
        }
        collection.insert(record.record_id().to_string(), document);
        Ok(record)
    }

    fn conditional_update<E: Tracked>(
        &self,
        id: &str,
        expected: E::Status,
        updated: E,
    ) -> Result<E, StoreError> {
        let document = encode(&updated)?;
        let mut collections = self.lock()?;
        let stored = collections
            .get_mut(&E::KIND)
            .and_then(|collection| collection.get_mut(id))
            .ok_or_else(|| StoreError::NotFound {
                kind: E::KIND,
                id: id.to_string(),
            })?;

        let current: E = decode(id, stored)?;
        if current.status() != expected || updated.record_id() != id {
            return Err(StoreError::Conflict {
                kind: E::KIND,
                id: id.to_string(),
            });
        }

        *stored = document;
        Ok(updated)
    }
}
