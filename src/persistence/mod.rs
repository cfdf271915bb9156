//! Storage boundary. The workflow core only talks to [`Store`]; atomicity of status
//! changes is the store's job through [`Store::conditional_update`].

mod memory;

pub use memory::InMemoryStore;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

static RECORD_SEQUENCE: AtomicU64 = AtomicU64::new(1);

/// Process-unique record id such as `hr-000042`.
pub fn next_record_id(prefix: &str) -> String {
    let id = RECORD_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}-{id:06}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Identity,
    Agency,
    HiringRequest,
    Application,
}

impl EntityKind {
    pub const fn label(self) -> &'static str {
        match self {
            EntityKind::Identity => "identity",
            EntityKind::Agency => "agency",
            EntityKind::HiringRequest => "hiring_request",
            EntityKind::Application => "application",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A document the store can hold, addressed by kind and id.
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    const KIND: EntityKind;

    fn record_id(&self) -> &str;
}

/// A record whose lifecycle is driven by a status field.
pub trait Tracked: Record {
    type Status: Copy + PartialEq + fmt::Debug + Send + Sync;

    fn status(&self) -> Self::Status;
}

/// Persistence collaborator consumed by the workflow core.
pub trait Store: Send + Sync {
    fn get<E: Record>(&self, id: &str) -> Result<E, StoreError>;

    fn find_where<E: Record>(&self, predicate: &dyn Fn(&E) -> bool)
        -> Result<Vec<E>, StoreError>;

    fn create<E: Record>(&self, record: E) -> Result<E, StoreError>;

    /// Replace the record only while its stored status still equals `expected`.
    fn conditional_update<E: Tracked>(
        &self,
        id: &str,
        expected: E::Status,
        updated: E,
    ) -> Result<E, StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: String },
    #[error("{kind} {id} already exists")]
    AlreadyExists { kind: EntityKind, id: String },
    #[error("{kind} {id} no longer has the expected status")]
    Conflict { kind: EntityKind, id: String },
    #[error("stored {kind} {id} could not be decoded: {source}")]
    Corrupt {
        kind: EntityKind,
        id: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
