//! Immutable session values and the identity collaborator that produces them.

mod directory;

pub use directory::{DirectoryIdentity, IdentityDirectory, NewIdentity};

use crate::access::Identity;
use crate::workflows::WorkflowError;

/// Snapshot of who is acting for the duration of one guard or transition call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    identity: Option<Identity>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self { identity: None }
    }

    pub fn authenticated(identity: Identity) -> Self {
        Self {
            identity: Some(identity),
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    pub(crate) fn require_identity(&self) -> Result<&Identity, WorkflowError> {
        self.identity
            .as_ref()
            .ok_or(WorkflowError::AuthenticationRequired)
    }
}

impl From<Option<Identity>> for Session {
    fn from(identity: Option<Identity>) -> Self {
        Self { identity }
    }
}

/// External authentication collaborator. The core never checks credentials itself.
pub trait IdentityProvider: Send + Sync {
    fn current_identity(&self) -> Option<Identity>;
}

/// Provider that always answers with the same identity (or none).
#[derive(Debug, Clone, Default)]
pub struct FixedIdentity(pub Option<Identity>);

impl IdentityProvider for FixedIdentity {
    fn current_identity(&self) -> Option<Identity> {
        self.0.clone()
    }
}

/// Hands out a fresh [`Session`] per call from whatever the provider reports now.
#[derive(Debug, Clone)]
pub struct SessionContext<P> {
    provider: P,
}

impl<P: IdentityProvider> SessionContext<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn session(&self) -> Session {
        Session::from(self.provider.current_identity())
    }
}
