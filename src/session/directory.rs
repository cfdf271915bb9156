use std::sync::Arc;

use serde::Deserialize;
use tracing::{info, warn};

use super::{IdentityProvider, Session};
use crate::access::{DenyReason, Identity, IdentityId, Role};
use crate::persistence::{next_record_id, EntityKind, Record, Store, StoreError};
use crate::workflows::WorkflowError;

impl Record for Identity {
    const KIND: EntityKind = EntityKind::Identity;

    fn record_id(&self) -> &str {
        &self.id.0
    }
}

/// Account creation payload. The role is fixed here and never changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewIdentity {
    pub email: String,
    pub role: Role,
    pub display_name: String,
}

/// Identity records kept in the persistence store.
pub struct IdentityDirectory<S> {
    store: Arc<S>,
}

impl<S: Store> IdentityDirectory<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Agencies and talent sign themselves up; admin and team accounts need an admin.
    pub fn provision(
        &self,
        session: &Session,
        request: NewIdentity,
    ) -> Result<Identity, WorkflowError> {
        if request.role.is_staff() {
            let actor = session.require_identity()?;
            if actor.role != Role::Admin {
                return Err(WorkflowError::AuthorizationDenied {
                    reason: DenyReason::RoleNotAccepted {
                        role: actor.role,
                        accepted: vec![Role::Admin],
                    },
                });
            }
        }

        self.insert(request)
    }

    /// Seed the first admin. Repeated calls return the existing admin.
    pub fn bootstrap_admin(&self, email: &str) -> Result<Identity, WorkflowError> {
        if let Some(existing) = self.find_by_email(email)? {
            if existing.role == Role::Admin {
                return Ok(existing);
            }
            return Err(WorkflowError::IdentityExists {
                email: existing.email,
            });
        }

        self.insert(NewIdentity {
            email: email.to_string(),
            role: Role::Admin,
            display_name: "Administrator".to_string(),
        })
    }

    pub fn lookup(&self, id: &str) -> Result<Option<Identity>, WorkflowError> {
        match self.store.get::<Identity>(id) {
            Ok(identity) => Ok(Some(identity)),
            Err(StoreError::NotFound { .. }) => Ok(None),
            Err(err) => Err(WorkflowError::from(err)),
        }
    }

    /// Provider resolving the caller named by an opaque identity id.
    pub fn provider(&self, identity_id: Option<String>) -> DirectoryIdentity<'_, S> {
        DirectoryIdentity {
            directory: self,
            identity_id,
        }
    }

    fn find_by_email(&self, email: &str) -> Result<Option<Identity>, WorkflowError> {
        let wanted = email.trim().to_ascii_lowercase();
        let mut matches = self
            .store
            .find_where(&|identity: &Identity| identity.email.to_ascii_lowercase() == wanted)?;
        Ok(matches.pop())
    }

    fn insert(&self, request: NewIdentity) -> Result<Identity, WorkflowError> {
        let email = request.email.trim().to_string();
        if email.is_empty() || !email.contains('@') {
            return Err(WorkflowError::InvalidInput {
                field: "email",
                reason: "must be an email address".to_string(),
            });
        }
        let display_name = request.display_name.trim().to_string();
        if display_name.is_empty() {
            return Err(WorkflowError::InvalidInput {
                field: "display_name",
                reason: "must not be blank".to_string(),
            });
        }
        if self.find_by_email(&email)?.is_some() {
            return Err(WorkflowError::IdentityExists { email });
        }

        let identity = Identity {
            id: IdentityId(next_record_id("user")),
            email,
            role: request.role,
            display_name,
        };
        let stored = self.store.create(identity)?;
        info!(identity = %stored.id, role = %stored.role, "identity provisioned");
        Ok(stored)
    }
}

/// [`IdentityProvider`] backed by the directory. Lookup failures resolve to no identity.
pub struct DirectoryIdentity<'a, S> {
    directory: &'a IdentityDirectory<S>,
    identity_id: Option<String>,
}

impl<S: Store> IdentityProvider for DirectoryIdentity<'_, S> {
    fn current_identity(&self) -> Option<Identity> {
        let id = self.identity_id.as_deref()?;
        match self.directory.lookup(id) {
            Ok(identity) => identity,
            Err(err) => {
                warn!(identity = id, error = %err, "identity lookup failed");
                None
            }
        }
    }
}
