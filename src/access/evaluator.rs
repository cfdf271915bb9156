use std::sync::Arc;

use super::domain::{AccessRequirement, DenyReason, Identity};
use super::registry::RoleRegistry;

/// Outcome of checking one identity against one requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evaluation {
    Allow,
    Deny(DenyReason),
}

impl Evaluation {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Evaluation::Allow)
    }
}

/// Pure decision function over the role registry.
#[derive(Debug, Clone)]
pub struct PermissionEvaluator {
    registry: Arc<RoleRegistry>,
}

impl PermissionEvaluator {
    pub fn new(registry: Arc<RoleRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &RoleRegistry {
        &self.registry
    }

    /// Both the role constraint and the permission constraint must hold when supplied.
    pub fn evaluate(&self, identity: &Identity, requirement: &AccessRequirement) -> Evaluation {
        if let Some(accepted) = &requirement.roles {
            if !accepted.contains(&identity.role) {
                return Evaluation::Deny(DenyReason::RoleNotAccepted {
                    role: identity.role,
                    accepted: accepted.iter().copied().collect(),
                });
            }
        }

        if let Some(permission) = &requirement.permission {
            if !self.registry.grants(identity.role, permission) {
                return Evaluation::Deny(DenyReason::MissingPermission {
                    permission: permission.clone(),
                });
            }
        }

        Evaluation::Allow
    }
}
