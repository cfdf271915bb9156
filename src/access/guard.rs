use std::sync::Arc;

use tracing::warn;

use super::domain::{AccessRequirement, DenyReason};
use super::evaluator::{Evaluation, PermissionEvaluator};
use crate::error::ErrorKind;
use crate::session::Session;

/// Result of guarding a page or action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Granted,
    Denied(GuardDenial),
}

impl GuardDecision {
    pub fn is_granted(&self) -> bool {
        matches!(self, GuardDecision::Granted)
    }
}

/// Denial detail handed back to callers so they can pick their own message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDenial {
    AuthenticationRequired {
        requirement: AccessRequirement,
    },
    AuthorizationDenied {
        requirement: AccessRequirement,
        reason: DenyReason,
    },
}

impl GuardDenial {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GuardDenial::AuthenticationRequired { .. } => ErrorKind::AuthenticationRequired,
            GuardDenial::AuthorizationDenied { .. } => ErrorKind::AuthorizationDenied,
        }
    }

    pub fn requirement(&self) -> &AccessRequirement {
        match self {
            GuardDenial::AuthenticationRequired { requirement }
            | GuardDenial::AuthorizationDenied { requirement, .. } => requirement,
        }
    }

    pub fn reason(&self) -> Option<&DenyReason> {
        match self {
            GuardDenial::AuthenticationRequired { .. } => None,
            GuardDenial::AuthorizationDenied { reason, .. } => Some(reason),
        }
    }
}

/// Notification fired once for every failed [`AccessGuard::guard`] call.
pub trait UnauthorizedHook: Send + Sync {
    fn on_unauthorized(&self, session: &Session, denial: &GuardDenial);
}

/// Default hook: records the denial in the service log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogUnauthorized;

impl UnauthorizedHook for LogUnauthorized {
    fn on_unauthorized(&self, session: &Session, denial: &GuardDenial) {
        let identity = session
            .identity()
            .map(|identity| identity.id.0.as_str())
            .unwrap_or("anonymous");
        warn!(
            identity,
            kind = denial.kind().label(),
            requirement = ?denial.requirement(),
            "access denied"
        );
    }
}

/// Gate for protected pages and actions. Never mutates the session it inspects.
#[derive(Clone)]
pub struct AccessGuard {
    evaluator: PermissionEvaluator,
    hook: Option<Arc<dyn UnauthorizedHook>>,
}

impl AccessGuard {
    pub fn new(evaluator: PermissionEvaluator) -> Self {
        Self {
            evaluator,
            hook: None,
        }
    }

    pub fn with_hook(mut self, hook: Arc<dyn UnauthorizedHook>) -> Self {
        self.hook = Some(hook);
        self
    }

    pub fn evaluator(&self) -> &PermissionEvaluator {
        &self.evaluator
    }

    /// Pure decision, no notification. Menu filtering relies on this form.
    pub fn decide(&self, session: &Session, requirement: &AccessRequirement) -> GuardDecision {
        let Some(identity) = session.identity() else {
            return GuardDecision::Denied(GuardDenial::AuthenticationRequired {
                requirement: requirement.clone(),
            });
        };

        match self.evaluator.evaluate(identity, requirement) {
            Evaluation::Allow => GuardDecision::Granted,
            Evaluation::Deny(reason) => GuardDecision::Denied(GuardDenial::AuthorizationDenied {
                requirement: requirement.clone(),
                reason,
            }),
        }
    }

    /// Same decision as [`decide`](Self::decide); a denial also fires the hook once.
    pub fn guard(&self, session: &Session, requirement: &AccessRequirement) -> GuardDecision {
        let decision = self.decide(session, requirement);
        if let (GuardDecision::Denied(denial), Some(hook)) = (&decision, &self.hook) {
            hook.on_unauthorized(session, denial);
        }
        decision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::domain::{Identity, IdentityId, Permission, Role};
    use crate::access::registry::RoleRegistry;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingHook {
        denials: Mutex<Vec<GuardDenial>>,
    }

    impl RecordingHook {
        fn count(&self) -> usize {
            self.denials.lock().expect("hook mutex poisoned").len()
        }
    }

    impl UnauthorizedHook for RecordingHook {
        fn on_unauthorized(&self, _session: &Session, denial: &GuardDenial) {
            self.denials
                .lock()
                .expect("hook mutex poisoned")
                .push(denial.clone());
        }
    }

    fn session(role: Role) -> Session {
        Session::authenticated(Identity {
            id: IdentityId("user-1".to_string()),
            email: "user@example.com".to_string(),
            role,
            display_name: "User".to_string(),
        })
    }

    fn guard_with_hook() -> (AccessGuard, Arc<RecordingHook>) {
        let hook = Arc::new(RecordingHook::default());
        let guard = AccessGuard::new(PermissionEvaluator::new(Arc::new(
            RoleRegistry::standard(),
        )))
        .with_hook(hook.clone());
        (guard, hook)
    }

    #[test]
    fn anonymous_session_requires_authentication() {
        let (guard, _) = guard_with_hook();
        let requirement = AccessRequirement::permission(Permission::ACCESS_AGENCY);
        match guard.guard(&Session::anonymous(), &requirement) {
            GuardDecision::Denied(denial) => {
                assert_eq!(denial.kind(), ErrorKind::AuthenticationRequired);
                assert_eq!(denial.requirement(), &requirement);
                assert!(denial.reason().is_none());
            }
            other => panic!("expected authentication denial, got {other:?}"),
        }
    }

    #[test]
    fn denial_carries_unmet_requirement() {
        let (guard, _) = guard_with_hook();
        let requirement = AccessRequirement::permission(Permission::ACCESS_AGENCY);
        match guard.guard(&session(Role::Talent), &requirement) {
            GuardDecision::Denied(GuardDenial::AuthorizationDenied {
                requirement: unmet,
                reason,
            }) => {
                assert_eq!(unmet, requirement);
                assert_eq!(
                    reason,
                    DenyReason::MissingPermission {
                        permission: Permission::ACCESS_AGENCY
                    }
                );
            }
            other => panic!("expected authorization denial, got {other:?}"),
        }
    }

    #[test]
    fn hook_fires_once_per_failed_guard() {
        let (guard, hook) = guard_with_hook();
        let requirement = AccessRequirement::roles([Role::Admin]);

        guard.guard(&session(Role::Agency), &requirement);
        assert_eq!(hook.count(), 1);
        guard.guard(&Session::anonymous(), &requirement);
        assert_eq!(hook.count(), 2);

        guard.guard(&session(Role::Admin), &requirement);
        guard.decide(&session(Role::Agency), &requirement);
        assert_eq!(hook.count(), 2, "grants and pure decisions stay silent");
    }

    #[test]
    fn repeated_guard_calls_agree() {
        let (guard, _) = guard_with_hook();
        let session = session(Role::Team);
        for requirement in [
            AccessRequirement::permission(Permission::REVIEW_APPLICATIONS),
            AccessRequirement::permission(Permission::MANAGE_USERS),
            AccessRequirement::roles([Role::Admin, Role::Team]),
        ] {
            let first = guard.guard(&session, &requirement);
            let second = guard.guard(&session, &requirement);
            assert_eq!(first, second);
        }
    }

    #[test]
    fn guard_leaves_session_untouched() {
        let (guard, _) = guard_with_hook();
        let session = session(Role::Talent);
        let before = session.clone();
        guard.guard(&session, &AccessRequirement::roles([Role::Admin]));
        assert_eq!(session, before);
    }
}
