use std::fmt;

use crate::access::{DenyReason, Identity, Role};
use crate::persistence::EntityKind;

use super::error::{TransitionRejection, WorkflowError};

/// Who may traverse an edge: any listed role, and/or the entity's owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActorRule {
    pub roles: &'static [Role],
    pub owner: bool,
}

const STAFF_ROLES: &[Role] = &[Role::Admin, Role::Team];

impl ActorRule {
    pub const STAFF: ActorRule = ActorRule {
        roles: STAFF_ROLES,
        owner: false,
    };
    pub const OWNER: ActorRule = ActorRule {
        roles: &[],
        owner: true,
    };
    pub const OWNER_OR_STAFF: ActorRule = ActorRule {
        roles: STAFF_ROLES,
        owner: true,
    };

    pub fn admits(&self, actor: &Identity, is_owner: bool) -> Result<(), DenyReason> {
        if (self.owner && is_owner) || self.roles.contains(&actor.role) {
            return Ok(());
        }

        if self.owner {
            Err(DenyReason::NotOwner)
        } else {
            Err(DenyReason::RoleNotAccepted {
                role: actor.role,
                accepted: self.roles.to_vec(),
            })
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge<S: 'static> {
    pub from: S,
    pub to: S,
    pub actors: ActorRule,
}

/// Closed status set with a static transition table.
pub trait Lifecycle: Copy + Eq + fmt::Debug + Send + Sync + 'static {
    const ENTITY: EntityKind;

    fn initial() -> Self;

    fn edges() -> &'static [Edge<Self>];

    fn label(self) -> &'static str;

    /// A status with no outgoing edge is terminal.
    fn is_terminal(self) -> bool {
        !Self::edges().iter().any(|edge| edge.from == self)
    }

    fn successors(self) -> Vec<Self> {
        Self::edges()
            .iter()
            .filter(|edge| edge.from == self)
            .map(|edge| edge.to)
            .collect()
    }
}

/// Shared validator for every entity lifecycle.
///
/// Graph violations are `InvalidTransition`; an existing edge the actor may not take
/// is `AuthorizationDenied`.
pub fn authorize_transition<S: Lifecycle>(
    from: S,
    to: S,
    actor: &Identity,
    is_owner: bool,
) -> Result<&'static Edge<S>, WorkflowError> {
    if from.is_terminal() {
        return Err(WorkflowError::InvalidTransition {
            entity: S::ENTITY,
            rejection: TransitionRejection::TerminalState { from: from.label() },
        });
    }

    let edge = S::edges()
        .iter()
        .find(|edge| edge.from == from && edge.to == to)
        .ok_or(WorkflowError::InvalidTransition {
            entity: S::ENTITY,
            rejection: TransitionRejection::NoEdge {
                from: from.label(),
                to: to.label(),
            },
        })?;

    edge.actors
        .admits(actor, is_owner)
        .map_err(|reason| WorkflowError::AuthorizationDenied { reason })?;

    Ok(edge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::IdentityId;
    use crate::workflows::domain::{ApplicationStatus, HiringRequestStatus};

    fn actor(role: Role) -> Identity {
        Identity {
            id: IdentityId(format!("{}-1", role.label())),
            email: format!("{}@example.com", role.label()),
            role,
            display_name: role.label().to_string(),
        }
    }

    #[test]
    fn terminal_states_have_no_successors() {
        for status in [HiringRequestStatus::Fulfilled, HiringRequestStatus::Cancelled] {
            assert!(status.is_terminal());
            assert!(status.successors().is_empty());
        }
        for status in [
            ApplicationStatus::Accepted,
            ApplicationStatus::Rejected,
            ApplicationStatus::Withdrawn,
        ] {
            assert!(status.is_terminal());
        }
        assert!(!HiringRequestStatus::initial().is_terminal());
        assert!(!ApplicationStatus::initial().is_terminal());
    }

    #[test]
    fn pending_cannot_skip_to_fulfilled() {
        for role in Role::ordered() {
            match authorize_transition(
                HiringRequestStatus::Pending,
                HiringRequestStatus::Fulfilled,
                &actor(role),
                true,
            ) {
                Err(WorkflowError::InvalidTransition { rejection, .. }) => assert_eq!(
                    rejection,
                    TransitionRejection::NoEdge {
                        from: "pending",
                        to: "fulfilled"
                    }
                ),
                other => panic!("expected invalid transition for {role}, got {other:?}"),
            }
        }
    }

    #[test]
    fn leaving_a_terminal_state_is_invalid() {
        match authorize_transition(
            ApplicationStatus::Withdrawn,
            ApplicationStatus::Applied,
            &actor(Role::Admin),
            false,
        ) {
            Err(WorkflowError::InvalidTransition {
                entity,
                rejection: TransitionRejection::TerminalState { from },
            }) => {
                assert_eq!(entity, EntityKind::Application);
                assert_eq!(from, "withdrawn");
            }
            other => panic!("expected terminal state rejection, got {other:?}"),
        }
    }

    #[test]
    fn staff_edges_deny_other_roles() {
        match authorize_transition(
            HiringRequestStatus::InProgress,
            HiringRequestStatus::Fulfilled,
            &actor(Role::Agency),
            true,
        ) {
            Err(WorkflowError::AuthorizationDenied {
                reason: DenyReason::RoleNotAccepted { role, accepted },
            }) => {
                assert_eq!(role, Role::Agency);
                assert_eq!(accepted, vec![Role::Admin, Role::Team]);
            }
            other => panic!("expected role denial, got {other:?}"),
        }
    }

    #[test]
    fn owner_edges_require_ownership() {
        let rule = ActorRule::OWNER;
        assert!(rule.admits(&actor(Role::Talent), true).is_ok());
        assert_eq!(
            rule.admits(&actor(Role::Admin), false),
            Err(DenyReason::NotOwner)
        );
        assert!(ActorRule::OWNER_OR_STAFF
            .admits(&actor(Role::Team), false)
            .is_ok());
    }
}
