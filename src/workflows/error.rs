use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use super::domain::{AgencyId, ApplicationId};
use crate::access::DenyReason;
use crate::error::ErrorKind;
use crate::persistence::{EntityKind, StoreError};

/// Which lifecycle rule blocked a transition or creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum TransitionRejection {
    TerminalState { from: &'static str },
    NoEdge { from: &'static str, to: &'static str },
    RequestClosed { status: &'static str },
    DeadlineElapsed { deadline: NaiveDate },
}

impl fmt::Display for TransitionRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransitionRejection::TerminalState { from } => {
                write!(f, "{from} is a terminal status")
            }
            TransitionRejection::NoEdge { from, to } => write!(f, "no edge from {from} to {to}"),
            TransitionRejection::RequestClosed { status } => {
                write!(f, "hiring request is {status} and no longer accepts applications")
            }
            TransitionRejection::DeadlineElapsed { deadline } => {
                write!(f, "hiring request deadline {deadline} has passed")
            }
        }
    }
}

/// Terminal outcomes of guard-protected workflow operations. Nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("authentication required")]
    AuthenticationRequired,
    #[error("authorization denied: {reason}")]
    AuthorizationDenied { reason: DenyReason },
    #[error("invalid {entity} transition: {rejection}")]
    InvalidTransition {
        entity: EntityKind,
        rejection: TransitionRejection,
    },
    #[error("candidate already has open application {existing}")]
    DuplicateApplication { existing: ApplicationId },
    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: String },
    #[error("{kind} {id} was changed concurrently")]
    Conflict { kind: EntityKind, id: String },
    #[error("invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },
    #[error("identity already owns agency {agency_id}")]
    AgencyAlreadyRegistered { agency_id: AgencyId },
    #[error("an identity with email {email} already exists")]
    IdentityExists { email: String },
    #[error(transparent)]
    Persistence(StoreError),
}

impl WorkflowError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WorkflowError::AuthenticationRequired => ErrorKind::AuthenticationRequired,
            WorkflowError::AuthorizationDenied { .. } => ErrorKind::AuthorizationDenied,
            WorkflowError::InvalidTransition { .. } => ErrorKind::InvalidTransition,
            WorkflowError::DuplicateApplication { .. } => ErrorKind::DuplicateApplication,
            WorkflowError::NotFound { .. } => ErrorKind::NotFound,
            WorkflowError::Conflict { .. } => ErrorKind::Conflict,
            WorkflowError::InvalidInput { .. } => ErrorKind::InvalidInput,
            WorkflowError::AgencyAlreadyRegistered { .. }
            | WorkflowError::IdentityExists { .. } => ErrorKind::AlreadyExists,
            WorkflowError::Persistence(_) => ErrorKind::PersistenceError,
        }
    }
}

impl From<StoreError> for WorkflowError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound { kind, id } => WorkflowError::NotFound { kind, id },
            StoreError::Conflict { kind, id } => WorkflowError::Conflict { kind, id },
            other => WorkflowError::Persistence(other),
        }
    }
}
