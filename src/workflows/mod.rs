//! Hiring request and application lifecycles.
//!
//! Each entity has a closed status enum and one static edge table (see [`Lifecycle`]).
//! [`WorkflowEngine`] checks every requested change against that table with a single
//! validator and persists it through a status-keyed conditional update.

mod applications;
pub mod domain;
mod engine;
mod error;
pub mod graph;
mod hiring;

#[cfg(test)]
mod tests;

pub use domain::{
    Agency, AgencyId, Application, ApplicationId, ApplicationStatus, HiringRequest,
    HiringRequestId, HiringRequestStatus, NewAgency, NewHiringRequest, SubscriptionStatus,
    SubscriptionTier, TransitionRequest, WorkflowEntity,
};
pub use engine::WorkflowEngine;
pub use error::{TransitionRejection, WorkflowError};
pub use graph::{authorize_transition, ActorRule, Edge, Lifecycle};
