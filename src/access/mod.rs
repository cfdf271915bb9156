//! Role/permission model and the guard that gates pages and actions.

pub mod domain;
pub mod evaluator;
pub mod guard;
pub mod menu;
pub mod registry;

pub use domain::{AccessRequirement, DenyReason, Identity, IdentityId, Permission, Role};
pub use evaluator::{Evaluation, PermissionEvaluator};
pub use guard::{AccessGuard, GuardDecision, GuardDenial, LogUnauthorized, UnauthorizedHook};
pub use menu::{Menu, MenuItem};
pub use registry::{RegistryError, RoleRegistry};
