use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Coarse actor category. Exactly one per identity, fixed when the account is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Agency,
    Talent,
    Team,
}

impl Role {
    pub const fn ordered() -> [Self; 4] {
        [Self::Admin, Self::Team, Self::Agency, Self::Talent]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Agency => "agency",
            Self::Talent => "talent",
            Self::Team => "team",
        }
    }

    /// Parse a stored role label. Unknown labels yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => Some(Self::Admin),
            "agency" => Some(Self::Agency),
            "talent" => Some(Self::Talent),
            "team" => Some(Self::Team),
            _ => None,
        }
    }

    /// Platform operators: admins and internal team members.
    pub const fn is_staff(self) -> bool {
        matches!(self, Self::Admin | Self::Team)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Named capability granted to roles through the registry table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    pub const ACCESS_ADMIN: Permission = Permission::from_static("canAccessAdmin");
    pub const ACCESS_AGENCY: Permission = Permission::from_static("canAccessAgency");
    pub const ACCESS_TALENT: Permission = Permission::from_static("canAccessTalent");
    pub const MANAGE_USERS: Permission = Permission::from_static("canManageUsers");
    pub const MANAGE_HIRING_REQUESTS: Permission =
        Permission::from_static("canManageHiringRequests");
    pub const POST_HIRING_REQUESTS: Permission = Permission::from_static("canPostHiringRequests");
    pub const REVIEW_APPLICATIONS: Permission = Permission::from_static("canReviewApplications");
    pub const APPLY: Permission = Permission::from_static("canApply");
    pub const VIEW_ANALYTICS: Permission = Permission::from_static("canViewAnalytics");

    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Every capability the built-in table knows about.
    pub fn known() -> [Permission; 9] {
        [
            Self::ACCESS_ADMIN,
            Self::ACCESS_AGENCY,
            Self::ACCESS_TALENT,
            Self::MANAGE_USERS,
            Self::MANAGE_HIRING_REQUESTS,
            Self::POST_HIRING_REQUESTS,
            Self::REVIEW_APPLICATIONS,
            Self::APPLY,
            Self::VIEW_ANALYTICS,
        ]
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IdentityId(pub String);

impl fmt::Display for IdentityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Authenticated actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: IdentityId,
    pub email: String,
    pub role: Role,
    pub display_name: String,
}

/// Constraints a caller must satisfy. Every supplied constraint must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRequirement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<BTreeSet<Role>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission: Option<Permission>,
}

impl AccessRequirement {
    /// Any signed-in identity.
    pub fn authenticated() -> Self {
        Self::default()
    }

    pub fn roles<I>(roles: I) -> Self
    where
        I: IntoIterator<Item = Role>,
    {
        Self {
            roles: Some(roles.into_iter().collect()),
            permission: None,
        }
    }

    pub fn permission(permission: Permission) -> Self {
        Self {
            roles: None,
            permission: Some(permission),
        }
    }

    pub fn and_permission(mut self, permission: Permission) -> Self {
        self.permission = Some(permission);
        self
    }
}

/// Why an identity failed a requirement or a workflow actor rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum DenyReason {
    RoleNotAccepted { role: Role, accepted: Vec<Role> },
    MissingPermission { permission: Permission },
    NotOwner,
    InactiveSubscription,
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenyReason::RoleNotAccepted { role, accepted } => {
                let accepted = accepted
                    .iter()
                    .map(|role| role.label())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "role {role} is not one of [{accepted}]")
            }
            DenyReason::MissingPermission { permission } => {
                write!(f, "missing permission {permission}")
            }
            DenyReason::NotOwner => write!(f, "acting identity does not own the entity"),
            DenyReason::InactiveSubscription => write!(f, "agency subscription is not active"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_labels_round_trip_through_parse() {
        for role in Role::ordered() {
            assert_eq!(Role::parse(role.label()), Some(role));
        }
        assert_eq!(Role::parse(" Admin "), Some(Role::Admin));
        assert_eq!(Role::parse("recruiter"), None);
    }

    #[test]
    fn owned_and_static_permissions_compare_by_name() {
        assert_eq!(Permission::new("canApply"), Permission::APPLY);
        let json = serde_json::to_string(&Permission::ACCESS_AGENCY).expect("serializes");
        assert_eq!(json, "\"canAccessAgency\"");
    }

    #[test]
    fn requirement_serializes_only_supplied_constraints() {
        let requirement = AccessRequirement::permission(Permission::ACCESS_TALENT);
        let value = serde_json::to_value(&requirement).expect("serializes");
        assert_eq!(value, serde_json::json!({ "permission": "canAccessTalent" }));
    }
}
