use serde::Serialize;

use super::domain::{AccessRequirement, Permission, Role};
use super::guard::AccessGuard;
use crate::session::Session;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuItem {
    pub id: &'static str,
    pub label: &'static str,
    pub path: &'static str,
    pub requirement: AccessRequirement,
}

/// Ordered navigation entries, each gated by its own requirement.
#[derive(Debug, Clone)]
pub struct Menu {
    items: Vec<MenuItem>,
}

impl Menu {
    pub fn new(items: Vec<MenuItem>) -> Self {
        Self { items }
    }

    pub fn standard() -> Self {
        Self::new(standard_menu_items())
    }

    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    /// Entries the session may reach, in declaration order.
    pub fn list_for(&self, guard: &AccessGuard, session: &Session) -> Vec<MenuItem> {
        self.items
            .iter()
            .filter(|item| guard.decide(session, &item.requirement).is_granted())
            .cloned()
            .collect()
    }
}

impl Default for Menu {
    fn default() -> Self {
        Self::standard()
    }
}

fn standard_menu_items() -> Vec<MenuItem> {
    vec![
        MenuItem {
            id: "dashboard",
            label: "Dashboard",
            path: "/dashboard",
            requirement: AccessRequirement::authenticated(),
        },
        MenuItem {
            id: "admin_console",
            label: "Admin Console",
            path: "/admin",
            requirement: AccessRequirement::roles([Role::Admin, Role::Team])
                .and_permission(Permission::ACCESS_ADMIN),
        },
        MenuItem {
            id: "user_management",
            label: "User Management",
            path: "/admin/users",
            requirement: AccessRequirement::roles([Role::Admin])
                .and_permission(Permission::MANAGE_USERS),
        },
        MenuItem {
            id: "application_review",
            label: "Application Review",
            path: "/admin/applications",
            requirement: AccessRequirement::permission(Permission::REVIEW_APPLICATIONS),
        },
        MenuItem {
            id: "analytics",
            label: "Analytics",
            path: "/admin/analytics",
            requirement: AccessRequirement::permission(Permission::VIEW_ANALYTICS),
        },
        MenuItem {
            id: "hiring_requests",
            label: "Hiring Requests",
            path: "/agency/hiring-requests",
            requirement: AccessRequirement::permission(Permission::ACCESS_AGENCY),
        },
        MenuItem {
            id: "new_hiring_request",
            label: "New Hiring Request",
            path: "/agency/hiring-requests/new",
            requirement: AccessRequirement::roles([Role::Agency])
                .and_permission(Permission::POST_HIRING_REQUESTS),
        },
        MenuItem {
            id: "open_positions",
            label: "Open Positions",
            path: "/talent/jobs",
            requirement: AccessRequirement::permission(Permission::ACCESS_TALENT),
        },
        MenuItem {
            id: "my_applications",
            label: "My Applications",
            path: "/talent/applications",
            requirement: AccessRequirement::roles([Role::Talent])
                .and_permission(Permission::APPLY),
        },
    ]
}
