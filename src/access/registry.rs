use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::domain::{Permission, Role};
use crate::config::AccessConfig;

static NO_PERMISSIONS: BTreeSet<Permission> = BTreeSet::new();

/// Immutable role -> permission table, loaded once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleRegistry {
    table: BTreeMap<Role, BTreeSet<Permission>>,
}

impl RoleRegistry {
    /// Built-in table used when no override file is configured.
    pub fn standard() -> Self {
        let mut table = BTreeMap::new();
        table.insert(
            Role::Admin,
            BTreeSet::from([
                Permission::ACCESS_ADMIN,
                Permission::ACCESS_AGENCY,
                Permission::ACCESS_TALENT,
                Permission::MANAGE_USERS,
                Permission::MANAGE_HIRING_REQUESTS,
                Permission::REVIEW_APPLICATIONS,
                Permission::VIEW_ANALYTICS,
            ]),
        );
        table.insert(
            Role::Team,
            BTreeSet::from([
                Permission::ACCESS_ADMIN,
                Permission::MANAGE_HIRING_REQUESTS,
                Permission::REVIEW_APPLICATIONS,
                Permission::VIEW_ANALYTICS,
            ]),
        );
        table.insert(
            Role::Agency,
            BTreeSet::from([Permission::ACCESS_AGENCY, Permission::POST_HIRING_REQUESTS]),
        );
        table.insert(
            Role::Talent,
            BTreeSet::from([Permission::ACCESS_TALENT, Permission::APPLY]),
        );

        Self { table }
    }

    pub fn from_table(table: BTreeMap<Role, BTreeSet<Permission>>) -> Self {
        Self { table }
    }

    /// Use the configured override file when present, otherwise the standard table.
    pub fn load(config: &AccessConfig) -> Result<Self, RegistryError> {
        match &config.role_table {
            Some(path) => Self::from_csv_path(path),
            None => Ok(Self::standard()),
        }
    }

    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self, RegistryError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| RegistryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file)
    }

    /// Parse `role,permission` rows. A role that appears with a blank permission is
    /// registered with an empty set.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, RegistryError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut table: BTreeMap<Role, BTreeSet<Permission>> = BTreeMap::new();
        for (index, record) in csv_reader.deserialize::<TableRow>().enumerate() {
            let row = record?;
            // header occupies line 1
            let line = index + 2;
            let role = Role::parse(&row.role).ok_or_else(|| RegistryError::UnknownRole {
                line,
                value: row.role.clone(),
            })?;

            let permissions = table.entry(role).or_default();
            if !row.permission.is_empty() {
                permissions.insert(Permission::new(row.permission));
            }
        }

        Ok(Self { table })
    }

    /// Permission set for a role; empty when the table has no entry for it.
    pub fn permissions_for(&self, role: Role) -> &BTreeSet<Permission> {
        self.table.get(&role).unwrap_or(&NO_PERMISSIONS)
    }

    /// Fail-closed lookup by stored label.
    pub fn permissions_for_label(&self, label: &str) -> &BTreeSet<Permission> {
        match Role::parse(label) {
            Some(role) => self.permissions_for(role),
            None => &NO_PERMISSIONS,
        }
    }

    pub fn grants(&self, role: Role, permission: &Permission) -> bool {
        self.permissions_for(role).contains(permission)
    }

    pub fn entries(&self) -> impl Iterator<Item = (Role, &BTreeSet<Permission>)> {
        self.table
            .iter()
            .map(|(role, permissions)| (*role, permissions))
    }
}

impl Default for RoleRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

#[derive(Debug, Deserialize)]
struct TableRow {
    role: String,
    #[serde(default)]
    permission: String,
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("failed to read role table {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid role table data: {0}")]
    Csv(#[from] csv::Error),
    #[error("role table line {line} names unknown role '{value}'")]
    UnknownRole { line: usize, value: String },
}
