//! Role-based permission decisions for the forum.
//!
//! This module answers two separate questions:
//! - **May this role attempt this action?** (`can_perform`), the authoritative
//!   gate consulted before every mutating call
//! - **Which privileges does this role hold?** (`privileges_of`), a declarative
//!   list keyed by role *name* and used to render permission matrices
//!
//! The permission model is:
//! - **Administrators**: bypass the table, every capability is granted
//! - **Gold Users**: read, add/delete comments, add/delete topics
//! - **Silver Users**: read, add/delete comments
//! - **Guests**: read only
//! - **Unrecognized role or no actor**: nothing
//!
//! `DeleteOthersComments` is only ever granted through the administrator
//! bypass. Nothing here fails; unknown input degrades to "denied" or "empty".

use crate::forum::types::{Capability, Role, RoleLevel};
use serde::Serialize;

/// Name returned for role levels outside the known set.
pub const UNKNOWN_ROLE_NAME: &str = "Unknown";

const ADMINISTRATOR_PRIVILEGES: &[Capability] = &[
    Capability::ReadComments,
    Capability::AddDeleteComments,
    Capability::AddDeleteTopics,
    Capability::DeleteOthersComments,
];
const GUEST_PRIVILEGES: &[Capability] = &[Capability::ReadComments];
const SILVER_PRIVILEGES: &[Capability] =
    &[Capability::ReadComments, Capability::AddDeleteComments];
const GOLD_PRIVILEGES: &[Capability] = &[
    Capability::ReadComments,
    Capability::AddDeleteComments,
    Capability::AddDeleteTopics,
];

/// One row of a rendered permission matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrivilegeRow {
    /// The capability this row describes.
    pub privilege: Capability,
    /// Human readable description.
    pub description: &'static str,
    /// Whether the role holds the privilege.
    pub granted: bool,
}

/// Stateless permission table.
pub struct PermissionTable;

impl PermissionTable {
    /// Checks whether a role may perform a capability.
    ///
    /// `None` stands for "no current actor" and denies everything, as does a
    /// level outside the known roles.
    pub fn can_perform(role: Option<RoleLevel>, capability: Capability) -> bool {
        let Some(role) = role.and_then(RoleLevel::role) else {
            return false;
        };

        match role {
            Role::Administrator => true,
            Role::Guest => capability == Capability::ReadComments,
            Role::SilverUser => matches!(
                capability,
                Capability::ReadComments | Capability::AddDeleteComments
            ),
            Role::GoldUser => matches!(
                capability,
                Capability::ReadComments
                    | Capability::AddDeleteComments
                    | Capability::AddDeleteTopics
            ),
        }
    }

    /// Checks a capability given by its wire name.
    ///
    /// Administrators are granted any name, including ones outside the
    /// capability vocabulary. For every other role an unknown name is denied.
    pub fn can_perform_named(role: Option<RoleLevel>, capability: &str) -> bool {
        match role.and_then(RoleLevel::role) {
            Some(Role::Administrator) => true,
            Some(_) => Capability::from_name(capability)
                .is_some_and(|cap| Self::can_perform(role, cap)),
            None => false,
        }
    }

    /// Returns the declared privileges of a role, looked up by role name.
    ///
    /// Unknown names yield an empty list.
    pub fn privileges_of(role_name: &str) -> &'static [Capability] {
        match Role::from_name(role_name) {
            Some(Role::Administrator) => ADMINISTRATOR_PRIVILEGES,
            Some(Role::Guest) => GUEST_PRIVILEGES,
            Some(Role::SilverUser) => SILVER_PRIVILEGES,
            Some(Role::GoldUser) => GOLD_PRIVILEGES,
            None => &[],
        }
    }

    /// Maps a role level to its canonical name, or `"Unknown"`.
    pub fn role_name_of(level: RoleLevel) -> &'static str {
        level.role().map(Role::name).unwrap_or(UNKNOWN_ROLE_NAME)
    }

    /// Builds the permission matrix for a role name.
    ///
    /// Every catalogue entry appears once; `granted` follows `privileges_of`,
    /// so an empty or unknown name grants nothing.
    pub fn privilege_matrix(role_name: &str) -> Vec<PrivilegeRow> {
        let held = Self::privileges_of(role_name);
        Capability::ALL
            .into_iter()
            .map(|privilege| PrivilegeRow {
                privilege,
                description: privilege.description(),
                granted: held.contains(&privilege),
            })
            .collect()
    }
}
