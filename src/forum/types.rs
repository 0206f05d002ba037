//! Forum-specific value types.
//!
//! This module contains the shapes exchanged with the backend collaborator:
//! - `Actor`: a participant snapshot carrying a raw `RoleLevel`
//! - `Role`: the closed set of known roles
//! - `Capability`: the closed vocabulary of gated actions
//!
//! The comment tree and topic types live in the `thread` and `registry` modules.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Actor identifier as assigned by the backend.
pub type ActorId = u64;

/// Raw role level carried by an actor on the wire.
///
/// Levels `0..=3` map to a [`Role`]; any other value is an unrecognized role
/// and is denied every capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleLevel(pub u8);

impl RoleLevel {
    /// Resolves the level to a known role, if any.
    pub fn role(self) -> Option<Role> {
        Role::from_level(self.0)
    }
}

impl From<u8> for RoleLevel {
    fn from(level: u8) -> Self {
        RoleLevel(level)
    }
}

impl From<Role> for RoleLevel {
    fn from(role: Role) -> Self {
        RoleLevel(role as u8)
    }
}

impl fmt::Display for RoleLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Known roles, ordered by their wire level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Role {
    /// Bypasses the permission table entirely.
    Administrator = 0,
    /// Read-only participant.
    Guest = 1,
    /// May add and delete comments.
    SilverUser = 2,
    /// May additionally add and delete topics.
    GoldUser = 3,
}

impl Role {
    /// All known roles in level order.
    pub const ALL: [Role; 4] = [
        Role::Administrator,
        Role::Guest,
        Role::SilverUser,
        Role::GoldUser,
    ];

    /// Maps a wire level to a role.
    pub fn from_level(level: u8) -> Option<Self> {
        match level {
            0 => Some(Role::Administrator),
            1 => Some(Role::Guest),
            2 => Some(Role::SilverUser),
            3 => Some(Role::GoldUser),
            _ => None,
        }
    }

    /// Returns the wire level of this role.
    pub fn level(self) -> RoleLevel {
        RoleLevel::from(self)
    }

    /// Canonical role name, as used by the backend's role entities.
    pub fn name(self) -> &'static str {
        match self {
            Role::Administrator => "Administrators",
            Role::Guest => "Guests",
            Role::SilverUser => "Silver Users",
            Role::GoldUser => "Gold Users",
        }
    }

    /// Looks a role up by its canonical name.
    pub fn from_name(name: &str) -> Option<Self> {
        Role::ALL.into_iter().find(|role| role.name() == name)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Gated actions.
///
/// Serialized with the backend's camelCase names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Capability {
    /// Read comments.
    ReadComments,
    /// Add and delete one's comments.
    AddDeleteComments,
    /// Add and delete topics.
    AddDeleteTopics,
    /// Delete other people's comments and topics.
    DeleteOthersComments,
}

impl Capability {
    /// The full privilege catalogue, in display order.
    pub const ALL: [Capability; 4] = [
        Capability::ReadComments,
        Capability::AddDeleteComments,
        Capability::AddDeleteTopics,
        Capability::DeleteOthersComments,
    ];

    /// Wire name of the capability.
    pub fn as_str(self) -> &'static str {
        match self {
            Capability::ReadComments => "readComments",
            Capability::AddDeleteComments => "addDeleteComments",
            Capability::AddDeleteTopics => "addDeleteTopics",
            Capability::DeleteOthersComments => "deleteOthersComments",
        }
    }

    /// Parses a wire name. Unknown names yield `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        Capability::ALL.into_iter().find(|cap| cap.as_str() == name)
    }

    /// Human readable description for permission matrices.
    pub fn description(self) -> &'static str {
        match self {
            Capability::ReadComments => "Read comments",
            Capability::AddDeleteComments => "Add/delete comments",
            Capability::AddDeleteTopics => "Add/delete topics",
            Capability::DeleteOthersComments => "Deleting other people's comments/topics",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A participant snapshot as returned by the backend.
///
/// The core never mutates an actor; updates go through the collaborator and
/// come back as a fresh snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Backend identifier.
    pub id: ActorId,
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Raw role level.
    pub role: RoleLevel,
}

impl Actor {
    /// Creates a new actor snapshot.
    pub fn new(
        id: ActorId,
        name: impl Into<String>,
        email: impl Into<String>,
        role: impl Into<RoleLevel>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
            role: role.into(),
        }
    }

    /// Returns true if the actor is an administrator.
    pub fn is_admin(&self) -> bool {
        self.role.role() == Some(Role::Administrator)
    }
}

/// A role entity resolved from a role identifier. Display only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRecord {
    /// Role identifier (same value space as `RoleLevel`).
    pub id: u8,
    /// Role name, e.g. "Gold Users".
    pub name: String,
}

/// Editable actor fields sent with an update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorUpdate {
    /// New display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New email.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}
