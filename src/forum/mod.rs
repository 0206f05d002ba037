//! In-memory discussion forum model.
//!
//! This module implements the client-side core of a threaded discussion forum:
//! - **Permissions**: a pure role × capability table
//! - **Session**: the current actor, observable with replay-latest semantics
//! - **Threads**: per-topic comment forests with cascading soft-removal
//! - **Registry**: the ordered list of topics
//!
//! ## Hierarchy
//!
//! ```text
//! TopicRegistry
//!     └── Topic
//!             └── CommentNode (root)
//!                     └── CommentNode (reply)
//! ```
//!
//! ## Control flow
//!
//! A caller resolves the actor from the `SessionStore`, asks the
//! `PermissionTable` whether the action is allowed, then mutates a topic's
//! `ThreadTree` or the `TopicRegistry`. `ForumClient` packages that flow
//! together with a backend implementing `ForumApi`.
//!
//! The session and permission table never depend on the tree or registry.

pub mod api;
pub mod client;
pub mod constants;
pub mod memory;
pub mod permissions;
pub mod registry;
pub mod session;
pub mod thread;
pub mod types;

pub use api::{ApiClient, ApiEnvelope, ApiRequest, ForumApi, HttpMethod};
pub use client::{ActivitySummary, ForumClient, ProfileUpdate};
pub use memory::InMemoryBackend;
pub use permissions::{PermissionTable, PrivilegeRow};
pub use registry::{Topic, TopicRegistry};
pub use session::{SessionStore, Subscription};
pub use thread::{
    direct_active_child_count, total_active_count, CommentNode, ParentRef, ThreadTree,
};
pub use types::{Actor, ActorId, ActorUpdate, Capability, Role, RoleLevel, RoleRecord};
