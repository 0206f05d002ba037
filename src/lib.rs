//! # Agora - threaded discussion forum core
//!
//! The in-memory data model of a discussion-forum client: recursive comment
//! trees with cascading soft-deletion, an ordered topic registry, a current-actor
//! session with change notification, and the role-based permission table that
//! gates every mutating action.
//!
//! Transport is left to the application: implement [`forum::ForumApi`] on top of
//! any HTTP client, using [`forum::ApiClient`] to build requests and parse the
//! backend's responses.
//!
//! ## Features
//!
//! - **Cascading soft-delete**: removing a comment flags its whole subtree
//! - **Display counts**: removed subtrees are invisible to aggregate counts
//! - **Closed permission model**: roles and capabilities are enums, administrators
//!   bypass the table
//! - **Replay-latest session**: late observers immediately see the current actor
//!
//! ## Examples
//!
//! ```rust
//! use agora::forum::{Actor, Capability, ParentRef, PermissionTable, Role, SessionStore, Topic};
//! # fn main() -> agora::Result<()> {
//! let session = SessionStore::new();
//! let silver = Actor::new(2, "Sam", "sam@example.com", Role::SilverUser);
//! session.set_current(Some(silver.clone()));
//!
//! let role = session.current().map(|actor| actor.role);
//! assert!(PermissionTable::can_perform(role, Capability::AddDeleteComments));
//! assert!(!PermissionTable::can_perform(role, Capability::AddDeleteTopics));
//!
//! let mut topic = Topic::new("t1", "Welcome", "Say hello", silver.clone());
//! let hello = topic.comments.insert(&ParentRef::Root, "hello", silver.clone())?;
//! topic.comments.insert(&ParentRef::Comment(hello.id.clone()), "hi back", silver)?;
//! assert_eq!(topic.active_comment_count(), 2);
//!
//! topic.comments.soft_remove(&hello.id)?;
//! assert_eq!(topic.active_comment_count(), 0);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod forum;

pub use config::ClientConfig;
pub use error::{ForumError, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
