//! Forum client tying the session, permissions and local model together.
//!
//! Every mutating action follows the same path:
//! 1. Resolve the current actor from the [`SessionStore`]
//! 2. Ask the [`PermissionTable`] whether the actor may attempt the action
//! 3. Check the local target exists
//! 4. Call the backend through [`ForumApi`]
//! 5. Apply the backend's answer to the [`TopicRegistry`]
//!
//! Local state changes only after the backend succeeded, so a failure at any
//! step leaves the registry untouched. The permission check is advisory; the
//! backend remains the authority.
//!
//! ## Usage
//!
//! ```ignore
//! let session = SessionStore::new();
//! let mut client = ForumClient::new(my_backend, session.clone());
//!
//! client.refresh_topics()?;
//! client.select_actor(3)?;
//! let topic = client.create_topic("Release notes", "What changed in 2.0")?;
//! client.add_comment(&topic.id, &ParentRef::Root, "Nice!")?;
//! ```

use crate::error::{ForumError, Result};
use crate::forum::api::ForumApi;
use crate::forum::permissions::PermissionTable;
use crate::forum::registry::{Topic, TopicRegistry};
use crate::forum::session::SessionStore;
use crate::forum::thread::{CommentNode, ParentRef};
use crate::forum::types::{Actor, ActorId, ActorUpdate, Capability, RoleRecord};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Per-actor activity totals shown on a profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ActivitySummary {
    /// Topics started by the actor.
    pub topics: usize,
    /// Comments written by the actor, removed ones included.
    pub comments: usize,
}

/// Profile edit request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    /// New display name.
    pub name: Option<String>,
    /// New email.
    pub email: Option<String>,
    /// New password.
    pub password: Option<String>,
    /// Password confirmation.
    pub password_confirmation: Option<String>,
}

/// Client for a forum backend.
pub struct ForumClient<A: ForumApi> {
    /// Backend collaborator.
    api: A,
    /// Shared current-actor handle.
    session: SessionStore,
    /// Local topic model.
    registry: TopicRegistry,
}

impl<A: ForumApi> ForumClient<A> {
    /// Creates a new client with an empty local model.
    pub fn new(api: A, session: SessionStore) -> Self {
        Self {
            api,
            session,
            registry: TopicRegistry::new(),
        }
    }

    /// Returns the backend collaborator.
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Returns a mutable reference to the backend collaborator.
    pub fn api_mut(&mut self) -> &mut A {
        &mut self.api
    }

    /// Returns the session handle.
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Returns the local topic model.
    pub fn registry(&self) -> &TopicRegistry {
        &self.registry
    }

    /// Returns true if the current actor may perform `capability`.
    pub fn can(&self, capability: Capability) -> bool {
        self.session.has_permission(capability)
    }

    /// Resolves the current actor and checks it holds `capability`.
    fn authorize(&self, capability: Capability) -> Result<Actor> {
        let actor = self
            .session
            .current()
            .ok_or_else(|| ForumError::not_authenticated("No actor is selected"))?;

        if !PermissionTable::can_perform(Some(actor.role), capability) {
            warn!(actor = actor.id, %capability, "permission denied");
            return Err(ForumError::permission_denied(format!(
                "{} ({}) may not {}",
                actor.name,
                PermissionTable::role_name_of(actor.role),
                capability.description().to_lowercase()
            )));
        }
        Ok(actor)
    }

    fn require_topic(&self, topic_id: &str) -> Result<&Topic> {
        self.registry
            .find_by_id(topic_id)
            .ok_or_else(|| ForumError::not_found(format!("Topic {} not found", topic_id)))
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Fetches an actor and makes it the current one.
    pub fn select_actor(&mut self, id: ActorId) -> Result<Actor> {
        let actor = self.api.fetch_actor(id)?;
        info!(actor = actor.id, role = %actor.role, "selected actor");
        self.session.set_current(Some(actor.clone()));
        Ok(actor)
    }

    /// Clears the current actor.
    pub fn sign_out(&mut self) {
        self.session.clear();
    }

    /// Fetches every known actor.
    pub fn list_actors(&mut self) -> Result<Vec<Actor>> {
        self.api.fetch_actors()
    }

    /// Fetches the role entity for an actor, for display.
    pub fn role_of(&mut self, actor: &Actor) -> Result<RoleRecord> {
        self.api.fetch_role(actor.role.0)
    }

    // =========================================================================
    // Topics
    // =========================================================================

    /// Reloads every topic from the backend.
    pub fn refresh_topics(&mut self) -> Result<usize> {
        let topics = self.api.fetch_topics()?;
        self.registry.replace_all(topics)?;
        Ok(self.registry.len())
    }

    /// Creates a topic authored by the current actor.
    pub fn create_topic(&mut self, title: &str, body: &str) -> Result<Topic> {
        let actor = self.authorize(Capability::AddDeleteTopics)?;
        let topic = self.api.create_topic(title, body, &actor)?;
        self.registry.add(topic.clone())?;
        info!(topic = %topic.id, actor = actor.id, "created topic");
        Ok(topic)
    }

    /// Deletes a topic.
    pub fn delete_topic(&mut self, topic_id: &str) -> Result<Topic> {
        let actor = self.authorize(Capability::AddDeleteTopics)?;
        self.require_topic(topic_id)?;
        self.api.delete_topic(topic_id)?;
        let removed = self.registry.remove_by_id(topic_id)?;
        info!(topic = %topic_id, actor = actor.id, "deleted topic");
        Ok(removed)
    }

    // =========================================================================
    // Comments
    // =========================================================================

    /// Adds a comment at the topic root or as a reply to another comment.
    pub fn add_comment(
        &mut self,
        topic_id: &str,
        parent: &ParentRef,
        body: &str,
    ) -> Result<CommentNode> {
        let actor = self.authorize(Capability::AddDeleteComments)?;
        if !self.require_topic(topic_id)?.comments.has_parent(parent) {
            return Err(ForumError::not_found(format!(
                "Parent {} not found in topic {}",
                parent, topic_id
            )));
        }

        let comment = self.api.create_comment(topic_id, parent, body, &actor)?;
        self.registry
            .attach_comment(topic_id, parent, comment.clone())?;
        debug!(topic = %topic_id, comment = %comment.id, "added comment");
        Ok(comment)
    }

    /// Soft-deletes a comment and its replies.
    pub fn delete_comment(&mut self, topic_id: &str, comment_id: &str) -> Result<()> {
        self.authorize(Capability::AddDeleteComments)?;
        if !self.require_topic(topic_id)?.comments.contains(comment_id) {
            return Err(ForumError::not_found(format!(
                "Comment {} not found in topic {}",
                comment_id, topic_id
            )));
        }

        self.api.delete_comment(topic_id, comment_id)?;
        self.registry.soft_remove_comment(topic_id, comment_id)?;
        debug!(topic = %topic_id, comment = %comment_id, "deleted comment");
        Ok(())
    }

    // =========================================================================
    // Profile
    // =========================================================================

    /// Counts an actor's topics and comments in the local model.
    pub fn activity_summary(&self, actor_id: ActorId) -> ActivitySummary {
        ActivitySummary {
            topics: self.registry.count_topics_authored_by(actor_id),
            comments: self.registry.count_comments_authored_by(actor_id),
        }
    }

    /// Updates an actor's profile.
    ///
    /// Name and email are sent first; the password is only sent when both
    /// password fields are present. If the edited actor is the current one the
    /// session is refreshed with the backend's new snapshot as soon as the
    /// fields are saved.
    ///
    /// # Errors
    /// A failed password change is returned as is. The name and email change
    /// has already been stored by then and the session reflects it.
    pub fn update_profile(&mut self, actor_id: ActorId, update: ProfileUpdate) -> Result<Actor> {
        let fields = ActorUpdate {
            name: update.name,
            email: update.email,
        };
        let updated = self.api.update_actor(actor_id, &fields)?;

        if self.session.current().is_some_and(|current| current.id == actor_id) {
            self.session.set_current(Some(updated.clone()));
        }
        info!(actor = actor_id, "updated profile");

        if let (Some(password), Some(confirmation)) =
            (update.password.as_deref(), update.password_confirmation.as_deref())
        {
            if let Err(err) = self.api.update_password(actor_id, password, confirmation) {
                warn!(actor = actor_id, error = %err, "profile saved but password change failed");
                return Err(err);
            }
            info!(actor = actor_id, "updated password");
        }

        Ok(updated)
    }
}
