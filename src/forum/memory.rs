//! In-process backend.
//!
//! `InMemoryBackend` implements [`ForumApi`] without any network, keeping its
//! own copy of the topics and actors. It is useful for offline use, demos and
//! tests. It can be switched offline to simulate transport failures.

use crate::error::{ForumError, Result};
use crate::forum::api::ForumApi;
use crate::forum::registry::{Topic, TopicRegistry};
use crate::forum::thread::{CommentNode, ParentRef};
use crate::forum::types::{Actor, ActorId, ActorUpdate, Role, RoleRecord};
use uuid::Uuid;

/// A backend living entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBackend {
    topics: TopicRegistry,
    actors: Vec<Actor>,
    passwords: Vec<(ActorId, String)>,
    offline: bool,
    calls: usize,
}

impl InMemoryBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend knowing the given actors.
    pub fn with_actors(actors: impl IntoIterator<Item = Actor>) -> Self {
        Self {
            actors: actors.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Seeds a topic directly, bypassing the API.
    pub fn seed_topic(&mut self, topic: Topic) -> Result<()> {
        self.topics.add(topic)
    }

    /// Makes every subsequent call fail (or succeed again).
    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    /// Number of API calls received, failed ones included.
    pub fn call_count(&self) -> usize {
        self.calls
    }

    /// The backend's own view of the topics.
    pub fn topics(&self) -> &TopicRegistry {
        &self.topics
    }

    /// Returns the stored password of an actor, if one was ever set.
    pub fn password_of(&self, id: ActorId) -> Option<&str> {
        self.passwords
            .iter()
            .find(|(actor, _)| *actor == id)
            .map(|(_, password)| password.as_str())
    }

    fn enter(&mut self) -> Result<()> {
        self.calls += 1;
        if self.offline {
            return Err(ForumError::api("Backend unreachable"));
        }
        Ok(())
    }

    fn actor_mut(&mut self, id: ActorId) -> Result<&mut Actor> {
        self.actors
            .iter_mut()
            .find(|actor| actor.id == id)
            .ok_or_else(|| ForumError::api(format!("User {} does not exist", id)))
    }

    fn remote<T>(result: Result<T>) -> Result<T> {
        // Local structural errors become opaque backend failures here.
        result.map_err(|err| ForumError::api(err.to_string()))
    }
}

impl ForumApi for InMemoryBackend {
    fn fetch_topics(&mut self) -> Result<Vec<Topic>> {
        self.enter()?;
        Ok(self.topics.list())
    }

    fn create_topic(&mut self, title: &str, body: &str, author: &Actor) -> Result<Topic> {
        self.enter()?;
        let topic = Topic::new(Uuid::new_v4().to_string(), title, body, author.clone());
        Self::remote(self.topics.add(topic.clone()))?;
        Ok(topic)
    }

    fn create_comment(
        &mut self,
        topic_id: &str,
        parent: &ParentRef,
        body: &str,
        author: &Actor,
    ) -> Result<CommentNode> {
        self.enter()?;
        Self::remote(
            self.topics
                .insert_comment(topic_id, parent, body, author.clone()),
        )
    }

    fn delete_comment(&mut self, topic_id: &str, comment_id: &str) -> Result<()> {
        self.enter()?;
        Self::remote(self.topics.soft_remove_comment(topic_id, comment_id))
    }

    fn delete_topic(&mut self, topic_id: &str) -> Result<()> {
        self.enter()?;
        Self::remote(self.topics.remove_by_id(topic_id)).map(|_| ())
    }

    fn fetch_actors(&mut self) -> Result<Vec<Actor>> {
        self.enter()?;
        Ok(self.actors.clone())
    }

    fn fetch_actor(&mut self, id: ActorId) -> Result<Actor> {
        self.enter()?;
        self.actor_mut(id).map(|actor| actor.clone())
    }

    fn fetch_role(&mut self, id: u8) -> Result<RoleRecord> {
        self.enter()?;
        let role = Role::from_level(id)
            .ok_or_else(|| ForumError::api(format!("Role {} does not exist", id)))?;
        Ok(RoleRecord {
            id,
            name: role.name().to_string(),
        })
    }

    fn update_actor(&mut self, id: ActorId, update: &ActorUpdate) -> Result<Actor> {
        self.enter()?;
        let actor = self.actor_mut(id)?;
        if let Some(name) = &update.name {
            actor.name = name.clone();
        }
        if let Some(email) = &update.email {
            actor.email = email.clone();
        }
        Ok(actor.clone())
    }

    fn update_password(&mut self, id: ActorId, password: &str, confirmation: &str) -> Result<()> {
        self.enter()?;
        self.actor_mut(id)?;
        if password != confirmation {
            return Err(ForumError::api("Passwords do not match"));
        }
        self.passwords.retain(|(actor, _)| *actor != id);
        self.passwords.push((id, password.to_string()));
        Ok(())
    }
}
