//! Topics and the ordered topic registry.
//!
//! The registry is a flat, ordered list: new topics go to the end, removal is by
//! identifier, and no identifier appears twice. Each topic owns its comment
//! forest; there is no sharing of comments between topics.

use crate::error::{ForumError, Result};
use crate::forum::thread::{CommentNode, ParentRef, ThreadTree};
use crate::forum::types::{Actor, ActorId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, info};

/// A discussion topic and its comments.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    /// Topic identifier.
    pub id: String,
    /// Topic title.
    pub title: String,
    /// Opening post text.
    pub body: String,
    /// Author snapshot.
    pub author: Actor,
    /// Comment forest.
    #[serde(default)]
    pub comments: ThreadTree,
}

impl fmt::Debug for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Topic")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("author", &self.author.id)
            .field("comments", &self.comments.total_count())
            .finish()
    }
}

impl Topic {
    /// Creates a topic with no comments.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        body: impl Into<String>,
        author: Actor,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            body: body.into(),
            author,
            comments: ThreadTree::new(),
        }
    }

    /// Number of visible comments on the topic.
    pub fn active_comment_count(&self) -> usize {
        self.comments.active_count()
    }
}

/// Ordered collection of topics.
#[derive(Debug, Clone, Default)]
pub struct TopicRegistry {
    topics: Vec<Topic>,
}

impl TopicRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all topics in order.
    pub fn list(&self) -> Vec<Topic> {
        self.topics.clone()
    }

    /// Borrowed view of all topics in order.
    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    /// Number of topics.
    pub fn len(&self) -> usize {
        self.topics.len()
    }

    /// Returns true if there are no topics.
    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    /// Appends a topic.
    ///
    /// # Errors
    /// Returns `Conflict` if a topic with the same identifier exists.
    pub fn add(&mut self, topic: Topic) -> Result<()> {
        if self.find_by_id(&topic.id).is_some() {
            return Err(ForumError::conflict(format!(
                "Topic {} already exists",
                topic.id
            )));
        }
        debug!(topic = %topic.id, "added topic");
        self.topics.push(topic);
        Ok(())
    }

    /// Replaces every topic with a freshly fetched list.
    ///
    /// # Errors
    /// Returns `Conflict` if the list repeats a topic identifier; the registry
    /// keeps its previous contents.
    pub fn replace_all(&mut self, topics: Vec<Topic>) -> Result<()> {
        {
            let mut seen = HashSet::with_capacity(topics.len());
            for topic in &topics {
                if !seen.insert(topic.id.as_str()) {
                    return Err(ForumError::conflict(format!(
                        "Topic {} appears more than once",
                        topic.id
                    )));
                }
            }
        }
        info!("Loaded {} topics", topics.len());
        self.topics = topics;
        Ok(())
    }

    /// Removes the topic with this identifier and returns it.
    ///
    /// # Errors
    /// Returns `NotFound` if no topic has this identifier.
    pub fn remove_by_id(&mut self, id: &str) -> Result<Topic> {
        let index = self
            .topics
            .iter()
            .position(|topic| topic.id == id)
            .ok_or_else(|| ForumError::not_found(format!("Topic {} not found", id)))?;
        debug!(topic = %id, "removed topic");
        Ok(self.topics.remove(index))
    }

    /// Looks a topic up by identifier.
    pub fn find_by_id(&self, id: &str) -> Option<&Topic> {
        self.topics.iter().find(|topic| topic.id == id)
    }

    /// Looks a topic up by identifier for mutation.
    pub fn find_by_id_mut(&mut self, id: &str) -> Option<&mut Topic> {
        self.topics.iter_mut().find(|topic| topic.id == id)
    }

    fn require_mut(&mut self, id: &str) -> Result<&mut Topic> {
        self.find_by_id_mut(id)
            .ok_or_else(|| ForumError::not_found(format!("Topic {} not found", id)))
    }

    /// Inserts a new comment into a topic's tree.
    pub fn insert_comment(
        &mut self,
        topic_id: &str,
        parent: &ParentRef,
        body: impl Into<String>,
        author: Actor,
    ) -> Result<CommentNode> {
        self.require_mut(topic_id)?.comments.insert(parent, body, author)
    }

    /// Attaches an existing comment subtree to a topic's tree.
    pub fn attach_comment(
        &mut self,
        topic_id: &str,
        parent: &ParentRef,
        node: CommentNode,
    ) -> Result<()> {
        self.require_mut(topic_id)?.comments.attach(parent, node)
    }

    /// Soft-removes a comment subtree within a topic.
    pub fn soft_remove_comment(&mut self, topic_id: &str, comment_id: &str) -> Result<()> {
        self.require_mut(topic_id)?.comments.soft_remove(comment_id)
    }

    /// Number of visible comments on a topic.
    pub fn active_comment_count(&self, topic_id: &str) -> Result<usize> {
        self.find_by_id(topic_id)
            .map(Topic::active_comment_count)
            .ok_or_else(|| ForumError::not_found(format!("Topic {} not found", topic_id)))
    }

    /// Number of topics started by an actor.
    pub fn count_topics_authored_by(&self, actor_id: ActorId) -> usize {
        self.topics
            .iter()
            .filter(|topic| topic.author.id == actor_id)
            .count()
    }

    /// Number of comments written by an actor across every topic.
    ///
    /// Removed comments are counted too: this reports raw authorship, not what
    /// is visible.
    pub fn count_comments_authored_by(&self, actor_id: ActorId) -> usize {
        self.topics
            .iter()
            .map(|topic| topic.comments.count_authored_by(actor_id))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forum::types::Role;

    fn actor(id: u64) -> Actor {
        Actor::new(id, format!("user{id}"), format!("user{id}@example.com"), Role::GoldUser)
    }

    #[test]
    fn test_add_appends_in_order() {
        let mut registry = TopicRegistry::new();
        registry.add(Topic::new("t1", "First", "body", actor(1))).unwrap();
        registry.add(Topic::new("t2", "Second", "body", actor(2))).unwrap();

        let ids: Vec<_> = registry.list().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["t1", "t2"]);
    }

    #[test]
    fn test_add_duplicate_conflicts() {
        let mut registry = TopicRegistry::new();
        registry.add(Topic::new("t1", "First", "body", actor(1))).unwrap();
        let err = registry
            .add(Topic::new("t1", "Again", "body", actor(2)))
            .unwrap_err();
        assert!(matches!(err, ForumError::Conflict(_)));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.find_by_id("t1").unwrap().title, "First");
    }

    #[test]
    fn test_remove_by_id() {
        let mut registry = TopicRegistry::new();
        for id in ["t1", "t2", "t3"] {
            registry.add(Topic::new(id, id, "body", actor(1))).unwrap();
        }

        let removed = registry.remove_by_id("t2").unwrap();
        assert_eq!(removed.id, "t2");
        assert!(registry.find_by_id("t2").is_none());
        assert_eq!(registry.topics()[1].id, "t3");

        assert!(registry.remove_by_id("t2").unwrap_err().is_not_found());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_replace_all_rejects_duplicates() {
        let mut registry = TopicRegistry::new();
        registry.add(Topic::new("t1", "Kept", "body", actor(1))).unwrap();

        let fetched = vec![
            Topic::new("a", "A", "body", actor(1)),
            Topic::new("a", "A again", "body", actor(1)),
        ];
        assert!(registry.replace_all(fetched).is_err());
        assert_eq!(registry.topics()[0].title, "Kept");

        registry
            .replace_all(vec![Topic::new("b", "B", "body", actor(2))])
            .unwrap();
        assert_eq!(registry.len(), 1);
        assert!(registry.find_by_id("t1").is_none());
    }

    #[test]
    fn test_comment_operations_route_to_topic() {
        let mut registry = TopicRegistry::new();
        registry.add(Topic::new("t1", "First", "body", actor(1))).unwrap();

        let c1 = registry
            .insert_comment("t1", &ParentRef::Root, "hi", actor(2))
            .unwrap();
        registry
            .insert_comment("t1", &ParentRef::comment(&c1.id), "reply", actor(3))
            .unwrap();
        assert_eq!(registry.active_comment_count("t1").unwrap(), 2);

        registry.soft_remove_comment("t1", &c1.id).unwrap();
        assert_eq!(registry.active_comment_count("t1").unwrap(), 0);

        assert!(registry
            .insert_comment("t9", &ParentRef::Root, "lost", actor(2))
            .unwrap_err()
            .is_not_found());
        assert!(registry.active_comment_count("t9").is_err());
    }

    #[test]
    fn test_authorship_counts() {
        let mut registry = TopicRegistry::new();
        registry.add(Topic::new("t1", "First", "body", actor(1))).unwrap();
        registry.add(Topic::new("t2", "Second", "body", actor(2))).unwrap();
        registry.add(Topic::new("t3", "Third", "body", actor(1))).unwrap();

        let c = registry
            .insert_comment("t2", &ParentRef::Root, "by one", actor(1))
            .unwrap();
        registry
            .insert_comment("t2", &ParentRef::comment(&c.id), "also by one", actor(1))
            .unwrap();
        registry
            .insert_comment("t3", &ParentRef::Root, "by two", actor(2))
            .unwrap();
        registry.soft_remove_comment("t2", &c.id).unwrap();

        assert_eq!(registry.count_topics_authored_by(1), 2);
        assert_eq!(registry.count_topics_authored_by(2), 1);
        // Removed comments still count towards authorship.
        assert_eq!(registry.count_comments_authored_by(1), 2);
        assert_eq!(registry.count_comments_authored_by(2), 1);
        assert_eq!(registry.count_comments_authored_by(3), 0);
    }

    #[test]
    fn test_topic_wire_shape() {
        let json = r#"{"id":"t1","title":"T","body":"B",
            "author":{"id":1,"name":"A","email":"a@x","role":0},
            "comments":[{"id":"c1","body":"x",
            "author":{"id":2,"name":"B","email":"b@x","role":2},"comments":[]}]}"#;
        let topic: Topic = serde_json::from_str(json).unwrap();
        assert_eq!(topic.active_comment_count(), 1);
        assert!(topic.author.is_admin());
    }
}
