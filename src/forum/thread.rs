//! Comment trees for the forum.
//!
//! Every topic owns a `ThreadTree`: an ordered forest of `CommentNode`s where
//! each node exclusively owns its replies. Nodes are only ever appended, never
//! moved, so the structure cannot form cycles.
//!
//! ## Removal
//!
//! Comments are soft-deleted. `soft_remove` flags the node and every
//! descendant, and the flag never goes back to false. Counting is gated
//! separately: [`total_active_count`] treats a removed node as opaque and
//! skips its whole subtree, whatever the descendants' own flags say.
//!
//! ```text
//! C1 (active)            counted
//! C2 (removed)           hidden
//!   └── C3 (active)      hidden, C2 is opaque
//! ```

use crate::error::{ForumError, Result};
use crate::forum::types::{Actor, ActorId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use tracing::debug;
use uuid::Uuid;

fn is_false(value: &bool) -> bool {
    !*value
}

/// A single comment and its replies.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentNode {
    /// Comment identifier.
    pub id: String,
    /// Comment text.
    pub body: String,
    /// Author snapshot.
    pub author: Actor,
    /// Replies in insertion order.
    #[serde(default)]
    pub comments: Vec<CommentNode>,
    /// Soft-deletion flag. Absent on the wire means false.
    #[serde(default, skip_serializing_if = "is_false")]
    pub removed: bool,
}

impl fmt::Debug for CommentNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommentNode")
            .field("id", &self.id)
            .field("author", &self.author.id)
            .field("body_len", &self.body.len())
            .field("replies", &self.comments.len())
            .field("removed", &self.removed)
            .finish()
    }
}

impl CommentNode {
    /// Creates a new leaf comment.
    pub fn new(id: impl Into<String>, body: impl Into<String>, author: Actor) -> Self {
        Self {
            id: id.into(),
            body: body.into(),
            author,
            comments: Vec::new(),
            removed: false,
        }
    }

    /// Creates a new leaf comment with a freshly generated identifier.
    pub fn with_generated_id(body: impl Into<String>, author: Actor) -> Self {
        Self::new(Uuid::new_v4().to_string(), body, author)
    }

    /// Number of immediate replies that are not removed.
    pub fn active_reply_count(&self) -> usize {
        direct_active_child_count(self)
    }

    /// Returns true if this comment accepts replies.
    pub fn accepts_replies(&self) -> bool {
        !self.removed
    }

    fn mark_removed(&mut self) {
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            node.removed = true;
            pending.extend(node.comments.iter_mut());
        }
    }

    fn collect_ids(&self) -> Vec<&str> {
        let mut ids = Vec::new();
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            ids.push(node.id.as_str());
            pending.extend(node.comments.iter());
        }
        ids
    }
}

/// Where a new comment is attached.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParentRef {
    /// The topic's root comment list.
    Root,
    /// An existing comment, by identifier.
    Comment(String),
}

impl ParentRef {
    /// Convenience constructor for a reply target.
    pub fn comment(id: impl Into<String>) -> Self {
        ParentRef::Comment(id.into())
    }
}

impl fmt::Display for ParentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParentRef::Root => f.write_str("root"),
            ParentRef::Comment(id) => write!(f, "comment {}", id),
        }
    }
}

/// Counts visible comments in a list, recursively.
///
/// A removed node contributes nothing and its subtree is not visited.
pub fn total_active_count(nodes: &[CommentNode]) -> usize {
    let mut pending: Vec<&CommentNode> = nodes.iter().collect();
    let mut count = 0;
    while let Some(node) = pending.pop() {
        if !node.removed {
            count += 1;
            pending.extend(node.comments.iter());
        }
    }
    count
}

/// Counts a node's immediate replies that are not removed.
///
/// Independent of the state of the node itself or its ancestors.
pub fn direct_active_child_count(node: &CommentNode) -> usize {
    node.comments.iter().filter(|reply| !reply.removed).count()
}

/// Counts every comment in a list, removed or not.
pub fn total_count(nodes: &[CommentNode]) -> usize {
    let mut pending: Vec<&CommentNode> = nodes.iter().collect();
    let mut count = 0;
    while let Some(node) = pending.pop() {
        count += 1;
        pending.extend(node.comments.iter());
    }
    count
}

/// Counts comments written by an actor, recursing into every subtree
/// regardless of the removed flag.
pub fn count_authored_by(nodes: &[CommentNode], actor_id: ActorId) -> usize {
    let mut pending: Vec<&CommentNode> = nodes.iter().collect();
    let mut count = 0;
    while let Some(node) = pending.pop() {
        if node.author.id == actor_id {
            count += 1;
        }
        pending.extend(node.comments.iter());
    }
    count
}

// Traversals keep an explicit stack so reply depth is bounded by memory, not
// by the call stack. Children are pushed reversed to visit in pre-order.

fn find_in<'a>(nodes: &'a [CommentNode], id: &str) -> Option<&'a CommentNode> {
    let mut pending: Vec<&CommentNode> = nodes.iter().rev().collect();
    while let Some(node) = pending.pop() {
        if node.id == id {
            return Some(node);
        }
        pending.extend(node.comments.iter().rev());
    }
    None
}

fn find_in_mut<'a>(nodes: &'a mut [CommentNode], id: &str) -> Option<&'a mut CommentNode> {
    let mut pending: Vec<&mut CommentNode> = nodes.iter_mut().rev().collect();
    while let Some(node) = pending.pop() {
        if node.id == id {
            return Some(node);
        }
        pending.extend(node.comments.iter_mut().rev());
    }
    None
}

/// The comment forest of one topic.
///
/// Serializes as the bare root list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThreadTree {
    roots: Vec<CommentNode>,
}

impl From<Vec<CommentNode>> for ThreadTree {
    fn from(roots: Vec<CommentNode>) -> Self {
        Self { roots }
    }
}

impl ThreadTree {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Root-level comments in insertion order.
    pub fn roots(&self) -> &[CommentNode] {
        &self.roots
    }

    /// Returns true if the tree holds no comments at all.
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Depth-first lookup by identifier.
    pub fn find(&self, id: &str) -> Option<&CommentNode> {
        find_in(&self.roots, id)
    }

    /// Returns true if a comment with this identifier exists anywhere in the tree.
    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    /// Returns true if the parent reference resolves in this tree.
    pub fn has_parent(&self, parent: &ParentRef) -> bool {
        match parent {
            ParentRef::Root => true,
            ParentRef::Comment(id) => self.contains(id),
        }
    }

    /// Appends a new leaf comment under `parent` and returns a copy of it.
    ///
    /// # Errors
    /// Returns `NotFound` if `parent` names a comment that does not exist.
    /// The tree is left unchanged.
    pub fn insert(
        &mut self,
        parent: &ParentRef,
        body: impl Into<String>,
        author: Actor,
    ) -> Result<CommentNode> {
        let node = CommentNode::with_generated_id(body, author);
        let siblings = self.children_mut(parent)?;
        siblings.push(node.clone());
        debug!(comment = %node.id, %parent, "inserted comment");
        Ok(node)
    }

    /// Appends an existing comment subtree (e.g. one returned by the backend).
    ///
    /// # Errors
    /// Returns `NotFound` for a missing parent and `Conflict` if any identifier
    /// in `node`'s subtree already exists in the tree or repeats within it.
    pub fn attach(&mut self, parent: &ParentRef, node: CommentNode) -> Result<()> {
        {
            let incoming = node.collect_ids();
            let mut seen = HashSet::with_capacity(incoming.len());
            for id in incoming {
                if !seen.insert(id) || self.contains(id) {
                    return Err(ForumError::conflict(format!(
                        "Comment {} already exists in this thread",
                        id
                    )));
                }
            }
        }

        let siblings = self.children_mut(parent)?;
        debug!(comment = %node.id, %parent, "attached comment");
        siblings.push(node);
        Ok(())
    }

    /// Soft-removes a comment and all of its descendants.
    ///
    /// Removing an already removed comment succeeds and changes nothing.
    ///
    /// # Errors
    /// Returns `NotFound` if no comment has this identifier.
    pub fn soft_remove(&mut self, id: &str) -> Result<()> {
        let node = find_in_mut(&mut self.roots, id)
            .ok_or_else(|| ForumError::not_found(format!("Comment {} not found", id)))?;
        node.mark_removed();
        debug!(comment = %id, "soft-removed comment subtree");
        Ok(())
    }

    /// Number of visible comments (removed subtrees are skipped entirely).
    pub fn active_count(&self) -> usize {
        total_active_count(&self.roots)
    }

    /// Number of comments regardless of removal.
    pub fn total_count(&self) -> usize {
        total_count(&self.roots)
    }

    /// Number of comments written by `actor_id`, removed ones included.
    pub fn count_authored_by(&self, actor_id: ActorId) -> usize {
        count_authored_by(&self.roots, actor_id)
    }

    fn children_mut(&mut self, parent: &ParentRef) -> Result<&mut Vec<CommentNode>> {
        match parent {
            ParentRef::Root => Ok(&mut self.roots),
            ParentRef::Comment(id) => find_in_mut(&mut self.roots, id)
                .map(|node| &mut node.comments)
                .ok_or_else(|| ForumError::not_found(format!("Parent comment {} not found", id))),
        }
    }
}
