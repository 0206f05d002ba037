//! Backend collaborator interface.
//!
//! The core never speaks to the network itself. This module defines:
//! - [`ForumApi`]: the operations the backend must provide, implemented by the
//!   application on top of whatever HTTP client it uses
//! - [`ApiClient`]: request builders producing method, URL and JSON body for
//!   each operation, plus response parsing for the backend's envelope
//!
//! ## Usage
//!
//! ```ignore
//! let client = ApiClient::new(ClientConfig::from_env()?);
//!
//! let request = client.build_fetch_topics_request();
//! // Send `request` with your HTTP client, then:
//! let topics = ApiClient::parse_topics_response(&body)?;
//! ```
//!
//! Every backend response is wrapped as `{ "status": <code>, "data": <payload> }`.

use crate::config::ClientConfig;
use crate::error::{ForumError, Result};
use crate::forum::registry::Topic;
use crate::forum::thread::{CommentNode, ParentRef};
use crate::forum::types::{Actor, ActorId, ActorUpdate, RoleRecord};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

/// Deserializes a response body of any nesting depth.
///
/// Comment forests nest two JSON levels per reply, so serde_json's default
/// recursion limit would reject long reply chains. The limit is lifted and the
/// stack grows on demand instead.
fn from_json<T: DeserializeOwned>(body: &str) -> Result<T> {
    let mut json = serde_json::Deserializer::from_str(body);
    json.disable_recursion_limit();
    let value = T::deserialize(serde_stacker::Deserializer::new(&mut json))?;
    json.end()?;
    Ok(value)
}

/// Operations the backend collaborator provides.
///
/// Calls return canonical shapes or fail with [`ForumError::Api`]. Retry policy,
/// if any, belongs to the implementation.
pub trait ForumApi {
    /// Fetches every topic with its comment forest.
    fn fetch_topics(&mut self) -> Result<Vec<Topic>>;

    /// Creates a topic and returns it as stored by the backend.
    fn create_topic(&mut self, title: &str, body: &str, author: &Actor) -> Result<Topic>;

    /// Creates a comment at the topic root or under an existing comment.
    fn create_comment(
        &mut self,
        topic_id: &str,
        parent: &ParentRef,
        body: &str,
        author: &Actor,
    ) -> Result<CommentNode>;

    /// Deletes a comment (the backend cascades to replies).
    fn delete_comment(&mut self, topic_id: &str, comment_id: &str) -> Result<()>;

    /// Deletes a topic.
    fn delete_topic(&mut self, topic_id: &str) -> Result<()>;

    /// Fetches every actor.
    fn fetch_actors(&mut self) -> Result<Vec<Actor>>;

    /// Fetches one actor.
    fn fetch_actor(&mut self, id: ActorId) -> Result<Actor>;

    /// Fetches a role entity by identifier.
    fn fetch_role(&mut self, id: u8) -> Result<RoleRecord>;

    /// Updates editable actor fields and returns the new snapshot.
    fn update_actor(&mut self, id: ActorId, update: &ActorUpdate) -> Result<Actor>;

    /// Updates an actor's password. Both fields are checked by the backend.
    fn update_password(&mut self, id: ActorId, password: &str, confirmation: &str) -> Result<()>;
}

/// Response envelope used by every backend endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiEnvelope<T> {
    /// HTTP-like status code.
    pub status: u16,
    /// Payload (absent on failure or for empty replies).
    pub data: Option<T>,
}

impl<T> ApiEnvelope<T> {
    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Extracts the payload, failing on an error status or a missing payload.
    pub fn into_data(self) -> Result<T> {
        if !self.is_success() {
            return Err(ForumError::api(format!(
                "Backend returned status {}",
                self.status
            )));
        }
        self.data
            .ok_or_else(|| ForumError::api("Backend response carried no data"))
    }

    /// Checks the status only, ignoring any payload.
    pub fn into_unit(self) -> Result<()> {
        if self.is_success() {
            Ok(())
        } else {
            Err(ForumError::api(format!(
                "Backend returned status {}",
                self.status
            )))
        }
    }
}

/// HTTP method of a built request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// GET
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// DELETE
    Delete,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpMethod::Get => write!(f, "GET"),
            HttpMethod::Post => write!(f, "POST"),
            HttpMethod::Put => write!(f, "PUT"),
            HttpMethod::Delete => write!(f, "DELETE"),
        }
    }
}

/// A fully described backend request, ready for any HTTP client.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Absolute URL.
    pub url: String,
    /// JSON body, if the endpoint takes one.
    pub body: Option<Value>,
}

/// Request builder and response parser for the forum backend.
#[derive(Debug, Clone, Default)]
pub struct ApiClient {
    config: ClientConfig,
}

impl ApiClient {
    /// Creates a builder for the configured backend.
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration in use.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn request(&self, method: HttpMethod, path: &str, body: Option<Value>) -> ApiRequest {
        ApiRequest {
            method,
            url: self.config.endpoint(path),
            body,
        }
    }

    fn to_value(author: &Actor) -> Result<Value> {
        Ok(serde_json::to_value(author)?)
    }

    /// `GET /topics`
    pub fn build_fetch_topics_request(&self) -> ApiRequest {
        self.request(HttpMethod::Get, "topics", None)
    }

    /// `POST /topic/add`
    pub fn build_create_topic_request(
        &self,
        title: &str,
        body: &str,
        author: &Actor,
    ) -> Result<ApiRequest> {
        let payload = json!({ "title": title, "body": body, "author": Self::to_value(author)? });
        Ok(self.request(HttpMethod::Post, "topic/add", Some(payload)))
    }

    /// `POST /topic/{topic}/comment/add` or `POST /topic/{topic}/comment/{comment}/add`
    pub fn build_create_comment_request(
        &self,
        topic_id: &str,
        parent: &ParentRef,
        body: &str,
        author: &Actor,
    ) -> Result<ApiRequest> {
        let path = match parent {
            ParentRef::Root => format!("topic/{}/comment/add", topic_id),
            ParentRef::Comment(comment_id) => {
                format!("topic/{}/comment/{}/add", topic_id, comment_id)
            }
        };
        let payload = json!({ "body": body, "author": Self::to_value(author)? });
        Ok(self.request(HttpMethod::Post, &path, Some(payload)))
    }

    /// `DELETE /topic/{topic}/comment/{comment}`
    pub fn build_delete_comment_request(&self, topic_id: &str, comment_id: &str) -> ApiRequest {
        self.request(
            HttpMethod::Delete,
            &format!("topic/{}/comment/{}", topic_id, comment_id),
            None,
        )
    }

    /// `DELETE /topic/{topic}`
    pub fn build_delete_topic_request(&self, topic_id: &str) -> ApiRequest {
        self.request(HttpMethod::Delete, &format!("topic/{}", topic_id), None)
    }

    /// `GET /users`
    pub fn build_fetch_actors_request(&self) -> ApiRequest {
        self.request(HttpMethod::Get, "users", None)
    }

    /// `GET /user/{id}`
    pub fn build_fetch_actor_request(&self, id: ActorId) -> ApiRequest {
        self.request(HttpMethod::Get, &format!("user/{}", id), None)
    }

    /// `GET /role/{id}`
    pub fn build_fetch_role_request(&self, id: u8) -> ApiRequest {
        self.request(HttpMethod::Get, &format!("role/{}", id), None)
    }

    /// `PUT /user/{id}`
    pub fn build_update_actor_request(
        &self,
        id: ActorId,
        update: &ActorUpdate,
    ) -> Result<ApiRequest> {
        let payload = serde_json::to_value(update)?;
        Ok(self.request(HttpMethod::Put, &format!("user/{}", id), Some(payload)))
    }

    /// `PUT /user/{id}/password`
    pub fn build_update_password_request(
        &self,
        id: ActorId,
        password: &str,
        confirmation: &str,
    ) -> ApiRequest {
        let payload = json!({ "password1": password, "password2": confirmation });
        self.request(
            HttpMethod::Put,
            &format!("user/{}/password", id),
            Some(payload),
        )
    }

    /// Parses an envelope and extracts its typed payload.
    pub fn parse_response<T: DeserializeOwned>(body: &str) -> Result<T> {
        let envelope: ApiEnvelope<T> = from_json(body)?;
        envelope.into_data()
    }

    /// Parses an envelope whose payload is irrelevant.
    pub fn parse_empty_response(body: &str) -> Result<()> {
        let envelope: ApiEnvelope<Value> = from_json(body)?;
        envelope.into_unit()
    }

    /// Parses the reply to [`build_fetch_topics_request`](Self::build_fetch_topics_request).
    pub fn parse_topics_response(body: &str) -> Result<Vec<Topic>> {
        Self::parse_response(body)
    }

    /// Parses a single-topic reply.
    pub fn parse_topic_response(body: &str) -> Result<Topic> {
        Self::parse_response(body)
    }

    /// Parses a single-comment reply.
    pub fn parse_comment_response(body: &str) -> Result<CommentNode> {
        Self::parse_response(body)
    }

    /// Parses a single-actor reply.
    pub fn parse_actor_response(body: &str) -> Result<Actor> {
        Self::parse_response(body)
    }

    /// Parses a role reply.
    pub fn parse_role_response(body: &str) -> Result<RoleRecord> {
        Self::parse_response(body)
    }
}
