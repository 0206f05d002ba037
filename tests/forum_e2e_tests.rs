//! End-to-end tests for the forum core.
//!
//! These tests drive complete workflows through `ForumClient` against the
//! in-memory backend: choosing an actor, gating actions by role, building
//! threaded discussions and deleting parts of them.

use agora::forum::{
    Actor, ActivitySummary, Capability, ForumApi, ForumClient, InMemoryBackend, ParentRef,
    PermissionTable, Role, SessionStore, Topic,
};
use agora::ForumError;
use std::sync::{Arc, Mutex};

/// Helper to build the standard cast of actors, one per role.
fn create_test_actors() -> Vec<Actor> {
    vec![
        Actor::new(10, "Ada Admin", "ada@example.com", Role::Administrator),
        Actor::new(11, "Gus Guest", "gus@example.com", Role::Guest),
        Actor::new(12, "Sil Silver", "sil@example.com", Role::SilverUser),
        Actor::new(13, "Goldie", "goldie@example.com", Role::GoldUser),
        Actor::new(14, "Nobody", "nobody@example.com", 7u8),
    ]
}

/// Helper to build a client with a fresh session.
fn create_test_client() -> (ForumClient<InMemoryBackend>, SessionStore) {
    let session = SessionStore::new();
    let backend = InMemoryBackend::with_actors(create_test_actors());
    (ForumClient::new(backend, session.clone()), session)
}

// =============================================================================
// Discussion Workflow Tests
// =============================================================================

/// Complete workflow: gold user opens a topic, others reply, a branch is removed.
#[test]
fn test_complete_discussion_workflow() {
    let (mut client, _session) = create_test_client();

    // =========================================================================
    // Step 1: Gold user opens a topic
    // =========================================================================
    client.select_actor(13).unwrap();
    let topic = client
        .create_topic("Release planning", "What goes into 2.0?")
        .expect("gold users may create topics");

    // =========================================================================
    // Step 2: Silver user comments, gold user replies, silver replies again
    // =========================================================================
    client.select_actor(12).unwrap();
    let c1 = client
        .add_comment(&topic.id, &ParentRef::Root, "Faster startup please")
        .unwrap();
    let c2 = client
        .add_comment(&topic.id, &ParentRef::Root, "Dark mode")
        .unwrap();

    client.select_actor(13).unwrap();
    let r1 = client
        .add_comment(&topic.id, &ParentRef::comment(&c1.id), "Agreed")
        .unwrap();

    client.select_actor(12).unwrap();
    let r2 = client
        .add_comment(&topic.id, &ParentRef::comment(&r1.id), "Thanks")
        .unwrap();

    let local = client.registry().find_by_id(&topic.id).unwrap();
    assert_eq!(local.active_comment_count(), 4);
    assert_eq!(local.comments.find(&c1.id).unwrap().active_reply_count(), 1);

    // =========================================================================
    // Step 3: Removing c1 hides its whole branch
    // =========================================================================
    client.delete_comment(&topic.id, &c1.id).unwrap();

    let local = client.registry().find_by_id(&topic.id).unwrap();
    assert_eq!(local.active_comment_count(), 1);
    for id in [&c1.id, &r1.id, &r2.id] {
        assert!(local.comments.find(id).unwrap().removed, "{id} should be removed");
    }
    assert!(!local.comments.find(&c2.id).unwrap().removed);

    // =========================================================================
    // Step 4: The backend agrees after a refresh
    // =========================================================================
    client.refresh_topics().unwrap();
    let refreshed = client.registry().find_by_id(&topic.id).unwrap();
    assert_eq!(refreshed.active_comment_count(), 1);
    assert_eq!(refreshed.comments.total_count(), 4);

    // =========================================================================
    // Step 5: Authorship counts still include removed comments
    // =========================================================================
    assert_eq!(
        client.activity_summary(12),
        ActivitySummary {
            topics: 0,
            comments: 3
        }
    );
    assert_eq!(
        client.activity_summary(13),
        ActivitySummary {
            topics: 1,
            comments: 1
        }
    );
}

/// Every role gets exactly the actions its capability set allows.
#[test]
fn test_role_gating_matrix() {
    let (mut client, _session) = create_test_client();
    client.select_actor(10).unwrap();
    let seed = client.create_topic("Seed", "Seed topic").unwrap();
    let seed_comment = client
        .add_comment(&seed.id, &ParentRef::Root, "seed comment")
        .unwrap();

    let expectations = [
        (10u64, true, true),
        (11, false, false),
        (12, true, false),
        (13, true, true),
        (14, false, false),
    ];

    for (actor_id, may_comment, may_open_topics) in expectations {
        client.select_actor(actor_id).unwrap();

        let comment = client.add_comment(&seed.id, &ParentRef::comment(&seed_comment.id), "hi");
        assert_eq!(comment.is_ok(), may_comment, "actor {actor_id} commenting");
        if !may_comment {
            assert!(matches!(comment, Err(ForumError::PermissionDenied(_))));
        }

        let topic = client.create_topic("New", "Body");
        assert_eq!(topic.is_ok(), may_open_topics, "actor {actor_id} opening topics");
        if let Ok(topic) = topic {
            client.delete_topic(&topic.id).unwrap();
        }
    }
}

/// Signing out denies everything without touching the backend.
#[test]
fn test_signed_out_client_is_inert() {
    let (mut client, session) = create_test_client();
    client.select_actor(10).unwrap();
    let topic = client.create_topic("Kept", "Body").unwrap();
    client.sign_out();
    assert!(session.current().is_none());

    let calls = client.api().call_count();
    for cap in Capability::ALL {
        assert!(!client.can(cap));
    }
    assert!(matches!(
        client.delete_topic(&topic.id),
        Err(ForumError::NotAuthenticated(_))
    ));
    assert!(matches!(
        client.add_comment(&topic.id, &ParentRef::Root, "x"),
        Err(ForumError::NotAuthenticated(_))
    ));
    assert_eq!(client.api().call_count(), calls);
    assert_eq!(client.registry().len(), 1);
}

// =============================================================================
// Session Tests
// =============================================================================

/// A view subscribing after an actor was chosen sees it immediately.
#[test]
fn test_late_subscriber_sees_selected_actor() {
    let (mut client, session) = create_test_client();
    client.select_actor(13).unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let subscription = session.subscribe(move |actor| {
        sink.lock().unwrap().push(actor.map(|a| a.name.clone()));
    });
    assert_eq!(*seen.lock().unwrap(), vec![Some("Goldie".to_string())]);

    client.select_actor(11).unwrap();
    client.sign_out();
    drop(subscription);
    client.select_actor(12).unwrap();

    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            Some("Goldie".to_string()),
            Some("Gus Guest".to_string()),
            None
        ]
    );
}

/// Observers run after the session holds the new actor, so permission checks
/// made from an observer already reflect the change.
#[test]
fn test_observer_permission_checks_see_new_actor() {
    let (mut client, session) = create_test_client();
    let reader = session.clone();
    let grants = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&grants);
    let _subscription = session.subscribe(move |_| {
        sink.lock()
            .unwrap()
            .push(reader.has_permission(Capability::AddDeleteTopics));
    });

    client.select_actor(12).unwrap();
    client.select_actor(13).unwrap();
    assert_eq!(*grants.lock().unwrap(), vec![false, false, true]);
}

// =============================================================================
// Profile Tests
// =============================================================================

/// The permission matrix for the selected actor's role matches its grants.
#[test]
fn test_profile_permission_matrix() {
    let (mut client, _session) = create_test_client();
    let actor = client.select_actor(12).unwrap();
    let role = client.role_of(&actor).unwrap();
    assert_eq!(role.name, PermissionTable::role_name_of(actor.role));

    let matrix = PermissionTable::privilege_matrix(&role.name);
    for row in matrix {
        assert_eq!(row.granted, client.can(row.privilege), "{}", row.privilege);
    }
}

/// Seeded topics are picked up by a refresh and keep their removal flags.
#[test]
fn test_refresh_loads_seeded_topics() {
    let session = SessionStore::new();
    let mut backend = InMemoryBackend::with_actors(create_test_actors());
    let author = create_test_actors().remove(3);

    let mut topic = Topic::new("seeded", "Seeded", "From elsewhere", author.clone());
    let c1 = topic
        .comments
        .insert(&ParentRef::Root, "first", author.clone())
        .unwrap();
    topic
        .comments
        .insert(&ParentRef::comment(&c1.id), "reply", author)
        .unwrap();
    topic.comments.soft_remove(&c1.id).unwrap();
    backend.seed_topic(topic).unwrap();

    let mut client = ForumClient::new(backend, session);
    assert_eq!(client.refresh_topics().unwrap(), 1);
    assert_eq!(client.registry().active_comment_count("seeded").unwrap(), 0);
    assert_eq!(client.registry().count_comments_authored_by(13), 2);

    let fetched = client.api_mut().fetch_topics().unwrap();
    assert_eq!(fetched, client.registry().list());
}
