//! Current-actor session with replay-latest observers.
//!
//! A `SessionStore` holds at most one actor: whoever is acting right now.
//! It is an explicit handle, cloned into whichever component needs it, rather
//! than a process global. Clones share the same state.
//!
//! Observers registered with [`SessionStore::subscribe`] receive the current
//! value immediately, then every later change in registration order. Observers
//! are always called after the store has been fully updated and outside its
//! internal lock, so an observer may read the store safely.
//!
//! An observer may also set the store. The new value becomes current at once,
//! but its delivery is queued until every observer has seen the value being
//! delivered, so each observer sees changes in the order they were made and
//! its last delivered value always matches [`SessionStore::current`].

use crate::forum::permissions::PermissionTable;
use crate::forum::types::{Actor, Capability};
use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::thread;
use tracing::debug;

type Observer = Arc<dyn Fn(Option<&Actor>) + Send + Sync>;

struct SessionInner {
    current: Option<Actor>,
    observers: Vec<(u64, Observer)>,
    next_observer_id: u64,
    /// Changes waiting for delivery, oldest first.
    queued: VecDeque<Option<Actor>>,
    /// Set while some caller is draining `queued`.
    delivering: bool,
}

/// Releases the delivery flag if an observer panics mid-delivery.
struct DeliveryGuard<'a>(&'a Mutex<SessionInner>);

impl Drop for DeliveryGuard<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            let mut inner = lock(self.0);
            inner.delivering = false;
            inner.queued.clear();
        }
    }
}

fn lock(inner: &Mutex<SessionInner>) -> MutexGuard<'_, SessionInner> {
    // No invariant spans a panic inside the critical sections below.
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Holder of the current actor.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Mutex<SessionInner>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = lock(&self.inner);
        f.debug_struct("SessionStore")
            .field("current", &inner.current.as_ref().map(|a| a.id))
            .field("observers", &inner.observers.len())
            .finish()
    }
}

impl SessionStore {
    /// Creates an empty session (no current actor).
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(SessionInner {
                current: None,
                observers: Vec::new(),
                next_observer_id: 0,
                queued: VecDeque::new(),
                delivering: false,
            })),
        }
    }

    /// Returns a snapshot of the current actor.
    pub fn current(&self) -> Option<Actor> {
        lock(&self.inner).current.clone()
    }

    /// Replaces the current actor and notifies every observer.
    ///
    /// When called from inside an observer, the change is delivered after the
    /// delivery in progress has reached every observer.
    pub fn set_current(&self, actor: Option<Actor>) {
        {
            let mut inner = lock(&self.inner);
            inner.current = actor.clone();
            inner.queued.push_back(actor);
            if inner.delivering {
                return;
            }
            inner.delivering = true;
        }

        let _guard = DeliveryGuard(&self.inner);
        loop {
            let (actor, observers): (Option<Actor>, Vec<Observer>) = {
                let mut inner = lock(&self.inner);
                let next = inner.queued.pop_front();
                match next {
                    Some(actor) => {
                        let observers = inner.observers.iter().map(|(_, obs)| Arc::clone(obs));
                        (actor, observers.collect())
                    }
                    None => {
                        inner.delivering = false;
                        return;
                    }
                }
            };

            debug!(
                actor = ?actor.as_ref().map(|a| a.id),
                observers = observers.len(),
                "session actor changed"
            );

            for observer in observers {
                observer(actor.as_ref());
            }
        }
    }

    /// Clears the current actor.
    pub fn clear(&self) {
        self.set_current(None);
    }

    /// Registers an observer and immediately replays the current value to it.
    ///
    /// Delivery stops when the returned [`Subscription`] is dropped or
    /// unsubscribed.
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(Option<&Actor>) + Send + Sync + 'static,
    {
        let observer: Observer = Arc::new(observer);
        let (id, current) = {
            let mut inner = lock(&self.inner);
            let id = inner.next_observer_id;
            inner.next_observer_id += 1;
            inner.observers.push((id, Arc::clone(&observer)));
            (id, inner.current.clone())
        };

        observer(current.as_ref());

        Subscription {
            id,
            store: Arc::downgrade(&self.inner),
        }
    }

    /// Returns the number of registered observers.
    pub fn observer_count(&self) -> usize {
        lock(&self.inner).observers.len()
    }

    /// Checks whether the current actor may perform a capability.
    ///
    /// Always false when nobody is acting.
    pub fn has_permission(&self, capability: Capability) -> bool {
        let role = lock(&self.inner).current.as_ref().map(|a| a.role);
        PermissionTable::can_perform(role, capability)
    }

    /// Checks a capability by wire name for the current actor.
    pub fn has_permission_named(&self, capability: &str) -> bool {
        let role = lock(&self.inner).current.as_ref().map(|a| a.role);
        PermissionTable::can_perform_named(role, capability)
    }

    /// Returns true if the current actor is an administrator.
    pub fn is_admin(&self) -> bool {
        lock(&self.inner).current.as_ref().is_some_and(Actor::is_admin)
    }
}

/// Handle for a registered session observer.
///
/// Dropping the handle unsubscribes. Unsubscribing never changes the held
/// actor.
#[must_use = "dropping a Subscription immediately unsubscribes the observer"]
pub struct Subscription {
    id: u64,
    store: Weak<Mutex<SessionInner>>,
}

impl Subscription {
    /// Stops further delivery to this observer.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.store.upgrade() {
            lock(&inner).observers.retain(|(id, _)| *id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forum::types::Role;

    fn actor(id: u64, role: Role) -> Actor {
        Actor::new(id, format!("user{id}"), format!("user{id}@example.com"), role)
    }

    fn recorder() -> (Arc<Mutex<Vec<Option<u64>>>>, impl Fn(Option<&Actor>) + Send + Sync) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        (seen, move |a: Option<&Actor>| {
            sink.lock().unwrap().push(a.map(|a| a.id));
        })
    }

    #[test]
    fn test_starts_empty() {
        let store = SessionStore::new();
        assert!(store.current().is_none());
        assert!(!store.is_admin());
        assert!(!store.has_permission(Capability::ReadComments));
    }

    #[test]
    fn test_set_and_clear() {
        let store = SessionStore::new();
        store.set_current(Some(actor(1, Role::GoldUser)));
        assert_eq!(store.current().map(|a| a.id), Some(1));
        assert!(store.has_permission(Capability::AddDeleteTopics));

        store.clear();
        assert!(store.current().is_none());
        assert!(!store.has_permission(Capability::ReadComments));
        assert!(!store.has_permission_named("readComments"));
    }

    #[test]
    fn test_replay_latest_on_subscribe() {
        let store = SessionStore::new();
        store.set_current(Some(actor(7, Role::Guest)));

        let (seen, observer) = recorder();
        let _sub = store.subscribe(observer);
        assert_eq!(*seen.lock().unwrap(), vec![Some(7)]);
    }

    #[test]
    fn test_empty_session_replays_none() {
        let store = SessionStore::new();
        let (seen, observer) = recorder();
        let _sub = store.subscribe(observer);
        assert_eq!(*seen.lock().unwrap(), vec![None]);
    }

    #[test]
    fn test_notifies_in_registration_order() {
        let store = SessionStore::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        let first = Arc::clone(&order);
        let _a = store.subscribe(move |_| first.lock().unwrap().push("a"));
        let second = Arc::clone(&order);
        let _b = store.subscribe(move |_| second.lock().unwrap().push("b"));

        order.lock().unwrap().clear();
        store.set_current(Some(actor(1, Role::Administrator)));
        assert_eq!(*order.lock().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_unsubscribe_stops_delivery_and_keeps_value() {
        let store = SessionStore::new();
        let (seen, observer) = recorder();
        let sub = store.subscribe(observer);
        store.set_current(Some(actor(2, Role::SilverUser)));

        sub.unsubscribe();
        assert_eq!(store.observer_count(), 0);
        store.set_current(Some(actor(3, Role::SilverUser)));

        assert_eq!(*seen.lock().unwrap(), vec![None, Some(2)]);
        assert_eq!(store.current().map(|a| a.id), Some(3));
    }

    #[test]
    fn test_observer_sees_updated_state() {
        let store = SessionStore::new();
        let reader = store.clone();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _sub = store.subscribe(move |delivered| {
            // Reading the store from inside an observer must not deadlock.
            let held = reader.current().map(|a| a.id);
            sink.lock().unwrap().push((delivered.map(|a| a.id), held));
        });

        store.set_current(Some(actor(5, Role::GoldUser)));
        assert_eq!(*seen.lock().unwrap(), vec![(None, None), (Some(5), Some(5))]);
    }

    #[test]
    fn test_change_made_by_observer_is_delivered_in_order() {
        let store = SessionStore::new();
        let writer = store.clone();
        let _redirect = store.subscribe(move |delivered| {
            if delivered.map(|a| a.id) == Some(1) {
                writer.set_current(Some(actor(2, Role::GoldUser)));
            }
        });
        let (seen, observer) = recorder();
        let _late = store.subscribe(observer);

        store.set_current(Some(actor(1, Role::Guest)));
        assert_eq!(*seen.lock().unwrap(), vec![None, Some(1), Some(2)]);
        assert_eq!(store.current().map(|a| a.id), Some(2));

        // Delivery is idle again afterwards.
        store.set_current(Some(actor(3, Role::Guest)));
        assert_eq!(seen.lock().unwrap().last(), Some(&Some(3)));
    }

    #[test]
    fn test_clones_share_state() {
        let store = SessionStore::new();
        let other = store.clone();
        other.set_current(Some(actor(9, Role::Administrator)));
        assert!(store.is_admin());
        assert!(store.has_permission_named("anythingAtAll"));
    }
}
