//! Per-screen memoizing resolver from user id to display identity.
//!
//! # Design
//! Each id moves through `unresolved → loading → resolved | failed`. The map
//! behind one mutex is the only mutation point: [`UserCache::poll`] hands out
//! at most one [`FetchTicket`] per id, so overlapping row binds never issue a
//! second lookup for an id that is already loading. Failed ids show the raw
//! id and are not retried; a new cache (a new screen) starts over.
//! Row views learn about completions through [`UserCache::subscribe`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::api::CollabApi;
use crate::dispatch::{Dispatcher, Liveness};
use crate::error::ApiError;
use crate::types::User;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Loading,
    Resolved(User),
    Failed,
}

/// What a row should show for an id right now.
#[derive(Debug, PartialEq, Eq)]
pub enum Poll {
    /// Final display text (resolved name, or the raw id after a failure).
    Ready(String),
    /// A lookup is in flight; show a loading state.
    Pending,
    /// The caller must perform the lookup and report it with
    /// [`UserCache::complete`].
    Fetch(FetchTicket),
}

/// Permission to perform the single lookup for one id.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a ticket must be completed or the id stays loading"]
pub struct FetchTicket {
    id: String,
}

impl FetchTicket {
    pub fn id(&self) -> &str {
        &self.id
    }
}

type Listener = Box<dyn Fn(&str, &str) + Send + Sync>;

#[derive(Default)]
pub struct UserCache {
    entries: Mutex<HashMap<String, Resolution>>,
    listeners: Mutex<Vec<Listener>>,
}

impl UserCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, Resolution>> {
        // A panicking listener must not wedge every row of the screen.
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Current state for `id` without side effects.
    pub fn state(&self, id: &str) -> Option<Resolution> {
        self.entries().get(id.trim()).cloned()
    }

    /// Display text for `id`, starting a lookup on first access.
    pub fn poll(&self, id: &str) -> Poll {
        let id = id.trim();
        if id.is_empty() {
            return Poll::Ready(String::new());
        }
        let mut entries = self.entries();
        match entries.get(id) {
            Some(Resolution::Resolved(user)) => Poll::Ready(user.display_name().to_string()),
            Some(Resolution::Failed) => Poll::Ready(id.to_string()),
            Some(Resolution::Loading) => Poll::Pending,
            None => {
                entries.insert(id.to_string(), Resolution::Loading);
                Poll::Fetch(FetchTicket { id: id.to_string() })
            }
        }
    }

    /// Record the lookup outcome and notify subscribers. Returns the display
    /// text now shown for the id.
    pub fn complete(&self, ticket: FetchTicket, result: Result<User, ApiError>) -> String {
        let FetchTicket { id } = ticket;
        let (resolution, display) = match result {
            Ok(user) => {
                let display = user.display_name().to_string();
                (Resolution::Resolved(user), display)
            }
            Err(err) => {
                tracing::debug!(user_id = %id, error = %err, "user lookup failed, showing raw id");
                (Resolution::Failed, id.clone())
            }
        };
        self.entries().insert(id.clone(), resolution);

        let listeners = self.listeners.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        for listener in listeners.iter() {
            listener(&id, &display);
        }
        display
    }

    /// Register a callback invoked with `(id, display)` after every completed
    /// lookup.
    pub fn subscribe(&self, listener: impl Fn(&str, &str) + Send + Sync + 'static) {
        self.listeners
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(Box::new(listener));
    }

    /// [`poll`](Self::poll), and when a lookup is due run it on the
    /// dispatcher. Completion is recorded only while `liveness` holds.
    pub fn request(
        self: &Arc<Self>,
        id: &str,
        api: &CollabApi,
        dispatcher: &Dispatcher,
        liveness: &Liveness,
    ) -> Poll {
        match self.poll(id) {
            Poll::Fetch(ticket) => {
                let cache = Arc::clone(self);
                let api = api.clone();
                let lookup_id = ticket.id().to_string();
                dispatcher.submit(
                    liveness,
                    move || api.get_user(&lookup_id),
                    move |result| {
                        cache.complete(ticket, result);
                    },
                );
                Poll::Pending
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;
    use std::thread;

    use super::*;

    fn alice() -> User {
        User {
            id: "u-1".into(),
            name: Some("Alice".into()),
            login: Some("alice".into()),
            email: None,
        }
    }

    #[test]
    fn first_poll_fetches_then_pending() {
        let cache = UserCache::new();
        let ticket = match cache.poll("u-1") {
            Poll::Fetch(ticket) => ticket,
            other => panic!("expected fetch, got {other:?}"),
        };
        assert_eq!(cache.poll("u-1"), Poll::Pending);
        assert_eq!(cache.state("u-1"), Some(Resolution::Loading));

        assert_eq!(cache.complete(ticket, Ok(alice())), "Alice");
        assert_eq!(cache.poll("u-1"), Poll::Ready("Alice".into()));
    }

    #[test]
    fn failure_shows_raw_id_and_never_retries() {
        let cache = UserCache::new();
        let Poll::Fetch(ticket) = cache.poll(" u-7 ") else {
            panic!("expected fetch");
        };
        let shown = cache.complete(ticket, Err(ApiError::NotFound { body: String::new() }));
        assert_eq!(shown, "u-7");
        assert_eq!(cache.poll("u-7"), Poll::Ready("u-7".into()));
        assert_eq!(cache.state("u-7"), Some(Resolution::Failed));
    }

    #[test]
    fn concurrent_polls_issue_exactly_one_fetch() {
        const THREADS: usize = 16;
        let cache = Arc::new(UserCache::new());
        let barrier = Arc::new(Barrier::new(THREADS));
        let fetches = Arc::new(AtomicUsize::new(0));

        let workers: Vec<_> = (0..THREADS)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let barrier = Arc::clone(&barrier);
                let fetches = Arc::clone(&fetches);
                thread::spawn(move || {
                    barrier.wait();
                    if let Poll::Fetch(ticket) = cache.poll("u-1") {
                        fetches.fetch_add(1, Ordering::SeqCst);
                        barrier_free_complete(&cache, ticket);
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
        assert_eq!(cache.poll("u-1"), Poll::Ready("Alice".into()));
    }

    fn barrier_free_complete(cache: &UserCache, ticket: FetchTicket) {
        cache.complete(ticket, Ok(alice()));
    }

    #[test]
    fn subscribers_hear_about_completions() {
        let cache = UserCache::new();
        let heard = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&heard);
        cache.subscribe(move |id, display| sink.lock().unwrap().push(format!("{id}={display}")));

        let Poll::Fetch(ticket) = cache.poll("u-1") else {
            panic!("expected fetch");
        };
        cache.complete(ticket, Ok(alice()));
        assert_eq!(*heard.lock().unwrap(), vec!["u-1=Alice".to_string()]);
    }

    #[test]
    fn blank_id_resolves_to_nothing() {
        assert_eq!(UserCache::new().poll("  "), Poll::Ready(String::new()));
    }
}
