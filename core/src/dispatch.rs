//! Background execution of blocking API calls with liveness-checked
//! completion.
//!
//! # Design
//! The UI context never blocks: a job (normally one `CollabApi` call) runs on
//! the tokio blocking pool and its completion callback fires afterwards. There
//! is no cancellation. A screen that goes away ends its [`Liveness`], and any
//! completion arriving after that is dropped instead of touching view state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Shared "screen is still alive" flag.
#[derive(Debug, Clone)]
pub struct Liveness(Arc<AtomicBool>);

impl Default for Liveness {
    fn default() -> Self {
        Self::new()
    }
}

impl Liveness {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn is_alive(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Mark the owning screen as torn down. Idempotent.
    pub fn end(&self) {
        self.0.store(false, Ordering::Release);
    }
}

#[derive(Debug, Clone)]
pub struct Dispatcher {
    handle: Handle,
}

impl Dispatcher {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Dispatcher on the runtime the caller is running in.
    ///
    /// # Panics
    /// Panics when called outside a tokio runtime.
    pub fn current() -> Self {
        Self::new(Handle::current())
    }

    /// Run `job` off the calling thread and hand its result to `done` if
    /// `liveness` still holds afterwards. The join handle resolves to whether
    /// `done` was called.
    pub fn submit<R, J, D>(&self, liveness: &Liveness, job: J, done: D) -> JoinHandle<bool>
    where
        R: Send + 'static,
        J: FnOnce() -> R + Send + 'static,
        D: FnOnce(R) + Send + 'static,
    {
        let liveness = liveness.clone();
        self.handle.spawn_blocking(move || {
            let result = job();
            if !liveness.is_alive() {
                tracing::debug!("screen gone before completion, dropping result");
                return false;
            }
            done(result);
            true
        })
    }
}
