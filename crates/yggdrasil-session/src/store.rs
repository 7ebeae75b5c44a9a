//! The session store: a bounded, idle-expiring map of live sessions.
//!
//! ```text
//!   set() ──→ [live] ──(idle > ttl)──→ [expired] ──→ removed by get() or sweep
//!               │
//!               ├──(destroy)──→ removed
//!               └──(oldest at capacity)──→ evicted by the next new set()
//! ```
//!
//! # Concurrency
//!
//! The map sits behind a single `tokio::sync::Mutex`. Every operation holds
//! the lock for one short, non-blocking critical section, so a sweep can
//! run concurrently with request handlers without tearing an entry.
//!
//! # Background sweep
//!
//! [`SessionStore::start`] spawns a task that calls
//! [`sweep_expired`](SessionStore::sweep_expired) every `cleanup_interval`.
//! The task holds only a [`Weak`] handle to the map: when the store is
//! dropped the next tick finds nothing to upgrade and the task exits.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::{Session, SessionConfig, SessionError, SessionId};

/// State shared between the store and its sweeper task.
#[derive(Debug)]
struct Shared {
    sessions: Mutex<HashMap<SessionId, Session>>,
    config: SessionConfig,
}

impl Shared {
    async fn sweep(&self) -> usize {
        let now = Instant::now();
        let ttl = self.config.ttl;
        let mut sessions = self.sessions.lock().await;

        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired(now, ttl));
        before - sessions.len()
    }
}

/// Holds every live session, keyed by [`SessionId`].
#[derive(Debug)]
pub struct SessionStore {
    shared: Arc<Shared>,
    sweeper: Option<JoinHandle<()>>,
}

impl SessionStore {
    /// Creates an empty store. No background task is spawned until
    /// [`start`](Self::start) is called.
    ///
    /// # Errors
    /// [`SessionError::InvalidConfig`] if any limit is zero.
    pub fn new(config: SessionConfig) -> Result<Self, SessionError> {
        let config = config.validated()?;
        Ok(Self {
            shared: Arc::new(Shared {
                sessions: Mutex::new(HashMap::new()),
                config,
            }),
            sweeper: None,
        })
    }

    /// The validated limits this store enforces.
    pub fn config(&self) -> &SessionConfig {
        &self.shared.config
    }

    // -- Lifecycle --------------------------------------------------------

    /// Spawns the background sweeper. Calling it again while the sweeper is
    /// running does nothing.
    ///
    /// # Errors
    /// [`SessionError::NoRuntime`] when called outside a tokio runtime.
    pub fn start(&mut self) -> Result<(), SessionError> {
        if self.is_running() {
            return Ok(());
        }
        let handle =
            tokio::runtime::Handle::try_current().map_err(|_| SessionError::NoRuntime)?;

        let period = self.shared.config.cleanup_interval;
        let weak = Arc::downgrade(&self.shared);
        self.sweeper = Some(handle.spawn(run_sweeper(weak, period)));

        tracing::debug!(interval_ms = period.as_millis() as u64, "session sweeper started");
        Ok(())
    }

    /// Stops the background sweeper, if running. Sessions are kept.
    pub fn stop(&mut self) {
        if let Some(handle) = self.sweeper.take() {
            handle.abort();
            tracing::debug!("session sweeper stopped");
        }
    }

    /// Whether the background sweeper is currently running.
    pub fn is_running(&self) -> bool {
        self.sweeper.as_ref().is_some_and(|h| !h.is_finished())
    }

    // -- Operations -------------------------------------------------------

    /// Returns the session for `id`.
    ///
    /// An expired session is removed and reported as absent. Reading does
    /// not refresh `last_accessed`; use [`touch`](Self::touch) for that.
    pub async fn get(&self, id: &SessionId) -> Option<Session> {
        let now = Instant::now();
        let mut sessions = self.shared.sessions.lock().await;

        let expired = sessions.get(id)?.is_expired(now, self.shared.config.ttl);
        if expired {
            sessions.remove(id);
            tracing::debug!(session_id = %id, "session expired on read");
            return None;
        }
        sessions.get(id).cloned()
    }

    /// Inserts or overwrites the session for `id`, stamping
    /// `last_accessed` with the current instant.
    ///
    /// When `id` is new and the store is full, the session with the oldest
    /// `last_accessed` is evicted first. Overwriting never evicts.
    pub async fn set(&self, id: SessionId, mut session: Session) {
        let now = Instant::now();
        session.last_accessed = now;
        session.created_at = session.created_at.min(now);

        let mut sessions = self.shared.sessions.lock().await;

        if !sessions.contains_key(&id) && sessions.len() >= self.shared.config.max_sessions {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, s)| s.last_accessed)
                .map(|(key, _)| key.clone());
            if let Some(oldest) = oldest {
                if let Some(evicted) = sessions.remove(&oldest) {
                    tracing::info!(
                        session_id = %oldest,
                        user_id = %evicted.user_id,
                        "session evicted, store at capacity"
                    );
                }
            }
        }

        sessions.insert(id, session);
    }

    /// Removes the session for `id`. Returns whether one was present.
    pub async fn destroy(&self, id: &SessionId) -> bool {
        self.shared.sessions.lock().await.remove(id).is_some()
    }

    /// Refreshes `last_accessed` for `id`. Returns whether one was present.
    pub async fn touch(&self, id: &SessionId) -> bool {
        let mut sessions = self.shared.sessions.lock().await;
        match sessions.get_mut(id) {
            Some(session) => {
                session.last_accessed = Instant::now();
                true
            }
            None => false,
        }
    }

    /// Number of stored sessions, including stale ones not yet reclaimed.
    pub async fn count(&self) -> usize {
        self.shared.sessions.lock().await.len()
    }

    /// Drops every session, expired or not.
    pub async fn clear(&self) {
        self.shared.sessions.lock().await.clear();
    }

    /// Removes every expired session now. Returns how many were removed.
    pub async fn sweep_expired(&self) -> usize {
        self.shared.sweep().await
    }
}

impl Drop for SessionStore {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_sweeper(shared: Weak<Shared>, period: std::time::Duration) {
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let Some(shared) = shared.upgrade() else {
            break;
        };
        let removed = shared.sweep().await;
        if removed > 0 {
            tracing::info!(removed, "swept expired sessions");
        }
    }
}
