use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

use crate::analyst::ChatSession;
use crate::dashboard::state::{reduce, Event, Snapshot, ViewState};
use crate::errors::AppError;

/// One dashboard: its view state and its chat.
#[derive(Debug)]
pub struct Session {
    pub view: ViewState,
    pub chat: ChatSession,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            view: ViewState::default(),
            chat: ChatSession::general(),
        }
    }
}

impl Session {
    /// Applies one event. Returns false when the event was a stale result and
    /// was discarded.
    ///
    /// A newly loaded profile gets a fresh chat grounded on it; a reset falls
    /// back to the general assistant.
    pub fn apply(&mut self, event: Event) -> bool {
        if !self.view.is_current(&event) {
            debug!("Discarding stale dashboard event");
            return false;
        }

        let chat = match &event {
            Event::ProfileLoaded { bundle, .. } => {
                Some(ChatSession::for_profile(&bundle.profile, &bundle.repos))
            }
            Event::Reset => Some(ChatSession::general()),
            _ => None,
        };

        self.view = reduce(std::mem::take(&mut self.view), event);
        if let Some(chat) = chat {
            self.chat = chat;
        }
        true
    }

    pub fn snapshot(&self) -> Snapshot {
        self.view.snapshot(self.chat.transcript())
    }
}

pub type SharedSession = Arc<Mutex<Session>>;

/// Sessions untouched for this long are dropped by the sweeper.
pub const SESSION_IDLE_TTL: Duration = Duration::from_secs(60 * 60);
pub const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

struct Entry {
    session: SharedSession,
    last_seen: Instant,
}

/// Live dashboard sessions, in memory only. Every lookup refreshes the
/// session's `last_seen`; idle ones are evicted by `evict_idle`.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, Entry>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self) -> (Uuid, SharedSession) {
        let id = Uuid::new_v4();
        let session = Arc::new(Mutex::new(Session::default()));
        self.sessions.write().await.insert(
            id,
            Entry {
                session: session.clone(),
                last_seen: Instant::now(),
            },
        );
        (id, session)
    }

    pub async fn get(&self, id: Uuid) -> Result<SharedSession, AppError> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))?;
        entry.last_seen = Instant::now();
        Ok(entry.session.clone())
    }

    pub async fn remove(&self, id: Uuid) -> Result<(), AppError> {
        self.sessions
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))
    }

    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drops every session idle for `max_idle` or longer. Returns how many went.
    /// A request already holding one of them finishes against its own handle.
    pub async fn evict_idle(&self, max_idle: Duration) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| now.duration_since(entry.last_seen) < max_idle);
        before - sessions.len()
    }

    /// Runs `evict_idle` every `every` for the life of the process.
    pub fn spawn_sweeper(self: Arc<Self>, max_idle: Duration, every: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                let evicted = self.evict_idle(max_idle).await;
                if evicted > 0 {
                    info!(
                        "Evicted {evicted} idle dashboard sessions, {} still live",
                        self.count().await
                    );
                }
            }
        })
    }
}
