//! Recently analysed profiles, most recent first.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::warn;

use super::KeyValueStore;
use crate::github::Profile;

pub const HISTORY_KEY: &str = "github-extractor-history";
pub const MAX_HISTORY: usize = 10;

/// Drops any entry for the same login, prepends `profile` and truncates.
pub fn with_added(mut history: Vec<Profile>, profile: Profile) -> Vec<Profile> {
    history.retain(|p| p.login != profile.login);
    history.insert(0, profile);
    history.truncate(MAX_HISTORY);
    history
}

pub fn without_login(mut history: Vec<Profile>, login: &str) -> Vec<Profile> {
    history.retain(|p| p.login != login);
    history
}

/// Every operation returns the resulting list even when the backing store fails;
/// persistence problems are only logged.
pub struct HistoryStore {
    store: Arc<dyn KeyValueStore>,
    writes: Mutex<()>,
}

impl HistoryStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            writes: Mutex::new(()),
        }
    }

    pub async fn list(&self) -> Vec<Profile> {
        let raw = match self.store.get(HISTORY_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("Failed to load history: {e:#}");
                return Vec::new();
            }
        };
        match serde_json::from_str::<Vec<Profile>>(&raw) {
            Ok(history) => history,
            Err(e) => {
                warn!("Stored history is unreadable, treating it as empty: {e}");
                Vec::new()
            }
        }
    }

    pub async fn add(&self, profile: Profile) -> Vec<Profile> {
        let _guard = self.writes.lock().await;
        let history = with_added(self.list().await, profile);
        self.persist(&history).await;
        history
    }

    pub async fn remove(&self, login: &str) -> Vec<Profile> {
        let _guard = self.writes.lock().await;
        let history = without_login(self.list().await, login);
        self.persist(&history).await;
        history
    }

    pub async fn clear(&self) {
        let _guard = self.writes.lock().await;
        if let Err(e) = self.store.delete(HISTORY_KEY).await {
            warn!("Failed to clear history: {e:#}");
        }
    }

    async fn persist(&self, history: &[Profile]) {
        let encoded = match serde_json::to_string(history) {
            Ok(encoded) => encoded,
            Err(e) => {
                warn!("Failed to encode history: {e}");
                return;
            }
        };
        if let Err(e) = self.store.set(HISTORY_KEY, &encoded).await {
            warn!("Failed to save history: {e:#}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::FileStore;
    use crate::testing::{profile_fixture, FailingStore, MemoryStore};

    fn logins(history: &[Profile]) -> Vec<&str> {
        history.iter().map(|p| p.login.as_str()).collect()
    }

    #[test]
    fn test_add_moves_existing_login_to_front() {
        let history = vec![profile_fixture("a", 0), profile_fixture("b", 0)];
        let history = with_added(history, profile_fixture("b", 5));
        assert_eq!(logins(&history), vec!["b", "a"]);
        assert_eq!(history[0].public_repos, 5);
    }

    #[test]
    fn test_add_truncates_to_ten() {
        let history = (0..10).fold(Vec::new(), |h, i| {
            with_added(h, profile_fixture(&format!("user{i}"), 0))
        });
        let history = with_added(history, profile_fixture("newest", 0));
        assert_eq!(history.len(), MAX_HISTORY);
        assert_eq!(history[0].login, "newest");
        assert!(!logins(&history).contains(&"user0"));
    }

    #[tokio::test]
    async fn test_history_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let first = HistoryStore::new(Arc::new(FileStore::new(dir.path())));
        first.add(profile_fixture("octocat", 8)).await;
        first.add(profile_fixture("torvalds", 6)).await;

        let second = HistoryStore::new(Arc::new(FileStore::new(dir.path())));
        assert_eq!(logins(&second.list().await), vec!["torvalds", "octocat"]);

        second.remove("octocat").await;
        assert_eq!(logins(&first.list().await), vec!["torvalds"]);

        second.clear().await;
        assert!(first.list().await.is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_history_reads_as_empty() {
        let store = Arc::new(MemoryStore::default());
        store.set(HISTORY_KEY, "{not json").await.unwrap();
        let history = HistoryStore::new(store);

        assert!(history.list().await.is_empty());
        let after = history.add(profile_fixture("octocat", 1)).await;
        assert_eq!(logins(&after), vec!["octocat"]);
    }

    #[tokio::test]
    async fn test_failing_store_still_returns_result() {
        let history = HistoryStore::new(Arc::new(FailingStore));

        let after = history.add(profile_fixture("octocat", 1)).await;
        assert_eq!(logins(&after), vec!["octocat"]);
        assert!(history.list().await.is_empty());
        history.clear().await;
    }

    #[tokio::test]
    async fn test_concurrent_adds_are_not_lost() {
        let history = Arc::new(HistoryStore::new(Arc::new(MemoryStore::default())));
        let tasks: Vec<_> = (0..5)
            .map(|i| {
                let history = history.clone();
                tokio::spawn(async move { history.add(profile_fixture(&format!("u{i}"), 0)).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }
        assert_eq!(history.list().await.len(), 5);
    }
}
