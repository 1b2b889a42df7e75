//! In-memory revoked-token list with periodic garbage collection.
//!
//! Lookups take a read lock; only eviction takes the write lock. A token
//! found expired on the hot path is evicted lazily, one entry at a time;
//! a background task sweeps the whole map on an interval so entries that
//! are never looked up again cannot accumulate.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tokio::sync::Notify;

const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Tracks revoked tokens until their natural expiry.
///
/// Suitable for a single-instance API server; a multi-instance deployment
/// needs a shared store with TTL support instead.
pub struct RevocationList {
    tokens: Arc<RwLock<HashMap<String, DateTime<Utc>>>>,
    shutdown: Arc<Notify>,
}

impl RevocationList {
    /// Create the list and start the background sweep task.
    #[must_use]
    pub fn new() -> Self {
        Self::with_sweep_interval(SWEEP_INTERVAL)
    }

    #[must_use]
    pub fn with_sweep_interval(interval: Duration) -> Self {
        let tokens: Arc<RwLock<HashMap<String, DateTime<Utc>>>> =
            Arc::new(RwLock::new(HashMap::new()));
        let shutdown = Arc::new(Notify::new());

        let task_tokens = Arc::clone(&tokens);
        let task_shutdown = Arc::clone(&shutdown);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = task_shutdown.notified() => break,
                    _ = ticker.tick() => {
                        sweep(&task_tokens);
                    }
                }
            }
        });

        Self { tokens, shutdown }
    }

    /// Mark a token revoked until `expiry`.
    pub fn revoke(&self, token: &str, expiry: DateTime<Utc>) {
        self.tokens.write().insert(token.to_string(), expiry);
    }

    /// Whether the token is currently revoked. An entry found expired is
    /// removed on the spot.
    pub fn contains(&self, token: &str) -> bool {
        let now = Utc::now();

        // Fast path: read lock only
        {
            let tokens = self.tokens.read();
            match tokens.get(token) {
                None => return false,
                Some(expiry) if now < *expiry => return true,
                Some(_) => {}
            }
        }

        // Slow path: expired entry, evict under the write lock. Re-check:
        // the entry may have been replaced since the read lock dropped.
        let mut tokens = self.tokens.write();
        if let Some(expiry) = tokens.get(token) {
            if now >= *expiry {
                tokens.remove(token);
            } else {
                return true;
            }
        }

        false
    }

    /// Number of tracked entries, expired or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.read().is_empty()
    }

    /// Stop the background sweep task.
    pub fn stop(&self) {
        self.shutdown.notify_one();
    }
}

impl Default for RevocationList {
    fn default() -> Self {
        Self::new()
    }
}

fn sweep(tokens: &RwLock<HashMap<String, DateTime<Utc>>>) {
    let now = Utc::now();
    tokens.write().retain(|_, expiry| now < *expiry);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    #[tokio::test]
    async fn revoked_token_is_contained_until_expiry() {
        let list = RevocationList::new();
        list.revoke("tok", Utc::now() + ChronoDuration::minutes(5));

        assert!(list.contains("tok"));
        assert!(!list.contains("other"));
        list.stop();
    }

    #[tokio::test]
    async fn expired_token_is_lazily_evicted_on_lookup() {
        let list = RevocationList::new();
        list.revoke("tok", Utc::now() - ChronoDuration::seconds(1));
        assert_eq!(list.len(), 1);

        assert!(!list.contains("tok"));
        assert_eq!(list.len(), 0);
        list.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn sweep_purges_expired_entries_without_lookups() {
        let list = RevocationList::with_sweep_interval(Duration::from_secs(10));
        list.revoke("a", Utc::now() - ChronoDuration::seconds(1));
        list.revoke("b", Utc::now() + ChronoDuration::hours(1));

        // Let the interval fire under the paused clock
        tokio::time::sleep(Duration::from_secs(11)).await;
        tokio::task::yield_now().await;

        assert_eq!(list.len(), 1);
        assert!(list.contains("b"));
        list.stop();
    }

    #[tokio::test]
    async fn sweep_helper_retains_live_entries() {
        let tokens = RwLock::new(HashMap::new());
        tokens
            .write()
            .insert("dead".to_string(), Utc::now() - ChronoDuration::seconds(5));
        tokens
            .write()
            .insert("live".to_string(), Utc::now() + ChronoDuration::seconds(5));

        sweep(&tokens);

        let tokens = tokens.read();
        assert!(!tokens.contains_key("dead"));
        assert!(tokens.contains_key("live"));
    }
}
