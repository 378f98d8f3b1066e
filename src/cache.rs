//! Result cache collaborator.
//!
//! The engine only depends on the `get`/`set` contract; the in-memory TTL
//! implementation below is the default wiring. Keys are an order-independent
//! composite of sport, teams, and date, so `(a, b)` and `(b, a)` hit the
//! same entry.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

/// Key-value cache with per-entry TTL.
#[async_trait]
pub trait MatchupCache: Send + Sync {
    async fn get(&self, key: &str) -> Option<String>;
    async fn set(&self, key: &str, value: String, ttl: Duration);
}

/// Normalized composite cache key for a comparison.
pub fn comparison_key(sport: &str, team1: &str, team2: &str, date: Option<&str>) -> String {
    let mut teams = [
        team1.trim().to_lowercase(),
        team2.trim().to_lowercase(),
    ];
    teams.sort();
    format!(
        "compare:{}:{}:{}:{}",
        sport.trim().to_lowercase(),
        teams[0],
        teams[1],
        date.map(|d| d.trim().to_lowercase()).unwrap_or_else(|| "-".to_string())
    )
}

/// Thread-safe in-memory cache. Expired entries are skipped on read and
/// pruned opportunistically on write.
#[derive(Clone)]
pub struct MemoryCache {
    inner: Arc<RwLock<HashMap<String, Entry>>>,
}

struct Entry {
    value: String,
    expires_at: Instant,
}

impl MemoryCache {
    pub fn new() -> Self {
        MemoryCache {
            inner: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MatchupCache for MemoryCache {
    async fn get(&self, key: &str) -> Option<String> {
        let inner = self.inner.read().await;
        let entry = inner.get(key)?;
        if entry.expires_at <= Instant::now() {
            debug!(key, "cache entry expired");
            return None;
        }
        Some(entry.value.clone())
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) {
        let now = Instant::now();
        let mut inner = self.inner.write().await;
        inner.retain(|_, e| e.expires_at > now);
        inner.insert(
            key.to_string(),
            Entry {
                value,
                expires_at: now + ttl,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_order_independent() {
        let a = comparison_key("basketball", "Lakers", "Celtics", None);
        let b = comparison_key("basketball", "Celtics", "Lakers", None);
        assert_eq!(a, b);
    }

    #[test]
    fn key_normalizes_case_and_whitespace() {
        let a = comparison_key("Basketball", "  LAKERS ", "celtics", Some("2026-01-15"));
        let b = comparison_key("basketball", "lakers", "Celtics", Some("2026-01-15 "));
        assert_eq!(a, b);
    }

    #[test]
    fn date_distinguishes_entries() {
        let a = comparison_key("basketball", "a", "b", Some("2026-01-15"));
        let b = comparison_key("basketball", "a", "b", None);
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn set_then_get_round_trips() {
        let cache = MemoryCache::new();
        cache
            .set("k", "v".to_string(), Duration::from_secs(60))
            .await;
        assert_eq!(cache.get("k").await.as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn expired_entries_are_invisible() {
        let cache = MemoryCache::new();
        cache.set("k", "v".to_string(), Duration::ZERO).await;
        assert!(cache.get("k").await.is_none());
    }

    #[tokio::test]
    async fn last_writer_wins() {
        let cache = MemoryCache::new();
        cache
            .set("k", "old".to_string(), Duration::from_secs(60))
            .await;
        cache
            .set("k", "new".to_string(), Duration::from_secs(60))
            .await;
        assert_eq!(cache.get("k").await.as_deref(), Some("new"));
    }
}
