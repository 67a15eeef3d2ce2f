//! Fixed-window generation quotas.
//!
//! Two independent caches guard the generate endpoint: one keyed by
//! user id, one by source IP. Admission is checked (without consuming)
//! before request validation, and consumed exactly once per admitted
//! request. Admissions are never refunded; a failed generation still
//! counts.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::warn;

/// Maximum number of keys tracked per cache.
const MAX_QUOTA_ENTRIES: usize = 10_000;

/// Default quota window.
const DEFAULT_WINDOW: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    started_at: Instant,
}

/// Keyed fixed-window counter with peek and admit operations.
pub struct QuotaCache {
    windows: RwLock<HashMap<String, Window>>,
    limit: u32,
    window: Duration,
}

impl QuotaCache {
    /// Cache with an hourly window.
    pub fn new(limit: u32) -> Self {
        Self::with_window(limit, DEFAULT_WINDOW)
    }

    pub fn with_window(limit: u32, window: Duration) -> Self {
        Self {
            windows: RwLock::new(HashMap::new()),
            limit,
            window,
        }
    }

    /// Whether the key is already at its limit. Does not consume.
    pub async fn is_limited(&self, key: &str) -> bool {
        let windows = self.windows.read().await;
        match windows.get(key) {
            Some(w) if w.started_at.elapsed() < self.window => w.count >= self.limit,
            _ => false,
        }
    }

    /// Consume one admission for the key.
    ///
    /// Returns false when the key is over its limit for the current
    /// window; the counter is only advanced on admission.
    pub async fn admit(&self, key: &str) -> bool {
        let mut windows = self.windows.write().await;

        if windows.len() >= MAX_QUOTA_ENTRIES && !windows.contains_key(key) {
            Self::evict_expired(&mut windows, self.window);
        }

        let now = Instant::now();
        let window = windows.entry(key.to_string()).or_insert(Window {
            count: 0,
            started_at: now,
        });

        // Stale window: start a fresh one.
        if now.duration_since(window.started_at) >= self.window {
            window.count = 0;
            window.started_at = now;
        }

        if window.count >= self.limit {
            return false;
        }
        window.count += 1;
        true
    }

    fn evict_expired(windows: &mut HashMap<String, Window>, ttl: Duration) {
        let before = windows.len();
        windows.retain(|_, w| w.started_at.elapsed() < ttl);
        if windows.len() == before {
            // Every window is live; drop the oldest to bound memory.
            if let Some(oldest) = windows
                .iter()
                .min_by_key(|(_, w)| w.started_at)
                .map(|(k, _)| k.clone())
            {
                windows.remove(&oldest);
            }
            warn!("Quota cache at capacity with no expired windows");
        }
    }
}
