//! Per-key cooldown tracking.
//!
//! One primitive serves two purposes: throttling users (key = `channel:sender`,
//! cooldown in tens of seconds) and pacing outbound calls (key = upstream
//! service name, cooldown in milliseconds). A second, windowed primitive caps
//! how many grants a key may receive per window (the translation upstream's
//! per-minute quota).

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Key used to pace catalog upstream calls.
pub const CATALOG_SERVICE: &str = "catalog-service";
/// Key used to pace translation upstream calls.
pub const TRANSLATION_SERVICE: &str = "translation-service";
/// Key used for the translation upstream's per-minute quota.
pub const TRANSLATION_QUOTA: &str = "translation-quota";

/// Upper bound on sleep-and-recheck rounds inside [`RateLimiter::pace`].
const MAX_PACE_ATTEMPTS: u32 = 3;

/// Result of an acquisition attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acquire {
    /// The action is permitted and has been recorded.
    Granted,
    /// The key is cooling down for this much longer. Nothing was recorded.
    Wait(Duration),
}

/// Tracks the last permitted action per key.
#[derive(Debug, Default)]
pub struct RateLimiter {
    last_granted: Mutex<HashMap<String, Instant>>,
    /// Grant times inside the current window, oldest first.
    windows: Mutex<HashMap<String, VecDeque<Instant>>>,
    /// Fair async locks that serialize `pace` waiters per key in arrival order.
    queues: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant and record now if `key` is not cooling down.
    pub fn try_acquire(&self, key: &str, cooldown: Duration) -> bool {
        self.check(key, cooldown) == Acquire::Granted
    }

    /// Atomic check-and-set against the current time.
    pub fn check(&self, key: &str, cooldown: Duration) -> Acquire {
        self.check_at(key, cooldown, Instant::now())
    }

    /// Atomic check-and-set against a caller-supplied instant.
    pub fn check_at(&self, key: &str, cooldown: Duration, now: Instant) -> Acquire {
        let mut map = self
            .last_granted
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(last) = map.get(key) {
            let elapsed = now.saturating_duration_since(*last);
            if elapsed < cooldown {
                return Acquire::Wait(cooldown - elapsed);
            }
        }
        map.insert(key.to_string(), now);
        Acquire::Granted
    }

    /// Grant and record now if `key` has had fewer than `limit` grants in
    /// the trailing `window`. A `limit` of zero means unlimited.
    pub fn check_quota(&self, key: &str, limit: u32, window: Duration) -> Acquire {
        self.check_quota_at(key, limit, window, Instant::now())
    }

    /// Windowed check-and-set against a caller-supplied instant.
    pub fn check_quota_at(
        &self,
        key: &str,
        limit: u32,
        window: Duration,
        now: Instant,
    ) -> Acquire {
        if limit == 0 {
            return Acquire::Granted;
        }
        let mut map = self
            .windows
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let grants = map.entry(key.to_string()).or_default();
        while grants
            .front()
            .is_some_and(|t| now.saturating_duration_since(*t) >= window)
        {
            grants.pop_front();
        }
        if grants.len() >= limit as usize {
            if let Some(oldest) = grants.front() {
                return Acquire::Wait(window - now.saturating_duration_since(*oldest));
            }
        }
        grants.push_back(now);
        Acquire::Granted
    }

    /// Wait until `key` can be acquired, then acquire it.
    ///
    /// Waiters on the same key are served in arrival order. Returns the total
    /// time spent sleeping. After a bounded number of rounds the grant is
    /// recorded regardless so callers are never stuck.
    pub async fn pace(&self, key: &str, cooldown: Duration) -> Duration {
        self.wait_turn(key, || self.check(key, cooldown), || {
            self.last_granted
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .insert(key.to_string(), Instant::now());
        })
        .await
    }

    /// Wait until `key` has quota left in the trailing `window`, then take one.
    ///
    /// Same ordering and bounded-rounds guarantees as [`RateLimiter::pace`].
    pub async fn pace_quota(&self, key: &str, limit: u32, window: Duration) -> Duration {
        self.wait_turn(key, || self.check_quota(key, limit, window), || {
            self.windows
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .entry(key.to_string())
                .or_default()
                .push_back(Instant::now());
        })
        .await
    }

    async fn wait_turn<C, F>(&self, key: &str, check: C, force: F) -> Duration
    where
        C: Fn() -> Acquire,
        F: FnOnce(),
    {
        let queue = self.queue_for(key);
        let _turn = queue.lock().await;

        let mut waited = Duration::ZERO;
        for _ in 0..MAX_PACE_ATTEMPTS {
            match check() {
                Acquire::Granted => {
                    if !waited.is_zero() {
                        debug!("paced {key} for {}ms", waited.as_millis());
                    }
                    return waited;
                }
                Acquire::Wait(remaining) => {
                    tokio::time::sleep(remaining).await;
                    waited += remaining;
                }
            }
        }

        warn!("pacing {key}: still cooling down after {MAX_PACE_ATTEMPTS} rounds, proceeding");
        force();
        waited
    }

    fn queue_for(&self, key: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut queues = self
            .queues
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        queues
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }
}
