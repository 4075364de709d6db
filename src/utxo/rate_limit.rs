use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

use crate::clock::{from_millis, to_millis, Clock};
use crate::error::{Result, WalletError};
use crate::storage::{KeyValueStore, CALL_COUNT, LAST_CALL_RESET};

/// Length of the quota window, measured from the persisted reset time
pub const RATE_LIMIT_WINDOW_HOURS: i64 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitCounter {
    pub call_count: u32,
    /// Start of the current window; `None` before the first call
    pub window_start: Option<DateTime<Utc>>,
}

impl RateLimitCounter {
    pub fn resets_at(&self) -> Option<DateTime<Utc>> {
        self.window_start.map(|start| start + window())
    }
}

/// Daily call quota for the UTXO indexer, persisted in the store.
///
/// `try_acquire` is a read-increment-write; callers serialise it.
pub struct RateLimiter {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    quota: u32,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>, quota: u32) -> Self {
        Self {
            store,
            clock,
            quota,
        }
    }

    pub fn quota(&self) -> u32 {
        self.quota
    }

    /// Counter as persisted, without applying the window
    pub fn load(&self) -> Result<RateLimitCounter> {
        let call_count = self
            .store
            .get(CALL_COUNT)?
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or(0);
        let window_start = self
            .store
            .get(LAST_CALL_RESET)?
            .and_then(|raw| raw.trim().parse().ok())
            .and_then(from_millis);

        Ok(RateLimitCounter {
            call_count,
            window_start,
        })
    }

    /// Counter for the window containing now; zero once the window elapsed
    pub fn current(&self) -> Result<RateLimitCounter> {
        let counter = self.load()?;
        let now = self.clock.now();
        match counter.window_start {
            Some(start) if now - start < window() => Ok(counter),
            _ => Ok(RateLimitCounter {
                call_count: 0,
                window_start: Some(now),
            }),
        }
    }

    pub fn remaining(&self) -> Result<u32> {
        Ok(self.quota.saturating_sub(self.current()?.call_count))
    }

    /// Spend one call, or fail with `RateLimitExceeded` without spending
    pub fn try_acquire(&self) -> Result<RateLimitCounter> {
        let mut counter = self.current()?;

        if counter.call_count >= self.quota {
            let resets_at = counter
                .resets_at()
                .unwrap_or_else(|| self.clock.now() + window());
            log::warn!(
                "UTXO indexer quota of {} calls exhausted until {}",
                self.quota,
                resets_at
            );
            return Err(WalletError::RateLimitExceeded {
                quota: self.quota,
                resets_at,
            });
        }

        counter.call_count += 1;
        let window_start = counter.window_start.unwrap_or_else(|| self.clock.now());
        self.store.set_many(&[
            (CALL_COUNT, counter.call_count.to_string()),
            (LAST_CALL_RESET, to_millis(window_start).to_string()),
        ])?;

        log::debug!(
            "UTXO indexer call {}/{} in current window",
            counter.call_count,
            self.quota
        );
        Ok(counter)
    }
}

fn window() -> Duration {
    Duration::hours(RATE_LIMIT_WINDOW_HOURS)
}
