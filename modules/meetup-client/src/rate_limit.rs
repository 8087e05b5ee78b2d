use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};

/// Default spacing between successive member-groups lookups.
pub const DEFAULT_MEMBER_GROUPS_INTERVAL: Duration = Duration::from_millis(50);

/// Fixed-interval gate. The first call passes immediately; every later call
/// waits until `interval` has elapsed since the previous call was let through.
#[derive(Debug)]
pub struct RateGate {
    interval: Duration,
    last: Mutex<Option<Instant>>,
}

impl RateGate {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: Mutex::new(None),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait for this caller's turn.
    pub async fn wait(&self) {
        let mut last = self.last.lock().await;
        if let Some(prev) = *last {
            let ready_at = prev + self.interval;
            if ready_at > Instant::now() {
                tracing::trace!(interval_ms = self.interval.as_millis() as u64, "Rate gate holding");
                sleep_until(ready_at).await;
            }
        }
        *last = Some(Instant::now());
    }
}

impl Default for RateGate {
    fn default() -> Self {
        Self::new(DEFAULT_MEMBER_GROUPS_INTERVAL)
    }
}
