use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};

/// Minimum spacing between successive calls to one upstream
///
/// Shared by reference: every worker of a pass waits on the same gate, so
/// raising concurrency never raises the request rate.
#[derive(Debug)]
pub struct Pacer {
    spacing: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl Pacer {
    pub fn new(spacing: Duration) -> Self {
        Self {
            spacing,
            last_request: Mutex::new(None),
        }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    pub fn spacing(&self) -> Duration {
        self.spacing
    }

    /// Calculates the time until the next request can be made
    ///
    /// Returns None if a request can be made now, or the duration to wait otherwise.
    pub fn time_until_next_request(&self, last: Option<Instant>, now: Instant) -> Option<Duration> {
        if let Some(last) = last {
            let elapsed = now.duration_since(last);
            if elapsed < self.spacing {
                return Some(self.spacing - elapsed);
            }
        }
        None
    }

    /// Waits for this caller's slot
    ///
    /// The lock is held across the sleep so waiters are released one spacing apart.
    pub async fn ready(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(wait) = self.time_until_next_request(*last, Instant::now()) {
            sleep(wait).await;
        }
        *last = Some(Instant::now());
    }
}
