use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local};
use tokio::time::Instant;

/// Source of wall-clock time for usage accounting. Waiting always goes through tokio's timer so
/// that paused-time tests drive every loop, only the wall clock differs between implementations.
#[async_trait]
pub trait Clock: Sync + Send + 'static {
    /// Local time, day keys and export names are derived from it.
    fn time(&self) -> DateTime<Local>;

    fn instant(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    async fn sleep_until(&self, deadline: Instant) {
        tokio::time::sleep_until(deadline).await;
    }
}

/// The system's local clock.
pub struct DefaultClock;

impl Clock for DefaultClock {
    fn time(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Clock that follows tokio's (possibly paused) time from a fixed wall-clock start.
#[cfg(test)]
#[derive(Clone)]
pub struct TestClock {
    pub start_time: DateTime<Local>,
    pub reference: Instant,
}

#[cfg(test)]
impl TestClock {
    pub fn starting_at(start_time: DateTime<Local>) -> Self {
        Self {
            start_time,
            reference: Instant::now(),
        }
    }
}

#[cfg(test)]
impl Clock for TestClock {
    fn time(&self) -> DateTime<Local> {
        self.start_time + self.reference.elapsed()
    }
}
