use chrono::{DateTime, Utc};
use std::future::Future;
use std::time::Duration;

/// Time abstraction for testability
///
/// Quest windows and streak days are derived from `now_utc`, so tests pin it
/// with [`FixedClock`] instead of reading the wall clock.
pub trait Clock: Send + Sync {
    /// Get the current UTC datetime
    fn now_utc(&self) -> DateTime<Utc>;

    /// Sleep for a duration (async)
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// Real clock implementation using system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Clock frozen at a single instant; sleeping returns immediately
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now_utc(&self) -> DateTime<Utc> {
        self.0
    }

    async fn sleep(&self, _duration: Duration) {}
}
