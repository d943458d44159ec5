use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Spaces request starts by a fixed minimum interval. Shared by every clone,
/// so concurrent probe tasks still respect one delay per target.
#[derive(Clone)]
pub struct RateLimiter {
    interval: Duration,
    last_request: Arc<Mutex<Option<Instant>>>,
}

impl RateLimiter {
    /// delay_ms = minimum gap between two paced requests
    pub fn from_delay_ms(delay_ms: u64) -> Self {
        Self {
            interval: Duration::from_millis(delay_ms),
            last_request: Arc::new(Mutex::new(None)),
        }
    }

    pub async fn wait(&self) {
        if self.interval.is_zero() {
            return;
        }

        let mut last = self.last_request.lock().await;
        let wait_for = match *last {
            Some(at) => self.interval.saturating_sub(at.elapsed()),
            None => self.interval,
        };

        if !wait_for.is_zero() {
            tokio::time::sleep(wait_for).await;
        }

        *last = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_request_is_delayed() {
        let limiter = RateLimiter::from_delay_ms(30);
        let start = Instant::now();
        limiter.wait().await;
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[tokio::test]
    async fn test_consecutive_requests_are_spaced() {
        let limiter = RateLimiter::from_delay_ms(20);
        let start = Instant::now();
        limiter.wait().await;
        limiter.wait().await;
        limiter.wait().await;
        assert!(start.elapsed() >= Duration::from_millis(60));
    }

    #[tokio::test]
    async fn test_zero_delay_never_sleeps() {
        let limiter = RateLimiter::from_delay_ms(0);
        let start = Instant::now();
        for _ in 0..10 {
            limiter.wait().await;
        }
        assert!(start.elapsed() < Duration::from_millis(50));
    }
}
