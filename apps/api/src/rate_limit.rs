//! Token-bucket limiter for calls to the external completion service.
//!
//! Both pipelines await `acquire` before every LLM call, which keeps the
//! request rate under the provider budget without burying sleeps inside
//! business logic. The bucket starts full, so short bursts up to the
//! per-minute budget go through immediately.

use tokio::sync::Mutex;
use tokio::time::{sleep, Duration, Instant};

pub struct RateLimiter {
    capacity: f64,
    refill_per_sec: f64,
    state: Mutex<Bucket>,
}

struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

impl RateLimiter {
    /// Builds a limiter for a requests-per-minute budget. `rpm` is clamped
    /// to at least 1 so a misconfigured budget can never stall forever.
    pub fn per_minute(rpm: u32) -> Self {
        let rpm = rpm.max(1) as f64;
        Self {
            capacity: rpm,
            refill_per_sec: rpm / 60.0,
            state: Mutex::new(Bucket {
                tokens: rpm,
                last_refill: Instant::now(),
            }),
        }
    }

    /// Waits until a token is available, then consumes it.
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut bucket = self.state.lock().await;
                let now = Instant::now();
                let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
                bucket.tokens = (bucket.tokens + elapsed * self.refill_per_sec).min(self.capacity);
                bucket.last_refill = now;

                if bucket.tokens >= 1.0 {
                    bucket.tokens -= 1.0;
                    return;
                }
                Duration::from_secs_f64((1.0 - bucket.tokens) / self.refill_per_sec)
            };
            sleep(wait).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_burst_within_capacity_is_immediate() {
        let limiter = RateLimiter::per_minute(5);
        let start = Instant::now();
        for _ in 0..5 {
            limiter.acquire().await;
        }
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_bucket_waits_for_refill() {
        let limiter = RateLimiter::per_minute(15);
        for _ in 0..15 {
            limiter.acquire().await;
        }
        let start = Instant::now();
        limiter.acquire().await;
        // 15 rpm refills one token every 4 seconds.
        let waited = start.elapsed();
        assert!(waited >= Duration::from_secs(4), "waited {waited:?}");
        assert!(waited < Duration::from_secs(5), "waited {waited:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_rpm_is_clamped_to_one() {
        let limiter = RateLimiter::per_minute(0);
        limiter.acquire().await; // must not hang
    }
}
