//! Pacing between consecutive store queries.

use parking_lot::Mutex;
use std::time::{Duration, Instant};

/// Default pause between historical windows.
pub const DEFAULT_WINDOW_DELAY: Duration = Duration::from_millis(100);

/// Decides how long to wait before the next query.
///
/// Called by the historical fetch between windows, never before the first
/// or after the last.
pub trait Throttle: Send + Sync {
    fn wait(&self);
}

/// Sleep a fixed amount every time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedDelay(pub Duration);

impl Default for FixedDelay {
    fn default() -> Self {
        FixedDelay(DEFAULT_WINDOW_DELAY)
    }
}

impl Throttle for FixedDelay {
    fn wait(&self) {
        if !self.0.is_zero() {
            std::thread::sleep(self.0);
        }
    }
}

/// Never waits.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

impl Throttle for NoDelay {
    fn wait(&self) {}
}

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

/// Allows bursts of up to `capacity` queries, refilled at a steady rate.
#[derive(Debug)]
pub struct TokenBucket {
    capacity: f64,
    refill_per_sec: f64,
    bucket: Mutex<Bucket>,
}

impl TokenBucket {
    /// A non-positive refill rate is treated as one token per second.
    pub fn new(capacity: u32, refill_per_sec: f64) -> Self {
        let capacity = f64::from(capacity.max(1));
        let refill_per_sec = if refill_per_sec > 0.0 {
            refill_per_sec
        } else {
            1.0
        };
        Self {
            capacity,
            refill_per_sec,
            bucket: Mutex::new(Bucket {
                tokens: capacity,
                last_refill: Instant::now(),
            }),
        }
    }

    /// Take a token if one is available, otherwise report how long until one is.
    fn try_acquire(&self) -> Result<(), Duration> {
        let mut bucket = self.bucket.lock();
        let now = Instant::now();
        let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.refill_per_sec).min(self.capacity);
        bucket.last_refill = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            Ok(())
        } else {
            let missing = 1.0 - bucket.tokens;
            Err(Duration::from_secs_f64(missing / self.refill_per_sec))
        }
    }

    pub fn available(&self) -> f64 {
        self.bucket.lock().tokens
    }
}

impl Throttle for TokenBucket {
    fn wait(&self) {
        // Lock is released inside try_acquire before sleeping.
        while let Err(delay) = self.try_acquire() {
            std::thread::sleep(delay);
        }
    }
}
