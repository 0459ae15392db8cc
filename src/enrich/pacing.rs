use std::time::{Duration, Instant};
use tracing::trace;

/// Blocking wait. Injected so tests can observe waits without sleeping.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Enforces a minimum interval between consecutive remote calls.
#[derive(Debug)]
pub struct RateGate {
    min_interval: Duration,
    last_call: Option<Instant>,
}

impl RateGate {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_call: None,
        }
    }

    /// Sleeps for whatever remains of the interval, then records the call.
    pub fn wait(&mut self, sleeper: &dyn Sleeper) {
        if let Some(remaining) = self.remaining() {
            trace!(wait_ms = remaining.as_millis() as u64, "rate gate");
            sleeper.sleep(remaining);
        }
        self.last_call = Some(Instant::now());
    }

    fn remaining(&self) -> Option<Duration> {
        let last = self.last_call?;
        let remaining = self.min_interval.checked_sub(last.elapsed())?;
        (!remaining.is_zero()).then_some(remaining)
    }
}
