//! System clock and RNG adapters.

use chrono::{DateTime, Utc};
use rand::Rng;
use uuid::Uuid;

use super::ports::{ClockPort, RandomPort};

/// Wall-clock time.
pub struct SystemClock;

impl ClockPort for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Thread-local RNG.
pub struct SystemRandom;

impl RandomPort for SystemRandom {
    fn gen_index(&self, upper: usize) -> usize {
        rand::thread_rng().gen_range(0..upper)
    }

    fn gen_uuid(&self) -> Uuid {
        Uuid::new_v4()
    }
}
