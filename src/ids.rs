//! Id generation for forms and fields
//!
//! Ids are millisecond timestamps rendered as decimal strings by default.
//! One generator never hands out the same id twice: when the clock has not
//! advanced since the previous id, the next id is the previous one plus one.

use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How new ids are produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdStrategy {
    /// Millisecond wall-clock timestamp, strictly increasing per generator
    #[default]
    Timestamp,
    /// Random v4 UUID
    Uuid,
}

impl IdStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdStrategy::Timestamp => "timestamp",
            IdStrategy::Uuid => "uuid",
        }
    }
}

impl fmt::Display for IdStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Produces ids for new fields and forms
#[derive(Debug)]
pub struct IdGenerator {
    strategy: IdStrategy,
    last_millis: AtomicI64,
}

impl IdGenerator {
    pub fn new(strategy: IdStrategy) -> Self {
        Self {
            strategy,
            last_millis: AtomicI64::new(i64::MIN),
        }
    }

    pub fn strategy(&self) -> IdStrategy {
        self.strategy
    }

    /// Returns a fresh id
    pub fn next_id(&self) -> String {
        match self.strategy {
            IdStrategy::Timestamp => self.next_timestamp(Utc::now().timestamp_millis()).to_string(),
            IdStrategy::Uuid => Uuid::new_v4().to_string(),
        }
    }

    fn next_timestamp(&self, now_millis: i64) -> i64 {
        let mut current = self.last_millis.load(Ordering::Relaxed);
        loop {
            let next = if now_millis > current { now_millis } else { current + 1 };
            match self.last_millis.compare_exchange_weak(
                current,
                next,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return next,
                Err(actual) => current = actual,
            }
        }
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new(IdStrategy::default())
    }
}
