//! Validated runtime configuration for each service.
//!
//! The binary fills these from command-line flags and `LOANFLOW_*`
//! environment variables; the library only ever sees checked values.

use crate::error::{LoanError, Result};
use std::time::Duration;

pub const DEFAULT_THRESHOLD: u64 = 10_000;
pub const DEFAULT_PERIOD: Duration = Duration::from_millis(1000);
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

pub const DEFAULT_NAMES: &[&str] = &[
    "Donald", "Theresa", "Vladimir", "Angela", "Emmanuel", "Shinzō", "Jacinda", "Kim",
];

pub const DEFAULT_AMOUNTS: &[u64] = &[
    1_000,
    10_000,
    100_000,
    1_000_000,
    10_000_000,
    100_000_000,
];

#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub names: Vec<String>,
    pub amounts: Vec<u64>,
    pub period: Duration,
}

impl GeneratorConfig {
    pub fn new(names: Vec<String>, amounts: Vec<u64>, period: Duration) -> Result<Self> {
        if names.is_empty() {
            return Err(LoanError::Config("at least one name is required".into()));
        }
        if amounts.is_empty() {
            return Err(LoanError::Config("at least one amount is required".into()));
        }
        if amounts.contains(&0) {
            return Err(LoanError::Config("amounts must be positive".into()));
        }
        if period.is_zero() {
            return Err(LoanError::Config("period must be non-zero".into()));
        }
        Ok(Self {
            names,
            amounts,
            period,
        })
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            names: DEFAULT_NAMES.iter().map(|n| n.to_string()).collect(),
            amounts: DEFAULT_AMOUNTS.to_vec(),
            period: DEFAULT_PERIOD,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CheckerConfig {
    /// Amounts strictly above this value are declined.
    pub threshold: u64,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SinkConfig {
    pub history_capacity: usize,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BrokerConfig {
    pub queue_capacity: usize,
}

impl BrokerConfig {
    pub fn new(queue_capacity: usize) -> Result<Self> {
        // tokio's bounded mpsc panics on a zero capacity
        if queue_capacity == 0 {
            return Err(LoanError::Config("queue capacity must be non-zero".into()));
        }
        Ok(Self { queue_capacity })
    }
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}
