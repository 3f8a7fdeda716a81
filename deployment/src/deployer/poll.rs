use std::{thread, time::Duration};

use figment::{providers::Serialized, Figment};
use serde::Deserialize;

use crate::{config::ConfigurationError, DeployError};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        PollPolicy {
            interval: Duration::from_secs(2),
            max_attempts: 30,
        }
    }
}

#[derive(Deserialize)]
struct PollingConfig {
    interval_ms: u64,
    max_attempts: u32,
}

impl PollPolicy {
    pub fn configure(figment: &Figment) -> Result<Self, ConfigurationError> {
        let config: PollingConfig = figment.extract_inner("polling")?;
        Ok(PollPolicy {
            interval: Duration::from_millis(config.interval_ms),
            max_attempts: config.max_attempts,
        })
    }

    pub fn figment_default_values() -> Figment {
        Figment::from(Serialized::default(
            "polling",
            serde_json::json!({
                "interval_ms": 2000,
                "max_attempts": 30
            }),
        ))
    }
}

pub enum PollStatus<T> {
    Pending,
    Ready(T),
    Failed(String),
}

/// `check` gets the 1-based attempt number. No sleep after the final attempt.
pub fn poll<T>(
    policy: &PollPolicy,
    mut check: impl FnMut(u32) -> Result<PollStatus<T>, DeployError>,
) -> Result<T, DeployError> {
    for attempt in 1..=policy.max_attempts {
        match check(attempt)? {
            PollStatus::Ready(value) => return Ok(value),
            PollStatus::Failed(reason) => return Err(DeployError::BuildFailed(reason)),
            PollStatus::Pending => {}
        }
        if attempt < policy.max_attempts {
            thread::sleep(policy.interval);
        }
    }
    warn!("Gave up polling after {} attempts", policy.max_attempts);
    Err(DeployError::Timeout {
        attempts: policy.max_attempts,
    })
}
