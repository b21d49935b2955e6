//! Wait-for-ready policy.

use std::time::Duration;

use crate::model::Attr;

/// Seconds between readiness queries when `interval` is not set.
pub const DEFAULT_INTERVAL_SECS: u64 = 30;
/// Seconds before waiting gives up when `timeout` is not set.
pub const DEFAULT_TIMEOUT_SECS: u64 = 600;

/// Resolved wait settings for one create call.
///
/// Defaults: `wait = false`, `interval = 30s`, `timeout = 600s`, no failure
/// labels (a failing resource is polled until the timeout).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitPolicy {
    pub wait: bool,
    pub interval: Duration,
    pub timeout: Duration,
    /// Statuses that end the wait with an error instead of polling on.
    pub failure_labels: Vec<String>,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            wait: false,
            interval: Duration::from_secs(DEFAULT_INTERVAL_SECS),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            failure_labels: Vec::new(),
        }
    }
}

impl WaitPolicy {
    /// Build from the policy attributes of a desired state; null or unknown
    /// attributes take the defaults.
    pub fn from_attrs(wait: &Attr<bool>, interval: &Attr<u64>, timeout: &Attr<u64>) -> Self {
        let defaults = Self::default();
        Self {
            wait: wait.value().copied().unwrap_or(defaults.wait),
            interval: interval
                .value()
                .map(|secs| Duration::from_secs(*secs))
                .unwrap_or(defaults.interval),
            timeout: timeout
                .value()
                .map(|secs| Duration::from_secs(*secs))
                .unwrap_or(defaults.timeout),
            failure_labels: defaults.failure_labels,
        }
    }

    pub fn with_failure_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.failure_labels = labels.into_iter().map(Into::into).collect();
        self
    }

    /// Store the resolved values back into the policy attributes.
    pub fn write_back(&self, wait: &mut Attr<bool>, interval: &mut Attr<u64>, timeout: &mut Attr<u64>) {
        *wait = self.wait.into();
        *interval = self.interval.as_secs().into();
        *timeout = self.timeout.as_secs().into();
    }

    pub fn is_failure(&self, status: &str) -> bool {
        self.failure_labels.iter().any(|label| label == status)
    }
}
