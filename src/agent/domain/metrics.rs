//! Per-agent execution metrics.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Cumulative execution counters for one agent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentMetrics {
    executions: u64,
    total_time: Duration,
    error_count: u64,
}

impl AgentMetrics {
    /// Creates an empty metrics block.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            executions: 0,
            total_time: Duration::ZERO,
            error_count: 0,
        }
    }

    /// Records one execution.
    pub fn record(&mut self, elapsed: Duration, succeeded: bool) {
        self.executions = self.executions.saturating_add(1);
        self.total_time = self.total_time.saturating_add(elapsed);
        if !succeeded {
            self.error_count = self.error_count.saturating_add(1);
        }
    }

    /// Returns the number of executions.
    #[must_use]
    pub const fn executions(&self) -> u64 {
        self.executions
    }

    /// Returns the cumulative execution time.
    #[must_use]
    pub const fn total_time(&self) -> Duration {
        self.total_time
    }

    /// Returns the number of failed executions.
    #[must_use]
    pub const fn error_count(&self) -> u64 {
        self.error_count
    }

    /// Returns the mean execution time, or `None` before the first execution.
    #[must_use]
    pub fn average_response_time(&self) -> Option<Duration> {
        average(self.total_time, self.executions)
    }
}

/// Divides a total duration by a count, at nanosecond precision.
pub(crate) fn average(total: Duration, count: u64) -> Option<Duration> {
    let nanos = total.as_nanos().checked_div(u128::from(count))?;
    Some(Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_accumulates_counters() {
        let mut metrics = AgentMetrics::new();
        metrics.record(Duration::from_millis(30), true);
        metrics.record(Duration::from_millis(10), false);

        assert_eq!(metrics.executions(), 2);
        assert_eq!(metrics.error_count(), 1);
        assert_eq!(metrics.total_time(), Duration::from_millis(40));
        assert_eq!(
            metrics.average_response_time(),
            Some(Duration::from_millis(20))
        );
    }

    #[test]
    fn average_is_undefined_without_executions() {
        assert_eq!(AgentMetrics::new().average_response_time(), None);
    }
}
