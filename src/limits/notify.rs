use std::collections::HashSet;

use rust_decimal::Decimal;
use tracing::warn;

use crate::models::Period;

/// Raised the first time a limit is found overspent in a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LimitAlert {
    pub(crate) limit_id: i64,
    pub(crate) category_name: String,
    pub(crate) period: Period,
    pub(crate) remaining: Decimal,
}

impl std::fmt::Display for LimitAlert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Limit for '{}' ({}) exceeded! Remaining: {:.2}",
            self.category_name, self.period, self.remaining
        )
    }
}

/// Where overspend alerts are delivered.
pub(crate) trait NotificationSink {
    fn notify(&mut self, alert: &LimitAlert);
}

impl NotificationSink for Vec<LimitAlert> {
    fn notify(&mut self, alert: &LimitAlert) {
        self.push(alert.clone());
    }
}

/// Sink that only records the alert in the log.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&mut self, alert: &LimitAlert) {
        warn!(
            limit_id = alert.limit_id,
            category = %alert.category_name,
            period = alert.period.as_str(),
            remaining = %alert.remaining,
            "spending limit exceeded"
        );
    }
}

/// Sends every alert to both sinks.
impl<A: NotificationSink, B: NotificationSink> NotificationSink for (A, B) {
    fn notify(&mut self, alert: &LimitAlert) {
        self.0.notify(alert);
        self.1.notify(alert);
    }
}

/// Limit ids already alerted on in this session.
///
/// An id leaves the set only when its limit is deleted; spending dropping
/// back under the cap does not re-arm the alert.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct NotificationState {
    notified: HashSet<i64>,
}

impl NotificationState {
    #[cfg(test)]
    pub(crate) fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, limit_id: i64) -> bool {
        self.notified.contains(&limit_id)
    }

    /// Returns `true` if the id was not yet recorded.
    pub(crate) fn mark(&mut self, limit_id: i64) -> bool {
        self.notified.insert(limit_id)
    }

    pub(crate) fn forget(&mut self, limit_id: i64) -> bool {
        self.notified.remove(&limit_id)
    }

    pub(crate) fn len(&self) -> usize {
        self.notified.len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.notified.is_empty()
    }
}
