use anyhow::anyhow;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;

use super::{
    window, LimitAlert, LimitResult, LimitStore, Ledger, NotificationSink, NotificationState,
    PeriodWindow,
};
use crate::models::{Limit, Period};

/// Usage band of a limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Tier {
    Normal,
    Warning,
    Exceeded,
}

impl Tier {
    /// `ratio` is spent / limit: exceeded from 1.0, warning from 0.7.
    pub(crate) fn classify(ratio: Decimal) -> Self {
        if ratio >= Decimal::ONE {
            Self::Exceeded
        } else if ratio >= Decimal::new(7, 1) {
            Self::Warning
        } else {
            Self::Normal
        }
    }

    pub(crate) fn label(&self) -> &'static str {
        match self {
            Self::Normal => "OK",
            Self::Warning => "Warning",
            Self::Exceeded => "Exceeded",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One evaluated limit, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LimitStatus {
    pub(crate) limit_id: i64,
    pub(crate) category_id: i64,
    pub(crate) category_name: String,
    pub(crate) limit_amount: Decimal,
    pub(crate) spent: Decimal,
    pub(crate) remaining: Decimal,
    pub(crate) usage_ratio: Decimal,
    pub(crate) tier: Tier,
    pub(crate) period: Period,
    pub(crate) window: PeriodWindow,
}

impl LimitStatus {
    pub(crate) fn usage_percent(&self) -> Decimal {
        self.usage_ratio
            .checked_mul(Decimal::ONE_HUNDRED)
            .unwrap_or(Decimal::MAX)
            .round_dp(1)
    }

    fn is_overspent(&self) -> bool {
        self.tier == Tier::Exceeded && self.remaining <= Decimal::ZERO
    }
}

/// Evaluates limits and owns the session's record of alerts already shown.
#[derive(Debug, Default)]
pub(crate) struct LimitEvaluator {
    notified: NotificationState,
}

impl LimitEvaluator {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Resume a session with alerts already shown.
    #[cfg(test)]
    pub(crate) fn with_state(notified: NotificationState) -> Self {
        Self { notified }
    }

    pub(crate) fn state(&self) -> &NotificationState {
        &self.notified
    }

    /// Statuses for every limit of the profile, in store order.
    ///
    /// Either every row is computed or the call fails; alerts are sent and
    /// recorded only after all rows succeeded.
    pub(crate) fn evaluate<L, S>(
        &mut self,
        ledger: &L,
        sink: &mut S,
        profile_id: i64,
        category_id: Option<i64>,
        today: NaiveDate,
    ) -> LimitResult<Vec<LimitStatus>>
    where
        L: Ledger + ?Sized,
        S: NotificationSink + ?Sized,
    {
        let limits = ledger.list_limits(profile_id, category_id)?;
        let statuses = limits
            .iter()
            .map(|limit| status_of(ledger, limit, today))
            .collect::<LimitResult<Vec<_>>>()?;

        for status in statuses.iter().filter(|s| s.is_overspent()) {
            if !self.notified.mark(status.limit_id) {
                continue;
            }
            let alert = LimitAlert {
                limit_id: status.limit_id,
                category_name: status.category_name.clone(),
                period: status.period,
                remaining: status.remaining,
            };
            sink.notify(&alert);
        }

        debug!(profile_id, rows = statuses.len(), %today, "limits evaluated");
        Ok(statuses)
    }

    /// Deletes a limit and drops it from the alerted set.
    pub(crate) fn delete_limit(
        &mut self,
        store: &LimitStore<'_>,
        profile_id: i64,
        limit_id: i64,
    ) -> LimitResult<bool> {
        let deleted = store.delete(profile_id, limit_id)?;
        self.notified.forget(limit_id);
        Ok(deleted)
    }
}

fn status_of<L: Ledger + ?Sized>(
    ledger: &L,
    limit: &Limit,
    today: NaiveDate,
) -> LimitResult<LimitStatus> {
    let window = window(limit.period, today);
    let spent = ledger.total_spent(limit.profile_id, limit.category_id, window.start, window.end)?;
    let category_name = ledger.category_name(limit.category_id)?.ok_or_else(|| {
        anyhow!(
            "limit {} references missing category {}",
            limit.id,
            limit.category_id
        )
    })?;

    let remaining = limit.amount - spent;
    // Saturates when spending dwarfs a tiny cap.
    let usage_ratio = if limit.amount > Decimal::ZERO {
        spent.checked_div(limit.amount).unwrap_or(Decimal::MAX)
    } else {
        Decimal::ZERO
    };

    Ok(LimitStatus {
        limit_id: limit.id,
        category_id: limit.category_id,
        category_name,
        limit_amount: limit.amount,
        spent,
        remaining,
        usage_ratio,
        tier: Tier::classify(usage_ratio),
        period: limit.period,
        window,
    })
}
