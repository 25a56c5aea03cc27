use chrono::{Datelike, Days, Months, NaiveDate};

use crate::models::Period;

/// Inclusive calendar range a limit is measured over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PeriodWindow {
    pub(crate) start: NaiveDate,
    pub(crate) end: NaiveDate,
}

#[cfg(test)]
impl PeriodWindow {
    pub(crate) fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub(crate) fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

impl std::fmt::Display for PeriodWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Calendar window of `period` that contains `today`.
///
/// Weeks run Monday to Sunday. Near the ends of the representable date
/// range the bounds saturate at `NaiveDate::MIN`/`MAX`.
pub(crate) fn window(period: Period, today: NaiveDate) -> PeriodWindow {
    match period {
        Period::Week => {
            let back = u64::from(today.weekday().num_days_from_monday());
            let start = today.checked_sub_days(Days::new(back)).unwrap_or(NaiveDate::MIN);
            let end = start.checked_add_days(Days::new(6)).unwrap_or(NaiveDate::MAX);
            PeriodWindow { start, end }
        }
        Period::Month => {
            let start = today
                .checked_sub_days(Days::new(u64::from(today.day0())))
                .unwrap_or(NaiveDate::MIN);
            let end = start
                .checked_add_months(Months::new(1))
                .and_then(|next| next.pred_opt())
                .unwrap_or(NaiveDate::MAX);
            PeriodWindow { start, end }
        }
        Period::Year => {
            let start = NaiveDate::from_yo_opt(today.year(), 1).unwrap_or(NaiveDate::MIN);
            let end = NaiveDate::from_ymd_opt(today.year(), 12, 31).unwrap_or(NaiveDate::MAX);
            PeriodWindow { start, end }
        }
    }
}
