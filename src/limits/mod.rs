//! Spending-limit engine: period windows, limit validation, evaluation of
//! spend against each limit, and once-per-session overspend alerts.

mod error;
mod evaluator;
mod ledger;
mod notify;
mod period;
mod scheduler;
mod store;

pub(crate) use error::{LimitError, LimitResult};
pub(crate) use evaluator::{LimitEvaluator, LimitStatus, Tier};
pub(crate) use ledger::Ledger;
pub(crate) use notify::{LimitAlert, NotificationSink, NotificationState, TracingSink};
pub(crate) use period::{window, PeriodWindow};
pub(crate) use scheduler::{RefreshScheduler, DEFAULT_DEBOUNCE};
pub(crate) use store::LimitStore;



#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod scheduler_tests;
