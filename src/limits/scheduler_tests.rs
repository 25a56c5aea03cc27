#![allow(clippy::unwrap_used)]

use std::time::{Duration, Instant};

use super::scheduler::*;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

#[test]
fn test_nothing_pending_initially() {
    let mut s: RefreshScheduler<&str> = RefreshScheduler::new(DEFAULT_DEBOUNCE);
    let now = Instant::now();
    assert!(!s.is_pending());
    assert_eq!(s.time_until_due(now), None);
    assert_eq!(s.take_due(now), None);
    assert_eq!(s.generation(), 0);
}

#[test]
fn test_request_fires_after_delay() {
    let mut s = RefreshScheduler::new(ms(300));
    let t0 = Instant::now();
    let generation = s.request("txn added", t0);

    assert_eq!(s.time_until_due(t0), Some(ms(300)));
    assert_eq!(s.take_due(t0 + ms(299)), None);
    assert!(s.is_pending());

    let due = s.take_due(t0 + ms(300)).unwrap();
    assert_eq!(due.generation, generation);
    assert_eq!(due.request, "txn added");
    assert!(!s.is_pending());
    assert_eq!(s.take_due(t0 + ms(900)), None);
}

#[test]
fn test_burst_collapses_to_last_request() {
    let mut s = RefreshScheduler::new(ms(300));
    let t0 = Instant::now();
    for i in 0..10u64 {
        s.request(i, t0 + ms(i * 100));
    }
    // Last request at t0+900ms, so nothing is due until t0+1200ms
    assert_eq!(s.take_due(t0 + ms(1100)), None);
    assert_eq!(s.time_until_due(t0 + ms(1100)), Some(ms(100)));

    let due = s.take_due(t0 + ms(1200)).unwrap();
    assert_eq!(due.request, 9);
    assert_eq!(due.generation, 10);
    assert_eq!(s.take_due(t0 + ms(5000)), None);
}

#[test]
fn test_overdue_reports_zero_wait() {
    let mut s = RefreshScheduler::new(ms(300));
    let t0 = Instant::now();
    s.request((), t0);
    assert_eq!(s.time_until_due(t0 + ms(1000)), Some(Duration::ZERO));
}

#[test]
fn test_flush_ignores_delay() {
    let mut s = RefreshScheduler::new(ms(300));
    let t0 = Instant::now();
    s.request("manual", t0);
    let due = s.flush().unwrap();
    assert_eq!(due.request, "manual");
    assert!(s.flush().is_none());
}

#[test]
fn test_zero_delay_is_due_immediately() {
    let mut s = RefreshScheduler::new(Duration::ZERO);
    let t0 = Instant::now();
    s.request(1, t0);
    assert_eq!(s.delay(), Duration::ZERO);
    assert!(s.take_due(t0).is_some());
}
