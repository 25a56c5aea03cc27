use std::time::{Duration, Instant};

pub(crate) const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Single-slot debounce for refresh requests.
///
/// Every `request` bumps the generation and replaces whatever was pending,
/// pushing the due time out again. Only the latest request is ever handed
/// out, once `delay` has passed without a newer one.
#[derive(Debug)]
pub(crate) struct RefreshScheduler<T> {
    delay: Duration,
    generation: u64,
    pending: Option<Pending<T>>,
}

#[derive(Debug)]
struct Pending<T> {
    generation: u64,
    due: Instant,
    request: T,
}

/// A request whose quiet period has elapsed.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Due<T> {
    pub(crate) generation: u64,
    pub(crate) request: T,
}

impl<T> RefreshScheduler<T> {
    pub(crate) fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: 0,
            pending: None,
        }
    }

    #[cfg(test)]
    pub(crate) fn delay(&self) -> Duration {
        self.delay
    }

    /// Generation of the most recent request, pending or not.
    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Queue `request`, superseding any pending one. Returns its generation.
    pub(crate) fn request(&mut self, request: T, now: Instant) -> u64 {
        self.generation = self.generation.wrapping_add(1);
        let due = now.checked_add(self.delay).unwrap_or(now);
        self.pending = Some(Pending {
            generation: self.generation,
            due,
            request,
        });
        self.generation
    }

    /// How long the caller may sleep before the pending request is due.
    /// `None` when nothing is pending.
    pub(crate) fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.pending
            .as_ref()
            .map(|p| p.due.saturating_duration_since(now))
    }

    pub(crate) fn take_due(&mut self, now: Instant) -> Option<Due<T>> {
        let ready = self.pending.as_ref().is_some_and(|p| p.due <= now);
        if ready {
            self.pending.take().map(Pending::into_due)
        } else {
            None
        }
    }

    /// Hand out the pending request immediately, ignoring the delay.
    pub(crate) fn flush(&mut self) -> Option<Due<T>> {
        self.pending.take().map(Pending::into_due)
    }
}

impl<T> Pending<T> {
    fn into_due(self) -> Due<T> {
        Due {
            generation: self.generation,
            request: self.request,
        }
    }
}
