//! Polled deadline timers
//!
//! No callbacks: the owner stores the timer, reschedules it on input and
//! calls `fire(now)` from its tick. Time is milliseconds on the caller's clock.

/// A single pending deadline carrying a payload.
///
/// Scheduling again replaces both deadline and payload, so timers never stack.
#[derive(Debug, Clone)]
pub struct DeadlineTimer<T> {
    pending: Option<(u64, T)>,
}

impl<T> Default for DeadlineTimer<T> {
    fn default() -> Self {
        Self { pending: None }
    }
}

impl<T> DeadlineTimer<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, now: u64, delay_ms: u64, payload: T) {
        self.pending = Some((now.saturating_add(delay_ms), payload));
    }

    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(_, payload)| payload)
    }

    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    /// Take the payload if the deadline has passed
    pub fn fire(&mut self, now: u64) -> Option<T> {
        match self.pending {
            Some((at, _)) if now >= at => self.cancel(),
            _ => None,
        }
    }
}
