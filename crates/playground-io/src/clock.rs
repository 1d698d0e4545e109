//! Timer facility used by the debouncer.
//!
//! The browser clock wraps `setTimeout`. `TestClock` keeps virtual time that
//! only advances when asked to, so timer behavior is deterministic in tests.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::rc::{Rc, Weak};
use std::time::Duration;

use crate::Error;

/// Schedules one-shot callbacks.
pub trait Clock {
    /// Run `callback` once after `delay`, unless the returned `Timeout` is
    /// dropped first.
    fn set_timeout(&self, delay: Duration, callback: Box<dyn FnOnce()>) -> Result<Timeout, Error>;
}

/// A scheduled callback. Dropping it cancels the callback if it has not fired.
pub struct Timeout {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Timeout {
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }
}

impl Drop for Timeout {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for Timeout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Timeout").finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TimerEntry {
    fire_at_ms: u64,
    id: u64,
}

impl PartialOrd for TimerEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimerEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap: earliest deadline first, then registration order
        other
            .fire_at_ms
            .cmp(&self.fire_at_ms)
            .then_with(|| other.id.cmp(&self.id))
    }
}

#[derive(Default)]
struct TestClockInner {
    current_time_ms: u64,
    next_id: u64,
    deadlines: BinaryHeap<TimerEntry>,
    callbacks: HashMap<u64, Box<dyn FnOnce()>>,
}

/// Virtual time clock for testing.
///
/// Time only moves on `advance_by()`. Clones share the same timeline.
#[derive(Clone, Default)]
pub struct TestClock {
    inner: Rc<RefCell<TestClockInner>>,
}

impl TestClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time in milliseconds.
    pub fn now_ms(&self) -> u64 {
        self.inner.borrow().current_time_ms
    }

    /// Advance virtual time and run every callback that comes due, in deadline
    /// order. Callbacks may schedule new timers; those fire too if they come
    /// due within the same advance.
    ///
    /// Returns how many callbacks ran.
    pub fn advance_by(&self, ms: u64) -> usize {
        let target_time = self.now_ms() + ms;
        let mut fired = 0;

        loop {
            let callback = {
                let mut inner = self.inner.borrow_mut();
                match inner.deadlines.peek() {
                    Some(entry) if entry.fire_at_ms <= target_time => {
                        let entry = *entry;
                        inner.deadlines.pop();
                        inner.current_time_ms = entry.fire_at_ms;
                        inner.callbacks.remove(&entry.id)
                    }
                    _ => break,
                }
            };
            // Cancelled timers leave a stale deadline with no callback
            if let Some(callback) = callback {
                callback();
                fired += 1;
            }
        }

        self.inner.borrow_mut().current_time_ms = target_time;
        fired
    }

    /// Number of timers that are scheduled and not cancelled.
    pub fn pending_timers(&self) -> usize {
        self.inner.borrow().callbacks.len()
    }

    /// Time until the next live timer fires.
    pub fn time_to_next_timer(&self) -> Option<u64> {
        let inner = self.inner.borrow();
        inner
            .deadlines
            .iter()
            .filter(|entry| inner.callbacks.contains_key(&entry.id))
            .map(|entry| entry.fire_at_ms.saturating_sub(inner.current_time_ms))
            .min()
    }

    fn cancel(inner: &Weak<RefCell<TestClockInner>>, id: u64) {
        if let Some(inner) = inner.upgrade() {
            inner.borrow_mut().callbacks.remove(&id);
        }
    }
}

impl Clock for TestClock {
    fn set_timeout(&self, delay: Duration, callback: Box<dyn FnOnce()>) -> Result<Timeout, Error> {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        let fire_at_ms = inner.current_time_ms + delay.as_millis() as u64;
        inner.deadlines.push(TimerEntry { fire_at_ms, id });
        inner.callbacks.insert(id, callback);

        let weak = Rc::downgrade(&self.inner);
        Ok(Timeout::new(move || TestClock::cancel(&weak, id)))
    }
}
