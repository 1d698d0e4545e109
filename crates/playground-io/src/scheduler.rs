//! Debounce for high-frequency `input` events.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use crate::Error;
use crate::clock::{Clock, Timeout};

/// Quiet period after the last raw input event before a commit is dispatched.
pub const QUIET_PERIOD: Duration = Duration::from_millis(300);

/// Coalesces bursts of calls into one action after a quiet period.
///
/// Every `schedule` cancels the pending action and starts a new quiet period,
/// so at most one action is pending at a time.
pub struct Debouncer {
    clock: Rc<dyn Clock>,
    quiet_period: Duration,
    pending: RefCell<Option<Timeout>>,
    armed: Rc<Cell<bool>>,
}

impl Debouncer {
    pub fn new(clock: Rc<dyn Clock>, quiet_period: Duration) -> Self {
        Self {
            clock,
            quiet_period,
            pending: RefCell::new(None),
            armed: Rc::new(Cell::new(false)),
        }
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet_period
    }

    /// Replace any pending action with `action`, due after the quiet period.
    pub fn schedule(&self, action: impl FnOnce() + 'static) -> Result<(), Error> {
        self.cancel();

        let armed = self.armed.clone();
        let timeout = self.clock.set_timeout(
            self.quiet_period,
            Box::new(move || {
                armed.set(false);
                action();
            }),
        )?;
        // A fired timeout stays here until the next schedule or cancel drops it;
        // dropping it from inside its own callback is not allowed on every clock.
        self.pending.replace(Some(timeout));
        self.armed.set(true);
        Ok(())
    }

    /// Cancel the pending action. Returns whether one was pending.
    pub fn cancel(&self) -> bool {
        let was_pending = self.armed.replace(false);
        drop(self.pending.take());
        was_pending
    }

    pub fn is_pending(&self) -> bool {
        self.armed.get()
    }
}

impl std::fmt::Debug for Debouncer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Debouncer")
            .field("quiet_period", &self.quiet_period)
            .field("pending", &self.is_pending())
            .finish()
    }
}
