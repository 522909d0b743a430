//! Delayed-callback seam used for auto-clearing feedback messages.

use std::time::Duration;

/// Runs a callback once after a delay on the current thread.
pub trait Timer {
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>);
}

/// `setTimeout` via `gloo-timers`. Off-browser the task is dropped unrun.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserTimer;

impl Timer for BrowserTimer {
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) {
        #[cfg(feature = "hydrate")]
        {
            let millis = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);
            gloo_timers::callback::Timeout::new(millis, task).forget();
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (delay, task);
        }
    }
}
