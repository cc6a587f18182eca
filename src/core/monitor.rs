//! Idle monitor: declares a timeout once the pipe has been quiet too long

use crate::core::{ActivityClock, Outcome, ResultSlot};
use crossbeam::channel::{self, select};
use std::sync::Arc;
use std::time::Duration;

/// Wakes once per idle interval and compares the time since the last
/// activity against that interval.
///
/// Activity is polled, not pushed, so a stall is detected between one and two
/// intervals after the last chunk moved.
pub(crate) struct IdleMonitor {
    idle_timeout: Duration,
    clock: Arc<ActivityClock>,
    slot: Arc<ResultSlot>,
}

impl IdleMonitor {
    pub(crate) fn new(
        idle_timeout: Duration,
        clock: Arc<ActivityClock>,
        slot: Arc<ResultSlot>,
    ) -> Self {
        Self {
            idle_timeout,
            clock,
            slot,
        }
    }

    /// Tick until a timeout is declared or the copy loop finishes first
    pub(crate) fn run(self) {
        let ticker = channel::tick(self.idle_timeout);
        let finished = self.slot.finished();

        loop {
            select! {
                recv(ticker) -> _ => {
                    let idle = self.clock.idle();
                    if idle >= self.idle_timeout {
                        tracing::debug!("No activity for {:?}, declaring timeout", idle);
                        self.slot.deliver(Outcome::Timeout { idle: self.idle_timeout });
                        return;
                    }
                    tracing::trace!("Idle for {:?}", idle);
                }
                recv(finished) -> _ => {
                    tracing::trace!("Idle monitor stopping, pipe already finished");
                    return;
                }
            }
        }
    }
}
