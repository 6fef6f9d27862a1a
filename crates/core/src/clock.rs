//! Round clock: a per-click countdown and an optional periodic reshuffle timer.
//!
//! The clock is driven by simulated time. Callers hand it a target instant via
//! [`RoundClock::poll`] and receive fired events one at a time, in time order.
//! A disarmed timer is removed outright, so it can never produce a pending tick.

use std::time::Duration;
use tracing::trace;

const SECOND: Duration = Duration::from_secs(1);
const MIN_PERIOD: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

impl TimerHandle {
    pub fn id(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockEvent {
    /// Countdown decremented; `remaining` is always at least 1.
    Tick { handle: TimerHandle, remaining: u32 },
    /// Countdown reached zero. Raised once; the countdown is gone afterwards.
    Expired { handle: TimerHandle },
    Reshuffle { handle: TimerHandle },
}

#[derive(Debug, Clone)]
struct Countdown {
    handle: TimerHandle,
    remaining: u32,
    due: Duration,
}

#[derive(Debug, Clone)]
struct Interval {
    handle: TimerHandle,
    period: Duration,
    due: Duration,
}

#[derive(Debug, Clone, Default)]
pub struct RoundClock {
    now: Duration,
    next_id: u64,
    countdown: Option<Countdown>,
    reshuffle: Option<Interval>,
}

impl RoundClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    /// Replaces any armed countdown. A zero-second countdown expires on the
    /// next poll.
    pub fn arm_countdown(&mut self, seconds: u32) -> TimerHandle {
        self.disarm_countdown();
        let handle = self.allocate();
        let due = if seconds == 0 {
            self.now
        } else {
            self.now + SECOND
        };
        self.countdown = Some(Countdown {
            handle,
            remaining: seconds,
            due,
        });
        trace!(handle = handle.0, seconds, "countdown armed");
        handle
    }

    /// Replaces any armed reshuffle timer.
    pub fn arm_reshuffle(&mut self, period: Duration) -> TimerHandle {
        self.disarm_reshuffle();
        let handle = self.allocate();
        let period = period.max(MIN_PERIOD);
        self.reshuffle = Some(Interval {
            handle,
            period,
            due: self.now + period,
        });
        trace!(handle = handle.0, ?period, "reshuffle armed");
        handle
    }

    /// Returns whether a countdown was armed. Safe to call repeatedly.
    pub fn disarm_countdown(&mut self) -> bool {
        match self.countdown.take() {
            Some(countdown) => {
                trace!(handle = countdown.handle.0, "countdown disarmed");
                true
            }
            None => false,
        }
    }

    /// Returns whether a reshuffle timer was armed. Safe to call repeatedly.
    pub fn disarm_reshuffle(&mut self) -> bool {
        match self.reshuffle.take() {
            Some(interval) => {
                trace!(handle = interval.handle.0, "reshuffle disarmed");
                true
            }
            None => false,
        }
    }

    pub fn disarm_all(&mut self) {
        self.disarm_countdown();
        self.disarm_reshuffle();
    }

    pub fn countdown_handle(&self) -> Option<TimerHandle> {
        self.countdown.as_ref().map(|countdown| countdown.handle)
    }

    pub fn reshuffle_handle(&self) -> Option<TimerHandle> {
        self.reshuffle.as_ref().map(|interval| interval.handle)
    }

    pub fn remaining(&self) -> Option<u32> {
        self.countdown.as_ref().map(|countdown| countdown.remaining)
    }

    pub fn is_live(&self, handle: TimerHandle) -> bool {
        self.countdown_handle() == Some(handle) || self.reshuffle_handle() == Some(handle)
    }

    pub fn is_idle(&self) -> bool {
        self.countdown.is_none() && self.reshuffle.is_none()
    }

    /// Fires the earliest timer due at or before `until`, moving the clock to
    /// its due time. When nothing is due the clock settles at `until` and
    /// `None` is returned. On an exact tie the countdown fires first.
    pub fn poll(&mut self, until: Duration) -> Option<ClockEvent> {
        let countdown_due = self
            .countdown
            .as_ref()
            .map(|countdown| countdown.due)
            .filter(|due| *due <= until);
        let reshuffle_due = self
            .reshuffle
            .as_ref()
            .map(|interval| interval.due)
            .filter(|due| *due <= until);

        match (countdown_due, reshuffle_due) {
            (Some(countdown), Some(reshuffle)) if reshuffle < countdown => self.fire_reshuffle(),
            (Some(_), _) => self.fire_countdown(),
            (None, Some(_)) => self.fire_reshuffle(),
            (None, None) => {
                self.now = self.now.max(until);
                None
            }
        }
    }

    fn fire_countdown(&mut self) -> Option<ClockEvent> {
        let countdown = self.countdown.as_mut()?;
        self.now = self.now.max(countdown.due);
        let handle = countdown.handle;
        if countdown.remaining <= 1 {
            self.countdown = None;
            trace!(handle = handle.0, "countdown expired");
            return Some(ClockEvent::Expired { handle });
        }
        countdown.remaining -= 1;
        countdown.due += SECOND;
        Some(ClockEvent::Tick {
            handle,
            remaining: countdown.remaining,
        })
    }

    fn fire_reshuffle(&mut self) -> Option<ClockEvent> {
        let interval = self.reshuffle.as_mut()?;
        self.now = self.now.max(interval.due);
        interval.due += interval.period;
        Some(ClockEvent::Reshuffle {
            handle: interval.handle,
        })
    }

    fn allocate(&mut self) -> TimerHandle {
        self.next_id += 1;
        TimerHandle(self.next_id)
    }
}
