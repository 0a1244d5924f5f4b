use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerState {
    Disarmed,
    /// Armed, first tick fires on the next poll.
    Pending,
    Due(Instant),
}

/// Periodic sweep deadline. Owned by the tracker; the host polls it from its tick.
///
/// Disarming is immediate: once `disarm` returns, no poll fires until the next `arm`.
#[derive(Debug, Clone)]
pub struct SweepTimer {
    period: Duration,
    state: TimerState,
}

impl SweepTimer {
    #[inline]
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            state: TimerState::Disarmed,
        }
    }

    /// No-op when already armed.
    #[inline]
    pub fn arm(&mut self) {
        if self.state == TimerState::Disarmed {
            self.state = TimerState::Pending;
        }
    }

    #[inline]
    pub fn disarm(&mut self) {
        self.state = TimerState::Disarmed;
    }

    #[inline]
    pub fn is_armed(&self) -> bool {
        self.state != TimerState::Disarmed
    }

    #[inline]
    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn next_deadline(&self, now: Instant) -> Option<Instant> {
        match self.state {
            TimerState::Disarmed => None,
            TimerState::Pending => Some(now),
            TimerState::Due(at) => Some(at),
        }
    }

    /// True when a sweep is due; the next one is then scheduled one period after `now`.
    pub fn poll(&mut self, now: Instant) -> bool {
        let fire = match self.state {
            TimerState::Disarmed => false,
            TimerState::Pending => true,
            TimerState::Due(at) => now >= at,
        };
        if fire {
            self.state = TimerState::Due(now + self.period);
        }
        fire
    }
}
