use crate::domain::TimerState;
use chrono::{DateTime, Duration, Utc};

/// Countdown for one focus session.
///
/// Remaining time is derived from wall-clock timestamps rather than counted
/// ticks: `remaining = duration - (accumulated + (now - started_at))`. A
/// suspended process therefore catches up on the next tick instead of drifting.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionTimer {
    state: TimerState,
    duration: Duration,
    /// Time spent running in spans that have been paused
    accumulated: Duration,
    /// Start of the current running span
    started_at: Option<DateTime<Utc>>,
}

impl Default for SessionTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionTimer {
    pub fn new() -> Self {
        Self {
            state: TimerState::Idle,
            duration: Duration::zero(),
            accumulated: Duration::zero(),
            started_at: None,
        }
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Configure the countdown; it waits for an explicit start
    pub fn arm(&mut self, duration: Duration) {
        self.state = TimerState::Armed;
        self.duration = duration.max(Duration::zero());
        self.accumulated = Duration::zero();
        self.started_at = None;
    }

    /// Start an armed timer
    pub fn start(&mut self, now: DateTime<Utc>) -> bool {
        if self.state != TimerState::Armed {
            return false;
        }
        self.state = TimerState::Running;
        self.started_at = Some(now);
        true
    }

    /// Pause a running timer and bank the running span
    pub fn pause(&mut self, now: DateTime<Utc>) -> bool {
        if self.state != TimerState::Running {
            return false;
        }
        self.accumulated = self.elapsed(now);
        self.started_at = None;
        self.state = TimerState::Paused;
        true
    }

    pub fn resume(&mut self, now: DateTime<Utc>) -> bool {
        if self.state != TimerState::Paused {
            return false;
        }
        self.started_at = Some(now);
        self.state = TimerState::Running;
        true
    }

    /// Start, pause or resume depending on the current state
    pub fn toggle(&mut self, now: DateTime<Utc>) -> bool {
        match self.state {
            TimerState::Armed => self.start(now),
            TimerState::Running => self.pause(now),
            TimerState::Paused => self.resume(now),
            TimerState::Idle | TimerState::Completed => false,
        }
    }

    /// Total running time, never more than the configured duration
    pub fn elapsed(&self, now: DateTime<Utc>) -> Duration {
        let span = match self.started_at {
            Some(started) => (now - started).max(Duration::zero()),
            None => Duration::zero(),
        };
        (self.accumulated + span).min(self.duration)
    }

    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        match self.state {
            TimerState::Idle => Duration::zero(),
            TimerState::Completed => Duration::zero(),
            _ => self.duration - self.elapsed(now),
        }
    }

    /// Fraction of the session already spent (0.0 to 1.0)
    pub fn progress(&self, now: DateTime<Utc>) -> f64 {
        if self.state == TimerState::Completed {
            return 1.0;
        }
        let total = self.duration.num_milliseconds();
        if total <= 0 {
            return 0.0;
        }
        self.elapsed(now).num_milliseconds() as f64 / total as f64
    }

    /// Check if a running countdown has reached zero
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.state == TimerState::Running && self.remaining(now) <= Duration::zero()
    }

    /// Stop the countdown and mark it finished
    pub fn complete(&mut self, now: DateTime<Utc>) -> bool {
        if !self.state.is_active() {
            return false;
        }
        self.accumulated = self.elapsed(now);
        self.started_at = None;
        self.state = TimerState::Completed;
        true
    }

    /// Discard the countdown
    pub fn cancel(&mut self) {
        *self = Self::new();
    }
}
