use ludo_core::TURN_LIMIT;
use std::time::Duration;
use std::time::Instant;

/// Tracks the wall-clock budget of the current turn.
///
/// Restarted whenever the cursor moves; shifted forward by the pause
/// duration on resume so paused time never counts against a player.
#[derive(Clone, Copy, Debug)]
pub struct TurnClock {
    limit: Duration,
    started: Instant,
}

impl TurnClock {
    pub fn new(limit: Duration) -> Self {
        Self {
            limit,
            started: Instant::now(),
        }
    }
    pub fn with_defaults() -> Self {
        Self::new(TURN_LIMIT)
    }
    pub fn restart(&mut self) {
        self.started = Instant::now();
    }
    /// Pushes the start forward by the time spent paused.
    pub fn shift(&mut self, paused: Duration) {
        self.started += paused;
    }
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
    pub fn expired(&self) -> bool {
        self.elapsed() > self.limit
    }
    pub fn remaining(&self) -> Duration {
        self.limit.saturating_sub(self.elapsed())
    }
    pub fn limit(&self) -> Duration {
        self.limit
    }
    pub fn set_limit(&mut self, limit: Duration) {
        self.limit = limit;
    }
}

impl Default for TurnClock {
    fn default() -> Self {
        Self::with_defaults()
    }
}
