//! Round countdown and score

use serde::{Deserialize, Serialize};

/// Lifecycle of a single round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RoundPhase {
    /// Before the first start
    #[default]
    Idle,
    Running,
    /// Time ran out or the round was stopped
    Ended,
}

/// Owns `time_left`, `score` and the idle → running → ended transitions
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoundController {
    phase: RoundPhase,
    score: u32,
    time_left: u32,
    total_time: u32,
}

impl RoundController {
    pub fn new(total_time: u32) -> Self {
        Self {
            phase: RoundPhase::Idle,
            score: 0,
            time_left: total_time,
            total_time,
        }
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == RoundPhase::Running
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    /// Reset score and clock and enter `Running` (also from `Running`)
    pub fn start(&mut self) {
        self.score = 0;
        self.time_left = self.total_time;
        self.phase = RoundPhase::Running;
    }

    /// Back to `Idle` with a zero score and a full clock
    pub fn reset(&mut self) {
        *self = Self::new(self.total_time);
    }

    /// One countdown second. Returns true when this tick reached zero; the
    /// caller then ends the round before handling anything else.
    pub fn tick(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.time_left = self.time_left.saturating_sub(1);
        self.time_left == 0
    }

    /// Enter `Ended`. Only the first call of a round returns true.
    pub fn end(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.phase = RoundPhase::Ended;
        true
    }

    /// +1 for a good bubble, -1 (floored at zero) for a bad one.
    /// Returns the new score, or `None` outside a running round.
    pub fn apply_outcome(&mut self, is_good: bool) -> Option<u32> {
        if !self.is_running() {
            return None;
        }
        self.score = if is_good {
            self.score.saturating_add(1)
        } else {
            self.score.saturating_sub(1)
        };
        Some(self.score)
    }
}
