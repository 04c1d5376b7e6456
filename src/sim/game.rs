//! Round orchestration
//!
//! Ties the countdown, the bubble spawner and the feedback line to one
//! cooperative [`Scheduler`]. The presentation layer calls [`Game::advance`]
//! with elapsed wall time, forwards clicks, and drains [`GameEvent`]s.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::lanes::{Bubble, Spawner};
use super::round::{RoundController, RoundPhase};
use super::select::{choose_pool, select_item};
use super::timer::{Scheduler, TimerPriority};
use crate::catalog::{Catalog, Objective};
use crate::tuning::{Tuning, TuningError};

pub const GOOD_FEEDBACK: &str = "✅ Bien joué ! Micronutriment adapté à l’objectif.";
pub const BAD_FEEDBACK: &str = "❌ Oups, celui-ci ne cible pas vraiment cet objectif.";

const CLOCK_PERIOD_MS: u64 = 1000;

/// Timer payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Job {
    RoundClock,
    Spawn,
    FollowUpSpawn,
    FeedbackClear,
    RemoveClicked(u64),
    FallComplete(u64),
}

impl Job {
    fn bubble_id(&self) -> Option<u64> {
        match self {
            Job::RemoveClicked(id) | Job::FallComplete(id) => Some(*id),
            _ => None,
        }
    }
}

impl TimerPriority for Job {
    fn priority(&self) -> u8 {
        // The countdown must be seen before anything else due at the same time
        match self {
            Job::RoundClock => 0,
            _ => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedbackKind {
    Good,
    Bad,
}

/// Transient message shown under the play area
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Feedback {
    pub kind: FeedbackKind,
    pub message: &'static str,
}

/// Why a bubble left the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemovalReason {
    /// Clicked, removed after the feedback animation
    Clicked,
    /// Fell out of the play area unclicked
    Missed,
    /// Recycled to make room for a new bubble
    Evicted,
    /// Wiped by a round (re)start or teardown
    Cleared,
}

/// Outcome of a click
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    Scored { is_good: bool, score: u32 },
    /// Unknown or already resolved bubble, or no running round
    Ignored,
}

/// Notifications for the presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    RoundStarted { objective_id: String },
    TimeChanged(u32),
    ScoreChanged(u32),
    BubbleSpawned { id: u64, lane: usize, is_good: bool },
    BubbleRemoved { id: u64, reason: RemovalReason },
    FeedbackShown(FeedbackKind),
    FeedbackCleared,
    /// Emitted exactly once per started round
    RoundEnded { score: u32 },
}

/// A full game session: any number of rounds over one catalog
pub struct Game {
    catalog: Catalog,
    tuning: Tuning,
    rng: Pcg32,
    round: RoundController,
    spawner: Spawner,
    scheduler: Scheduler<Job>,
    objective: Option<Objective>,
    feedback: Option<Feedback>,
    events: Vec<GameEvent>,
}

impl Game {
    /// Fails when `tuning` does not describe a playable round
    pub fn new(catalog: Catalog, tuning: Tuning, seed: u64) -> Result<Self, TuningError> {
        tuning.validate()?;
        let spawner = Spawner::new(
            tuning.lanes,
            tuning.max_live_bubbles,
            tuning.bubble_width,
            tuning.lane_inset,
            tuning.default_area_width,
        );
        Ok(Self {
            catalog,
            round: RoundController::new(tuning.total_time_secs),
            tuning,
            rng: Pcg32::seed_from_u64(seed),
            spawner,
            scheduler: Scheduler::new(),
            objective: None,
            feedback: None,
            events: Vec::new(),
        })
    }

    // === Accessors ===

    pub fn phase(&self) -> RoundPhase {
        self.round.phase()
    }

    pub fn is_running(&self) -> bool {
        self.round.is_running()
    }

    pub fn score(&self) -> u32 {
        self.round.score()
    }

    pub fn time_left(&self) -> u32 {
        self.round.time_left()
    }

    pub fn objective(&self) -> Option<&Objective> {
        self.objective.as_ref()
    }

    pub fn bubbles(&self) -> &[Bubble] {
        self.spawner.bubbles()
    }

    pub fn feedback(&self) -> Option<Feedback> {
        self.feedback
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn now_ms(&self) -> u64 {
        self.scheduler.now_ms()
    }

    /// Timers still registered (clock, spawn loop, feedback, per-bubble)
    pub fn pending_timers(&self) -> usize {
        self.scheduler.len()
    }

    pub fn set_area_width(&mut self, width: f32) {
        self.spawner.set_area_width(width);
    }

    /// Take every event emitted since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    // === Lifecycle ===

    /// Pick a new objective and (re)start the countdown and spawn loop
    pub fn start_round(&mut self) {
        // A round interrupted by a restart still gets its end notification
        self.end_round();
        self.scheduler.cancel_all();

        for bubble in self.spawner.clear() {
            self.emit(GameEvent::BubbleRemoved {
                id: bubble.id,
                reason: RemovalReason::Cleared,
            });
        }
        self.clear_feedback();

        let objective = self.catalog.random_objective(&mut self.rng).clone();
        log::info!("Round started: objective '{}'", objective.id);
        self.emit(GameEvent::RoundStarted {
            objective_id: objective.id.clone(),
        });
        self.objective = Some(objective);

        self.round.start();
        self.emit(GameEvent::ScoreChanged(self.round.score()));
        self.emit(GameEvent::TimeChanged(self.round.time_left()));

        self.scheduler.schedule_repeating(CLOCK_PERIOD_MS, Job::RoundClock);

        // Immediate spawn plus an early follow-up so the board is never empty
        self.spawn_bubble();
        self.scheduler
            .schedule_once(self.tuning.follow_up_spawn_ms, Job::FollowUpSpawn);
        self.scheduler
            .schedule_repeating(self.tuning.spawn_interval_ms, Job::Spawn);
    }

    /// Stop the round. Only the first call per round has any effect.
    pub fn end_round(&mut self) -> bool {
        if !self.round.end() {
            return false;
        }
        self.scheduler.cancel_all();
        self.clear_feedback();

        let score = self.round.score();
        log::info!("Round ended with score {}", score);
        self.emit(GameEvent::RoundEnded { score });
        true
    }

    /// Cancel everything before the owner drops the game
    pub fn teardown(&mut self) {
        self.end_round();
        self.scheduler.cancel_all();
        for bubble in self.spawner.clear() {
            self.emit(GameEvent::BubbleRemoved {
                id: bubble.id,
                reason: RemovalReason::Cleared,
            });
        }
        self.clear_feedback();
    }

    /// Advance the virtual clock, firing due timers in order
    pub fn advance(&mut self, dt_ms: u64) {
        let until = self.scheduler.now_ms() + dt_ms;
        while let Some((_, job)) = self.scheduler.pop_due(until) {
            self.handle(job);
        }
        self.scheduler.finish(until);
    }

    fn handle(&mut self, job: Job) {
        match job {
            Job::RoundClock => {
                let reached_zero = self.round.tick();
                self.emit(GameEvent::TimeChanged(self.round.time_left()));
                if reached_zero {
                    self.end_round();
                }
            }
            Job::Spawn | Job::FollowUpSpawn => {
                if self.round.is_running() {
                    self.spawn_bubble();
                }
            }
            Job::FeedbackClear => self.clear_feedback(),
            Job::RemoveClicked(id) => {
                if self.spawner.remove(id).is_some() {
                    self.emit(GameEvent::BubbleRemoved {
                        id,
                        reason: RemovalReason::Clicked,
                    });
                }
            }
            Job::FallComplete(id) => self.animation_end(id),
        }
    }

    // === Bubbles ===

    fn spawn_bubble(&mut self) {
        let Some(objective) = self.objective.as_ref() else {
            return;
        };
        let pool = choose_pool(&mut self.rng, self.tuning.good_bias);
        let item = select_item(pool, &self.catalog, objective, &mut self.rng).clone();
        let is_good = item.matches(objective);

        let report = self.spawner.spawn(item, is_good, self.scheduler.now_ms());
        for evicted in report.evicted {
            self.cancel_bubble_timers(evicted.id);
            self.emit(GameEvent::BubbleRemoved {
                id: evicted.id,
                reason: RemovalReason::Evicted,
            });
        }

        let bubble = report.bubble;
        self.scheduler
            .schedule_once(self.tuning.fall_duration_ms, Job::FallComplete(bubble.id));
        self.emit(GameEvent::BubbleSpawned {
            id: bubble.id,
            lane: bubble.lane,
            is_good: bubble.is_good,
        });
    }

    fn cancel_bubble_timers(&mut self, id: u64) {
        self.scheduler.cancel_where(|job| job.bubble_id() == Some(id));
    }

    /// Resolve a click on a live bubble
    pub fn click(&mut self, bubble_id: u64) -> ClickOutcome {
        if !self.round.is_running() {
            log::debug!("Click on bubble {} ignored: round not running", bubble_id);
            return ClickOutcome::Ignored;
        }
        let Some(bubble) = self.spawner.resolve(bubble_id) else {
            return ClickOutcome::Ignored;
        };
        let is_good = bubble.is_good;

        let Some(score) = self.round.apply_outcome(is_good) else {
            return ClickOutcome::Ignored;
        };
        self.emit(GameEvent::ScoreChanged(score));

        let kind = if is_good {
            FeedbackKind::Good
        } else {
            FeedbackKind::Bad
        };
        self.show_feedback(kind);

        // The fall animation no longer matters; removal waits for the feedback
        self.cancel_bubble_timers(bubble_id);
        self.scheduler
            .schedule_once(self.tuning.click_removal_ms, Job::RemoveClicked(bubble_id));

        ClickOutcome::Scored { is_good, score }
    }

    /// The bubble fell out of the play area. Unclicked bubbles are dropped
    /// without penalty; resolved ones are left to their removal timer.
    pub fn animation_end(&mut self, bubble_id: u64) {
        if !self.round.is_running() {
            return;
        }
        let unresolved = self
            .spawner
            .get(bubble_id)
            .is_some_and(|bubble| !bubble.resolved);
        if !unresolved {
            return;
        }
        self.spawner.remove(bubble_id);
        self.cancel_bubble_timers(bubble_id);
        self.emit(GameEvent::BubbleRemoved {
            id: bubble_id,
            reason: RemovalReason::Missed,
        });
    }

    // === Feedback ===

    fn show_feedback(&mut self, kind: FeedbackKind) {
        let message = match kind {
            FeedbackKind::Good => GOOD_FEEDBACK,
            FeedbackKind::Bad => BAD_FEEDBACK,
        };
        self.scheduler.cancel_where(|job| *job == Job::FeedbackClear);
        self.feedback = Some(Feedback { kind, message });
        self.scheduler
            .schedule_once(self.tuning.feedback_clear_ms, Job::FeedbackClear);
        self.emit(GameEvent::FeedbackShown(kind));
    }

    fn clear_feedback(&mut self) {
        self.scheduler.cancel_where(|job| *job == Job::FeedbackClear);
        if self.feedback.take().is_some() {
            self.emit(GameEvent::FeedbackCleared);
        }
    }

    fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }
}
