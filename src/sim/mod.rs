//! Deterministic round simulation
//!
//! All gameplay logic lives here. This module must stay pure:
//! - Virtual millisecond clock only, advanced by the caller
//! - Seeded RNG only
//! - Stable iteration order (bubbles in spawn order)
//! - No DOM or platform dependencies

pub mod game;
pub mod lanes;
pub mod round;
pub mod select;
pub mod timer;

pub use game::{
    BAD_FEEDBACK, ClickOutcome, Feedback, FeedbackKind, GOOD_FEEDBACK, Game, GameEvent,
    RemovalReason,
};
pub use lanes::{Bubble, SpawnReport, Spawner};
pub use round::{RoundController, RoundPhase};
pub use select::{Pool, choose_pool, select_item};
pub use timer::{Scheduler, TimerId, TimerPriority};
