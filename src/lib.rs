//! Nutri-Run - a timed micronutrient bubble game for event stands
//!
//! Core modules:
//! - `sim`: Deterministic round simulation (countdown, lanes, scoring)
//! - `catalog`: Items and objectives
//! - `tuning`: Data-driven game balance
//! - `rewards`: Score tiers shown at the end of a round
//! - `registration`: Player contact details

pub mod catalog;
pub mod registration;
pub mod rewards;
pub mod sim;
pub mod tuning;

pub use catalog::{Catalog, Item, Objective};
pub use registration::Player;
pub use rewards::RewardTier;
pub use tuning::Tuning;
