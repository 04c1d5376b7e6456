//! Data-driven game balance
//!
//! Every timing and layout constant of a round lives here so an event booth
//! can retune the game from LocalStorage without a rebuild.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejected tuning values
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TuningError {
    #[error("lane count must be at least 1")]
    NoLanes,
    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),
    #[error("good bias {0} is outside [0, 1]")]
    BiasOutOfRange(f64),
    #[error("bubble cap {cap} is smaller than the lane count {lanes}")]
    CapBelowLanes { cap: usize, lanes: usize },
    #[error("invalid tuning JSON: {0}")]
    Json(String),
}

/// Round timing, spawn policy and play-area geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Round length in whole seconds
    pub total_time_secs: u32,
    /// Steady spawn period
    pub spawn_interval_ms: u64,
    /// Early extra spawn after a round (re)start
    pub follow_up_spawn_ms: u64,
    /// Number of horizontal lanes
    pub lanes: usize,
    /// Hard ceiling on live bubbles
    pub max_live_bubbles: usize,
    /// Probability of drawing from the good pool
    pub good_bias: f64,

    // === Geometry (px) ===
    pub bubble_width: f32,
    pub lane_inset: f32,
    /// Used until the presentation layer reports a real width
    pub default_area_width: f32,
    pub area_height: f32,

    // === Animation ===
    /// Time for an unclicked bubble to fall out of the play area
    pub fall_duration_ms: u64,
    /// Delay between a click and the bubble's removal
    pub click_removal_ms: u64,
    /// Lifetime of a feedback message
    pub feedback_clear_ms: u64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            total_time_secs: 30,
            spawn_interval_ms: 1400,
            follow_up_spawn_ms: 250,
            lanes: 3,
            max_live_bubbles: 10,
            good_bias: 0.6,

            bubble_width: 140.0,
            lane_inset: 10.0,
            default_area_width: 480.0,
            area_height: 260.0,

            fall_duration_ms: 6000,
            click_removal_ms: 300,
            feedback_clear_ms: 900,
        }
    }
}

impl Tuning {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "nutri_run_tuning";

    /// Check that the values describe a playable round
    pub fn validate(&self) -> Result<(), TuningError> {
        if self.lanes == 0 {
            return Err(TuningError::NoLanes);
        }
        let durations = [
            ("total_time_secs", u64::from(self.total_time_secs)),
            ("spawn_interval_ms", self.spawn_interval_ms),
            ("fall_duration_ms", self.fall_duration_ms),
            ("feedback_clear_ms", self.feedback_clear_ms),
        ];
        if let Some((name, _)) = durations.iter().find(|(_, v)| *v == 0) {
            return Err(TuningError::ZeroDuration(name));
        }
        if !(0.0..=1.0).contains(&self.good_bias) {
            return Err(TuningError::BiasOutOfRange(self.good_bias));
        }
        if self.max_live_bubbles < self.lanes {
            return Err(TuningError::CapBelowLanes {
                cap: self.max_live_bubbles,
                lanes: self.lanes,
            });
        }
        Ok(())
    }

    /// Parse a (possibly partial) JSON override and validate it
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning =
            serde_json::from_str(json).map_err(|e| TuningError::Json(e.to_string()))?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load tuning overrides from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(tuning) => {
                        log::info!("Loaded tuning overrides from LocalStorage");
                        return tuning;
                    }
                    Err(e) => log::warn!("Ignoring stored tuning: {}", e),
                }
            }
        }

        Self::default()
    }

    /// Native stub
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let tuning = Tuning::default();
        assert_eq!(tuning.validate(), Ok(()));
        assert_eq!(tuning.lanes, 3);
        assert_eq!(tuning.total_time_secs, 30);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "total_time_secs": 45, "lanes": 4 }"#).unwrap();
        assert_eq!(tuning.total_time_secs, 45);
        assert_eq!(tuning.lanes, 4);
        assert_eq!(tuning.spawn_interval_ms, 1400);
    }

    #[test]
    fn test_rejects_degenerate_values() {
        assert_eq!(
            Tuning::from_json(r#"{ "lanes": 0 }"#),
            Err(TuningError::NoLanes)
        );
        assert_eq!(
            Tuning::from_json(r#"{ "spawn_interval_ms": 0 }"#),
            Err(TuningError::ZeroDuration("spawn_interval_ms"))
        );
        assert_eq!(
            Tuning::from_json(r#"{ "good_bias": 1.5 }"#),
            Err(TuningError::BiasOutOfRange(1.5))
        );
        assert_eq!(
            Tuning::from_json(r#"{ "lanes": 5, "max_live_bubbles": 4 }"#),
            Err(TuningError::CapBelowLanes { cap: 4, lanes: 5 })
        );
        assert!(matches!(Tuning::from_json("not json"), Err(TuningError::Json(_))));
    }
}
