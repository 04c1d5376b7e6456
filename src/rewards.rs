//! End-of-round reward tiers
//!
//! One rule set for both the rules screen and the result screen:
//! Gold from 18 points, Silver from 10, participation gift below.

use serde::{Deserialize, Serialize};

/// Minimum score for the stand gift and the celebration effect
pub const GIFT_THRESHOLD: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RewardTier {
    Gold,
    Silver,
    Participation,
}

impl RewardTier {
    pub fn for_score(score: u32) -> Self {
        match score {
            18.. => RewardTier::Gold,
            10..=17 => RewardTier::Silver,
            _ => RewardTier::Participation,
        }
    }

    /// Lowest score of the tier
    pub fn min_score(&self) -> u32 {
        match self {
            RewardTier::Gold => 18,
            RewardTier::Silver => 10,
            RewardTier::Participation => 0,
        }
    }

    pub fn headline(&self) -> &'static str {
        match self {
            RewardTier::Gold => "Réflexes micronutrition au top 🔥",
            RewardTier::Silver => "Très bon score 👏",
            RewardTier::Participation => "Merci d'avoir joué 🙌",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            RewardTier::Gold => "Score Gold ! Excellent sens clinique et très bonne réactivité.",
            RewardTier::Silver => {
                "Beaux réflexes micronutritionnels, merci pour votre participation !"
            }
            RewardTier::Participation => {
                "Un petit rappel micronutrition ne fait jamais de mal. \
                 Retrouvez l'équipe Nutriome pour en discuter."
            }
        }
    }

    /// Prize handed out at the stand
    pub fn gift(&self) -> &'static str {
        match self {
            RewardTier::Gold => "Cadeau Gold (mug, tote bag, coffret…)",
            RewardTier::Silver => "Cadeau Silver (stylos, bloc-notes, échantillons…)",
            RewardTier::Participation => "Merci d'avoir joué ! (stylo + flyer)",
        }
    }
}

/// Rows of the rules screen, best tier first: (score range, gift)
pub const REWARD_TABLE: [(&str, RewardTier); 3] = [
    ("≥ 18 points", RewardTier::Gold),
    ("10 – 17 points", RewardTier::Silver),
    ("0 – 9 points", RewardTier::Participation),
];

/// Whether the result screen shows the "collect your gift" notice
pub fn gift_eligible(score: u32) -> bool {
    score >= GIFT_THRESHOLD
}

/// Confetti burst played on the result screen
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Celebration {
    pub particles: u32,
    /// Cone width in degrees, centred on straight up
    pub spread_deg: f64,
    /// Burst origin as a fraction of the viewport height
    pub origin_y: f64,
}

/// The burst for this score, if it earns one
pub fn celebration(score: u32) -> Option<Celebration> {
    gift_eligible(score).then_some(Celebration {
        particles: 80,
        spread_deg: 65.0,
        origin_y: 0.4,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(RewardTier::for_score(0), RewardTier::Participation);
        assert_eq!(RewardTier::for_score(9), RewardTier::Participation);
        assert_eq!(RewardTier::for_score(10), RewardTier::Silver);
        assert_eq!(RewardTier::for_score(17), RewardTier::Silver);
        assert_eq!(RewardTier::for_score(18), RewardTier::Gold);
        assert_eq!(RewardTier::for_score(100), RewardTier::Gold);
    }

    #[test]
    fn test_table_matches_tiers() {
        for (_, tier) in REWARD_TABLE {
            assert_eq!(RewardTier::for_score(tier.min_score()), tier);
        }
    }

    #[test]
    fn test_gift_threshold() {
        assert!(!gift_eligible(4));
        assert!(gift_eligible(5));
        // Gift notice shows before the Silver tier starts
        assert_eq!(RewardTier::for_score(5), RewardTier::Participation);
    }

    #[test]
    fn test_celebration_from_gift_threshold() {
        assert_eq!(celebration(0), None);
        assert_eq!(celebration(4), None);

        let burst = celebration(5).unwrap();
        assert_eq!(burst.particles, 80);
        assert!(burst.spread_deg > 0.0 && burst.spread_deg < 180.0);
        assert!((0.0..=1.0).contains(&burst.origin_y));
        assert_eq!(celebration(30), Some(burst));
    }
}
