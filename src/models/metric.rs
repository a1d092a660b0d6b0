use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::{
    SCORE_AVERAGE, SCORE_EXCELLENT, SCORE_GOOD, SCORE_POOR, WEIGHT_PCT_PHYSICAL,
    WEIGHT_PCT_PSYCHOLOGICAL, WEIGHT_PCT_TACTICAL, WEIGHT_PCT_TECHNICAL,
};

/// One of the fifteen standardized tests recorded in an assessment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    // Physical
    #[serde(rename = "sprint_30m")]
    Sprint30m,
    YoYoTest,
    #[serde(rename = "vo2_max")]
    Vo2Max,
    VerticalJump,
    BodyFat,

    // Technical
    BallControl,
    PassingAccuracy,
    DribblingSuccess,
    ShootingAccuracy,
    DefensiveDuels,

    // Tactical
    GameIntelligence,
    Positioning,
    DecisionMaking,

    // Psychological
    Coachability,
    MentalToughness,
}

impl Metric {
    pub const ALL: [Metric; 15] = [
        Metric::Sprint30m,
        Metric::YoYoTest,
        Metric::Vo2Max,
        Metric::VerticalJump,
        Metric::BodyFat,
        Metric::BallControl,
        Metric::PassingAccuracy,
        Metric::DribblingSuccess,
        Metric::ShootingAccuracy,
        Metric::DefensiveDuels,
        Metric::GameIntelligence,
        Metric::Positioning,
        Metric::DecisionMaking,
        Metric::Coachability,
        Metric::MentalToughness,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Sprint30m => "sprint_30m",
            Metric::YoYoTest => "yo_yo_test",
            Metric::Vo2Max => "vo2_max",
            Metric::VerticalJump => "vertical_jump",
            Metric::BodyFat => "body_fat",
            Metric::BallControl => "ball_control",
            Metric::PassingAccuracy => "passing_accuracy",
            Metric::DribblingSuccess => "dribbling_success",
            Metric::ShootingAccuracy => "shooting_accuracy",
            Metric::DefensiveDuels => "defensive_duels",
            Metric::GameIntelligence => "game_intelligence",
            Metric::Positioning => "positioning",
            Metric::DecisionMaking => "decision_making",
            Metric::Coachability => "coachability",
            Metric::MentalToughness => "mental_toughness",
        }
    }

    pub fn category(&self) -> Category {
        match self {
            Metric::Sprint30m
            | Metric::YoYoTest
            | Metric::Vo2Max
            | Metric::VerticalJump
            | Metric::BodyFat => Category::Physical,
            Metric::BallControl
            | Metric::PassingAccuracy
            | Metric::DribblingSuccess
            | Metric::ShootingAccuracy
            | Metric::DefensiveDuels => Category::Technical,
            Metric::GameIntelligence | Metric::Positioning | Metric::DecisionMaking => {
                Category::Tactical
            }
            Metric::Coachability | Metric::MentalToughness => Category::Psychological,
        }
    }

    /// Times and body composition improve as they go down.
    pub fn polarity(&self) -> Polarity {
        match self {
            Metric::Sprint30m | Metric::BodyFat => Polarity::LowerIsBetter,
            _ => Polarity::HigherIsBetter,
        }
    }

    /// Human-readable unit, used in analysis output.
    pub fn unit(&self) -> &'static str {
        match self {
            Metric::Sprint30m => "s",
            Metric::YoYoTest => "m",
            Metric::Vo2Max => "ml/kg/min",
            Metric::VerticalJump => "cm",
            Metric::BodyFat
            | Metric::PassingAccuracy
            | Metric::DribblingSuccess
            | Metric::ShootingAccuracy
            | Metric::DefensiveDuels => "%",
            Metric::BallControl
            | Metric::GameIntelligence
            | Metric::Positioning
            | Metric::DecisionMaking
            | Metric::Coachability
            | Metric::MentalToughness => "/5",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        Metric::ALL
            .into_iter()
            .find(|m| m.as_str() == key)
            .ok_or_else(|| format!("Unknown metric: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    LowerIsBetter,
    HigherIsBetter,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Physical,
    Technical,
    Tactical,
    Psychological,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Physical,
        Category::Technical,
        Category::Tactical,
        Category::Psychological,
    ];

    pub fn metrics(&self) -> impl Iterator<Item = Metric> {
        let category = *self;
        Metric::ALL
            .into_iter()
            .filter(move |m| m.category() == category)
    }

    /// Weight as an integer percentage; the four weights sum to exactly 100.
    pub fn weight_pct(&self) -> u32 {
        match self {
            Category::Physical => WEIGHT_PCT_PHYSICAL,
            Category::Technical => WEIGHT_PCT_TECHNICAL,
            Category::Tactical => WEIGHT_PCT_TACTICAL,
            Category::Psychological => WEIGHT_PCT_PSYCHOLOGICAL,
        }
    }

    pub fn weight(&self) -> f64 {
        self.weight_pct() as f64 / 100.0
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Category::Physical => "physical",
            Category::Technical => "technical",
            Category::Tactical => "tactical",
            Category::Psychological => "psychological",
        };
        write!(f, "{}", s)
    }
}

/// Qualitative band a single metric value falls into.
///
/// Variant order runs from least to most favorable, so `Ord` compares levels
/// by quality.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Poor,
    Average,
    Good,
    Excellent,
}

impl Level {
    pub fn score(&self) -> f64 {
        match self {
            Level::Excellent => SCORE_EXCELLENT,
            Level::Good => SCORE_GOOD,
            Level::Average => SCORE_AVERAGE,
            Level::Poor => SCORE_POOR,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Level::Excellent => "excellent",
            Level::Good => "good",
            Level::Average => "average",
            Level::Poor => "poor",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_roundtrip_through_serde() {
        for metric in Metric::ALL {
            let json = serde_json::to_string(&metric).unwrap();
            assert_eq!(json, format!("\"{}\"", metric.as_str()));
            assert_eq!(metric.as_str().parse::<Metric>().unwrap(), metric);
        }
    }

    #[test]
    fn unknown_metric_name_is_rejected() {
        assert!("sprint_40m".parse::<Metric>().is_err());
        assert!("".parse::<Metric>().is_err());
    }

    #[test]
    fn category_membership_sizes() {
        assert_eq!(Category::Physical.metrics().count(), 5);
        assert_eq!(Category::Technical.metrics().count(), 5);
        assert_eq!(Category::Tactical.metrics().count(), 3);
        assert_eq!(Category::Psychological.metrics().count(), 2);
    }

    #[test]
    fn only_sprint_and_body_fat_are_lower_is_better() {
        let lower: Vec<Metric> = Metric::ALL
            .into_iter()
            .filter(|m| m.polarity() == Polarity::LowerIsBetter)
            .collect();
        assert_eq!(lower, vec![Metric::Sprint30m, Metric::BodyFat]);
    }

    #[test]
    fn weights_sum_to_one() {
        let total: u32 = Category::ALL.iter().map(|c| c.weight_pct()).sum();
        assert_eq!(total, 100);
        assert_eq!(Category::Technical.weight(), 0.40);
    }

    #[test]
    fn levels_order_by_quality() {
        assert!(Level::Excellent > Level::Good);
        assert!(Level::Good > Level::Average);
        assert!(Level::Average > Level::Poor);
        assert_eq!(Level::Poor.score(), 2.0);
        assert_eq!(Level::Excellent.score(), 5.0);
    }
}
