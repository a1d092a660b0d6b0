//! Age-banded reference thresholds for every metric.
//!
//! Values follow the youth scouting handbook bands. Each row is ordered from
//! most to least favorable in the metric's own direction: descending for
//! higher-is-better metrics, ascending for sprint time and body fat.

use serde::Serialize;

use crate::error::{AppError, Result};
use crate::models::{AgeBracket, Metric};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Thresholds {
    pub excellent: f64,
    pub good: f64,
    pub average: f64,
    pub poor: f64,
}

impl Thresholds {
    const fn new(excellent: f64, good: f64, average: f64, poor: f64) -> Self {
        Thresholds {
            excellent,
            good,
            average,
            poor,
        }
    }
}

/// 1-5 observational ratings share one row across all brackets.
const RATING: Thresholds = Thresholds::new(5.0, 4.0, 3.0, 2.0);

/// Read-only lookup over the reference thresholds.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardsTable;

impl StandardsTable {
    pub fn new() -> Self {
        StandardsTable
    }

    pub fn age_bracket(&self, age: u32) -> AgeBracket {
        AgeBracket::from_age(age)
    }

    /// Thresholds by metric wire name. Fails with `UnknownMetric` for any name
    /// outside the fifteen recognized metrics.
    pub fn get_thresholds(&self, bracket: AgeBracket, metric_name: &str) -> Result<Thresholds> {
        let metric: Metric = metric_name
            .parse()
            .map_err(|_| AppError::UnknownMetric(metric_name.to_string()))?;
        Ok(self.thresholds(bracket, metric))
    }

    pub fn thresholds(&self, bracket: AgeBracket, metric: Metric) -> Thresholds {
        use AgeBracket::*;
        use Metric::*;

        match (metric, bracket) {
            (Sprint30m, U14) => Thresholds::new(4.5, 4.7, 4.9, 5.0),
            (Sprint30m, U16) => Thresholds::new(4.2, 4.4, 4.6, 4.7),
            (Sprint30m, U18) => Thresholds::new(4.0, 4.2, 4.4, 4.5),
            (Sprint30m, Elite) => Thresholds::new(3.8, 3.9, 4.0, 4.1),

            (YoYoTest, U14) => Thresholds::new(1200.0, 1000.0, 900.0, 800.0),
            (YoYoTest, U16) => Thresholds::new(1600.0, 1400.0, 1300.0, 1200.0),
            (YoYoTest, U18) => Thresholds::new(2000.0, 1800.0, 1700.0, 1600.0),
            (YoYoTest, Elite) => Thresholds::new(2400.0, 2300.0, 2200.0, 2100.0),

            (Vo2Max, U14) => Thresholds::new(52.0, 50.0, 49.0, 48.0),
            (Vo2Max, U16) => Thresholds::new(56.0, 54.0, 53.0, 52.0),
            (Vo2Max, U18) => Thresholds::new(60.0, 58.0, 57.0, 56.0),
            (Vo2Max, Elite) => Thresholds::new(65.0, 62.0, 60.0, 58.0),

            (VerticalJump, U14) => Thresholds::new(40.0, 35.0, 32.0, 30.0),
            (VerticalJump, U16) => Thresholds::new(50.0, 45.0, 42.0, 40.0),
            (VerticalJump, U18) => Thresholds::new(60.0, 55.0, 52.0, 50.0),
            (VerticalJump, Elite) => Thresholds::new(70.0, 65.0, 60.0, 55.0),

            (BodyFat, U14) => Thresholds::new(12.0, 15.0, 16.0, 18.0),
            (BodyFat, U16) => Thresholds::new(10.0, 12.0, 14.0, 15.0),
            (BodyFat, U18) => Thresholds::new(8.0, 10.0, 11.0, 12.0),
            (BodyFat, Elite) => Thresholds::new(6.0, 8.0, 9.0, 10.0),

            (PassingAccuracy, U14) => Thresholds::new(75.0, 70.0, 65.0, 60.0),
            (PassingAccuracy, U16) => Thresholds::new(85.0, 80.0, 75.0, 70.0),
            (PassingAccuracy, U18) => Thresholds::new(90.0, 85.0, 80.0, 75.0),
            (PassingAccuracy, Elite) => Thresholds::new(95.0, 90.0, 85.0, 80.0),

            (DribblingSuccess, U14) => Thresholds::new(55.0, 50.0, 45.0, 40.0),
            (DribblingSuccess, U16) => Thresholds::new(65.0, 60.0, 55.0, 50.0),
            (DribblingSuccess, U18) => Thresholds::new(70.0, 65.0, 60.0, 55.0),
            (DribblingSuccess, Elite) => Thresholds::new(75.0, 70.0, 65.0, 60.0),

            (ShootingAccuracy, U14) => Thresholds::new(60.0, 55.0, 50.0, 45.0),
            (ShootingAccuracy, U16) => Thresholds::new(70.0, 65.0, 60.0, 55.0),
            (ShootingAccuracy, U18) => Thresholds::new(75.0, 70.0, 65.0, 60.0),
            (ShootingAccuracy, Elite) => Thresholds::new(85.0, 80.0, 75.0, 70.0),

            (DefensiveDuels, U14) => Thresholds::new(70.0, 65.0, 60.0, 55.0),
            (DefensiveDuels, U16) => Thresholds::new(75.0, 70.0, 65.0, 60.0),
            (DefensiveDuels, U18) => Thresholds::new(80.0, 75.0, 70.0, 65.0),
            (DefensiveDuels, Elite) => Thresholds::new(85.0, 80.0, 75.0, 70.0),

            (
                BallControl | GameIntelligence | Positioning | DecisionMaking | Coachability
                | MentalToughness,
                _,
            ) => RATING,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Polarity;

    #[test]
    fn thresholds_are_strictly_ordered_by_polarity() {
        let table = StandardsTable::new();
        for bracket in AgeBracket::ALL {
            for metric in Metric::ALL {
                let t = table.thresholds(bracket, metric);
                match metric.polarity() {
                    Polarity::HigherIsBetter => assert!(
                        t.excellent > t.good && t.good > t.average && t.average > t.poor,
                        "{} / {} not descending: {:?}",
                        metric,
                        bracket,
                        t
                    ),
                    Polarity::LowerIsBetter => assert!(
                        t.excellent < t.good && t.good < t.average && t.average < t.poor,
                        "{} / {} not ascending: {:?}",
                        metric,
                        bracket,
                        t
                    ),
                }
            }
        }
    }

    #[test]
    fn lookup_by_name() {
        let table = StandardsTable::new();
        let t = table.get_thresholds(AgeBracket::U16, "sprint_30m").unwrap();
        assert_eq!(t.excellent, 4.2);
        assert_eq!(t.poor, 4.7);
    }

    #[test]
    fn lookup_unknown_name_fails() {
        let table = StandardsTable::new();
        let err = table
            .get_thresholds(AgeBracket::Elite, "long_jump")
            .unwrap_err();
        assert!(matches!(err, AppError::UnknownMetric(ref n) if n == "long_jump"));
    }

    #[test]
    fn ratings_identical_across_brackets() {
        let table = StandardsTable::new();
        for bracket in AgeBracket::ALL {
            assert_eq!(table.thresholds(bracket, Metric::Coachability), RATING);
        }
    }
}
