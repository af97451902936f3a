//! Risk categorization from the model's high-risk probability.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::features::FeatureVector;
use crate::model::ProbabilityModel;

/// Probabilities below this band as Low; at or above, at least Moderate.
pub const MODERATE_THRESHOLD: f64 = 0.33;
/// Probabilities at or above this band as High.
pub const HIGH_THRESHOLD: f64 = 0.66;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskCategory {
    Low,
    Moderate,
    High,
}

impl RiskCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskCategory::Low => "Low",
            RiskCategory::Moderate => "Moderate",
            RiskCategory::High => "High",
        }
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown risk category: {0}")]
pub struct ParseRiskCategoryError(String);

impl FromStr for RiskCategory {
    type Err = ParseRiskCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Low" => Ok(RiskCategory::Low),
            "Moderate" => Ok(RiskCategory::Moderate),
            "High" => Ok(RiskCategory::High),
            other => Err(ParseRiskCategoryError(other.to_string())),
        }
    }
}

/// Band a high-risk probability. Both boundaries are closed on the lower
/// side: exactly 0.33 is Moderate, exactly 0.66 is High.
pub fn categorize(probability: f64) -> RiskCategory {
    if probability < MODERATE_THRESHOLD {
        RiskCategory::Low
    } else if probability < HIGH_THRESHOLD {
        RiskCategory::Moderate
    } else {
        RiskCategory::High
    }
}

/// Run the model on a derived feature row and band the resulting high-risk
/// probability. Callers must not invoke this without a loaded model; model
/// availability is the HTTP layer's precondition.
pub fn score<M: ProbabilityModel + ?Sized>(
    model: &M,
    features: &FeatureVector,
) -> (f64, RiskCategory) {
    let probabilities = model.predict_proba(features);
    let high_risk = probabilities[1];
    (high_risk, categorize(high_risk))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_are_closed_on_the_lower_side() {
        assert_eq!(categorize(0.0), RiskCategory::Low);
        assert_eq!(categorize(0.3299), RiskCategory::Low);
        assert_eq!(categorize(0.33), RiskCategory::Moderate);
        assert_eq!(categorize(0.6599), RiskCategory::Moderate);
        assert_eq!(categorize(0.66), RiskCategory::High);
        assert_eq!(categorize(1.0), RiskCategory::High);
    }

    #[test]
    fn category_round_trips_through_strings() {
        for category in [RiskCategory::Low, RiskCategory::Moderate, RiskCategory::High] {
            assert_eq!(category.as_str().parse::<RiskCategory>().unwrap(), category);
        }
        assert!("Severe".parse::<RiskCategory>().is_err());
    }

    #[test]
    fn category_serializes_as_plain_name() {
        assert_eq!(
            serde_json::to_value(RiskCategory::Moderate).unwrap(),
            serde_json::json!("Moderate")
        );
    }
}
