use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::trace;
use utoipa::ToSchema;

/// A portfolio is rated "High" risk once more than this many sectors are
/// predicted to shrink.
pub const HIGH_RISK_NEGATIVE_THRESHOLD: usize = 3;

/// A news event scored by the prediction job.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ImpactfulEvent {
    /// Optional identifier, not emitted by every producer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Event headline
    pub event: String,
    /// Impact score; accepted as a JSON number or a numeric string
    #[serde(deserialize_with = "number_or_string")]
    pub impact: f64,
}

/// Output of the prediction job.
///
/// The relay forwards this document verbatim; the typed form exists for the
/// presentation layer. Unknown fields are ignored and every field is optional
/// so partial results still render.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct AnalysisResult {
    #[serde(default)]
    pub sector_with_most_growth_potential: Option<String>,
    #[serde(default)]
    pub sector_with_least_growth_potential: Option<String>,
    /// Sectors predicted to grow by more than 5%
    #[serde(default)]
    pub growing_sectors: Vec<String>,
    /// Sectors predicted to shrink by 5% or more
    #[serde(default)]
    pub declining_sectors: Vec<String>,
    /// Most impactful events, as ranked by the job
    #[serde(default)]
    pub top_5_events: Vec<ImpactfulEvent>,
    /// Predicted growth per sector, in percent
    #[serde(default)]
    pub all_predictions: BTreeMap<String, f64>,
}

impl AnalysisResult {
    pub fn risk_level(&self) -> RiskLevel {
        RiskLevel::from_predictions(self.all_predictions.values().copied())
    }
}

/// Naive portfolio risk classification.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub enum RiskLevel {
    High,
    Low,
}

impl RiskLevel {
    /// "High" iff strictly more than [`HIGH_RISK_NEGATIVE_THRESHOLD`]
    /// predictions are negative.
    pub fn from_predictions<I>(predictions: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let negative = predictions.into_iter().filter(|value| *value < 0.0).count();
        trace!("Classifying risk with {} negative predictions", negative);
        if negative > HIGH_RISK_NEGATIVE_THRESHOLD {
            RiskLevel::High
        } else {
            RiskLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::High => "High",
            RiskLevel::Low => "Low",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn number_or_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(value) => Ok(value),
        Raw::Text(text) => text
            .trim()
            .parse::<f64>()
            .map_err(|e| serde::de::Error::custom(format!("invalid impact '{}': {}", text, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn predictions(values: &[f64]) -> AnalysisResult {
        AnalysisResult {
            all_predictions: values
                .iter()
                .enumerate()
                .map(|(i, value)| (format!("sector_{}", i), *value))
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_exactly_three_negative_predictions_is_low_risk() {
        let result = predictions(&[-1.0, -0.5, -0.01, 2.0, 0.0]);
        assert_eq!(result.risk_level(), RiskLevel::Low);
    }

    #[test]
    fn test_four_negative_predictions_is_high_risk() {
        let result = predictions(&[-1.0, -0.5, -0.01, -3.2, 2.0]);
        assert_eq!(result.risk_level(), RiskLevel::High);
    }

    #[test]
    fn test_zero_is_not_negative() {
        assert_eq!(
            RiskLevel::from_predictions([0.0, 0.0, 0.0, 0.0, 0.0]),
            RiskLevel::Low
        );
    }

    #[test]
    fn test_empty_predictions_are_low_risk() {
        assert_eq!(AnalysisResult::default().risk_level(), RiskLevel::Low);
    }

    #[test]
    fn test_deserialize_prediction_job_output() {
        let json = r#"{
            "sector_with_most_growth_potential": "energy",
            "sector_with_least_growth_potential": "utilities",
            "growing_sectors": ["energy"],
            "declining_sectors": ["utilities"],
            "top_5_events": [
                {"event": "Oil prices jump", "impact": 0.8123},
                {"id": 7, "event": "Rate cut expected", "impact": "0.25"}
            ],
            "all_predictions": {"energy": 1.25, "utilities": -0.75},
            "generated_by": "predicter"
        }"#;

        let result: AnalysisResult = serde_json::from_str(json).unwrap();

        assert_eq!(result.sector_with_most_growth_potential.as_deref(), Some("energy"));
        assert_eq!(result.top_5_events.len(), 2);
        assert_eq!(result.top_5_events[1].id, Some(7));
        assert_eq!(result.top_5_events[1].impact, 0.25);
        assert_eq!(result.all_predictions["utilities"], -0.75);
    }

    #[test]
    fn test_non_numeric_impact_is_rejected() {
        let json = r#"{"event": "Unknown", "impact": "lots"}"#;
        assert!(serde_json::from_str::<ImpactfulEvent>(json).is_err());
    }
}
