use crate::session::Panel;
use common::{AnalysisResult, ImpactfulEvent, RiskLevel};

/// Risk banner shown above every panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiskSummary {
    pub level: RiskLevel,
    pub badge: String,
    pub message: &'static str,
}

impl RiskSummary {
    pub fn for_result(result: &AnalysisResult) -> Self {
        let level = result.risk_level();
        let message = match level {
            RiskLevel::High => {
                "Your portfolio contains several securities with negative growth potential. Consider rebalancing."
            }
            RiskLevel::Low => {
                "Your portfolio is well-diversified with mostly positive growth assets."
            }
        };
        Self {
            level,
            badge: format!("{} Risk", level),
            message,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
}

/// One line of the sector growth panel.
#[derive(Debug, Clone, PartialEq)]
pub struct SectorRow {
    pub sector: String,
    pub label: String,
    pub value: f64,
    pub formatted: String,
    pub trend: Trend,
}

/// Sector predictions ordered from strongest growth to strongest decline.
/// Non-finite predictions are left out.
pub fn sector_rows(result: &AnalysisResult) -> Vec<SectorRow> {
    let mut rows: Vec<SectorRow> = result
        .all_predictions
        .iter()
        .filter(|(_, value)| value.is_finite())
        .map(|(sector, value)| SectorRow {
            sector: sector.clone(),
            label: sector_label(sector),
            value: *value,
            formatted: format_percent(*value),
            trend: if *value >= 0.0 { Trend::Up } else { Trend::Down },
        })
        .collect();
    rows.sort_by(|a, b| b.value.total_cmp(&a.value));
    rows
}

/// `consumer_staples` -> `Consumer Staples`
pub fn sector_label(sector: &str) -> String {
    sector
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Two decimals with an explicit `+` for growth.
pub fn format_percent(value: f64) -> String {
    if value > 0.0 {
        format!("+{:.2}%", value)
    } else {
        format!("{:.2}%", value)
    }
}

/// Events ordered by impact, highest first. Ties keep the job's order.
pub fn sorted_events(result: &AnalysisResult) -> Vec<&ImpactfulEvent> {
    let mut events: Vec<&ImpactfulEvent> = result.top_5_events.iter().collect();
    events.sort_by(|a, b| b.impact.total_cmp(&a.impact));
    events
}

/// Entry card on the dashboard that opens a panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureCard {
    pub panel: Panel,
    pub title: &'static str,
    pub description: String,
}

pub fn feature_cards(result: &AnalysisResult) -> [FeatureCard; 3] {
    [
        FeatureCard {
            panel: Panel::SectorGrowth,
            title: "Predicted Sector Growth",
            description: "View detailed growth predictions for all market sectors".to_string(),
        },
        FeatureCard {
            panel: Panel::ImportantEvents,
            title: "Important Events",
            description: format!(
                "{} significant events detected that may impact your portfolio",
                result.top_5_events.len()
            ),
        },
        FeatureCard {
            panel: Panel::MarketAnalysis,
            title: "Portfolio Analysis",
            description: "Detailed breakdown of your portfolio's strengths and weaknesses"
                .to_string(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AnalysisResult {
        serde_json::from_value(serde_json::json!({
            "top_5_events": [
                {"event": "Chip export limits", "impact": 0.12},
                {"event": "Oil supply shock", "impact": 0.91},
                {"event": "Retail sales beat", "impact": "0.40"}
            ],
            "all_predictions": {
                "information_technology": -0.4321,
                "energy": 1.5,
                "consumer_staples": 0.0,
                "real_estate": -2.25
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_risk_summary_low() {
        let summary = RiskSummary::for_result(&sample());
        assert_eq!(summary.level, RiskLevel::Low);
        assert_eq!(summary.badge, "Low Risk");
    }

    #[test]
    fn test_risk_summary_high() {
        let mut result = sample();
        result.all_predictions.insert("utilities".to_string(), -0.1);
        result.all_predictions.insert("materials".to_string(), -0.2);

        let summary = RiskSummary::for_result(&result);

        assert_eq!(summary.level, RiskLevel::High);
        assert!(summary.message.contains("Consider rebalancing"));
    }

    #[test]
    fn test_sector_rows_sorted_and_formatted() {
        let rows = sector_rows(&sample());
        let labels: Vec<&str> = rows.iter().map(|row| row.label.as_str()).collect();

        assert_eq!(
            labels,
            vec!["Energy", "Consumer Staples", "Information Technology", "Real Estate"]
        );
        assert_eq!(rows[0].formatted, "+1.50%");
        assert_eq!(rows[1].formatted, "0.00%");
        assert_eq!(rows[1].trend, Trend::Up);
        assert_eq!(rows[2].formatted, "-0.43%");
        assert_eq!(rows[3].trend, Trend::Down);
    }

    #[test]
    fn test_sector_rows_skip_non_finite_values() {
        let mut result = sample();
        result.all_predictions.insert("utilities".to_string(), f64::NAN);

        assert_eq!(sector_rows(&result).len(), 4);
    }

    #[test]
    fn test_sorted_events_by_impact_descending() {
        let result = sample();
        let events: Vec<&str> = sorted_events(&result)
            .iter()
            .map(|event| event.event.as_str())
            .collect();

        assert_eq!(
            events,
            vec!["Oil supply shock", "Retail sales beat", "Chip export limits"]
        );
    }

    #[test]
    fn test_feature_cards_count_events() {
        let cards = feature_cards(&sample());
        assert_eq!(cards[1].panel, Panel::ImportantEvents);
        assert_eq!(
            cards[1].description,
            "3 significant events detected that may impact your portfolio"
        );
    }
}
