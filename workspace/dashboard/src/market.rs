//! Market analysis panel: growth potential, recommendations and the sector
//! histogram.

use crate::fetch::{FetchState, TrackedFetch};
use crate::panels::{self, SectorRow};
use common::{AnalysisResult, PortfolioEntry, RecommendationRequest};
use log::debug;

pub const NO_RECOMMENDATIONS: &str = "No recommendations available.";
pub const RECOMMENDATIONS_FAILED_MESSAGE: &str =
    "Failed to fetch recommendations. Please try again.";
pub const HISTOGRAM_FAILED_MESSAGE: &str = "Failed to load histogram";
/// Where the server publishes the rendered histogram
pub const HISTOGRAM_PATH: &str = "/assets/sector_histogram.png";

/// Sectors with the highest and lowest predicted growth.
#[derive(Debug, Clone, PartialEq)]
pub struct GrowthPotential {
    pub highest: SectorRow,
    pub lowest: SectorRow,
}

/// The sectors the prediction job named, falling back to the extremes of
/// `all_predictions` when a name is missing or has no prediction.
/// `None` when there are no usable predictions at all.
pub fn growth_potential(result: &AnalysisResult) -> Option<GrowthPotential> {
    let rows = panels::sector_rows(result);
    let named = |name: &Option<String>| {
        name.as_deref()
            .and_then(|name| rows.iter().find(|row| row.sector == name))
            .cloned()
    };

    let highest =
        named(&result.sector_with_most_growth_potential).or_else(|| rows.first().cloned())?;
    let lowest =
        named(&result.sector_with_least_growth_potential).or_else(|| rows.last().cloned())?;
    Some(GrowthPotential { highest, lowest })
}

/// Recommendation request for the analysed portfolio.
pub fn recommendation_request(
    portfolio: &[PortfolioEntry],
    result: &AnalysisResult,
) -> RecommendationRequest {
    RecommendationRequest {
        portfolio: portfolio.to_vec(),
        sector_predictions: result.all_predictions.clone(),
        growing_sectors: result.growing_sectors.clone(),
        declining_sectors: result.declining_sectors.clone(),
        events: result.top_5_events.clone(),
    }
}

/// What opening the panel has to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarketLoad {
    pub recommendations: bool,
    pub histogram: bool,
}

/// Server-backed state of the market analysis panel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarketAnalysis {
    recommendations: TrackedFetch<String>,
    histogram: TrackedFetch<()>,
}

impl MarketAnalysis {
    pub fn recommendations(&self) -> &FetchState<String> {
        self.recommendations.state()
    }

    pub fn histogram(&self) -> &FetchState<()> {
        self.histogram.state()
    }

    /// Image URL once a histogram is ready. The generation busts caches
    /// holding an earlier image.
    pub fn histogram_url(&self) -> Option<String> {
        self.histogram
            .state()
            .is_ready()
            .then(|| format!("{}?v={}", HISTOGRAM_PATH, self.histogram.generation()))
    }

    /// Caption of the histogram button, `None` while a render is in flight.
    pub fn histogram_button(&self) -> Option<&'static str> {
        match self.histogram.state() {
            FetchState::Failed(_) => Some("Retry"),
            FetchState::Ready(()) => Some("Remake histogram"),
            FetchState::Idle => Some("Generate histogram"),
            FetchState::Pending => None,
        }
    }

    /// Start whatever is neither loaded nor in flight.
    pub(crate) fn begin(&mut self, generation: u64) -> MarketLoad {
        let load = MarketLoad {
            recommendations: needs_fetch(self.recommendations.state()),
            histogram: needs_fetch(self.histogram.state()),
        };
        if load.recommendations {
            self.recommendations.start(generation);
        }
        if load.histogram {
            self.histogram.start(generation);
        }
        load
    }

    /// Re-render the histogram unless a render is already in flight.
    pub(crate) fn remake_histogram(&mut self, generation: u64) -> bool {
        if self.histogram.state().is_pending() {
            debug!("Histogram render already in flight");
            return false;
        }
        self.histogram.start(generation);
        true
    }

    pub(crate) fn resolve_recommendations(
        &mut self,
        generation: u64,
        reply: Result<String, String>,
    ) -> bool {
        let reply = match reply {
            Ok(text) if text.trim().is_empty() => Ok(NO_RECOMMENDATIONS.to_string()),
            Ok(text) => Ok(text),
            Err(message) => {
                debug!("Recommendations request failed: {}", message);
                Err(RECOMMENDATIONS_FAILED_MESSAGE.to_string())
            }
        };
        self.recommendations.resolve(generation, reply)
    }

    pub(crate) fn resolve_histogram(&mut self, generation: u64, reply: Result<(), String>) -> bool {
        let reply = reply.map_err(|message| {
            debug!("Histogram request failed: {}", message);
            HISTOGRAM_FAILED_MESSAGE.to_string()
        });
        self.histogram.resolve(generation, reply)
    }
}

fn needs_fetch<T>(state: &FetchState<T>) -> bool {
    matches!(state, FetchState::Idle) || state.is_failed()
}
