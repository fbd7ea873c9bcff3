use crate::error::DashboardError;
use crate::explanation::ExplanationCard;
use crate::market::{self, GrowthPotential, MarketAnalysis};
use crate::panels::{self, FeatureCard, RiskSummary, SectorRow};
use common::{AnalysisResult, ExplainRequest, ImpactfulEvent, PortfolioEntry, RecommendationRequest};
use log::{debug, info, warn};
use std::collections::HashMap;

/// Detail panels reachable from the dashboard's feature cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Panel {
    SectorGrowth,
    ImportantEvents,
    MarketAnalysis,
}

/// Everything that can change the session.
///
/// Replies carry the generation of the effect that asked for them.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// The form was submitted with these entries
    PortfolioSubmitted(Vec<PortfolioEntry>),
    /// The prediction endpoint answered
    ResultReceived { submission: u64, result: AnalysisResult },
    /// The prediction endpoint failed; the message is shown next to the form
    SubmissionFailed { submission: u64, message: String },
    OpenPanel(Panel),
    BackToDashboard,
    /// The "Explain why" / "Clear Response" button of an event card
    ExplainToggled { event: String },
    ExplanationLoaded { event: String, generation: u64, text: String },
    ExplanationFailed { event: String, generation: u64, message: String },
    RecommendationsLoaded { generation: u64, text: String },
    RecommendationsFailed { generation: u64, message: String },
    HistogramGenerated { generation: u64 },
    HistogramFailed { generation: u64, message: String },
    /// The histogram's "Retry" / "Remake histogram" button
    RemakeHistogram,
    Reset,
}

/// Work the UI shell must perform after applying an action.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    /// POST the entries to the portfolio processing endpoint, then report back
    /// with the same submission
    ProcessPortfolio {
        submission: u64,
        entries: Vec<PortfolioEntry>,
    },
    /// POST the request to the explanation endpoint, then report back with
    /// the same event and generation
    FetchExplanation {
        event: String,
        generation: u64,
        request: ExplainRequest,
    },
    /// Fetch what the market analysis panel is missing: POST `recommendations`
    /// to the recommendations endpoint when set, and render the histogram
    /// when `histogram` is set. Both report back with `generation`.
    LoadMarketAnalysis {
        generation: u64,
        recommendations: Option<RecommendationRequest>,
        histogram: bool,
    },
    /// GET the histogram endpoint, then report back with `generation`
    GenerateHistogram { generation: u64 },
}

/// Session-lifetime state of one dashboard user.
///
/// The analysis result is always the one produced for `portfolio`: a new
/// submission discards the previous result, and replies to any request but
/// the latest are dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    portfolio: Vec<PortfolioEntry>,
    result: Option<AnalysisResult>,
    pending_submission: Option<u64>,
    submission_error: Option<String>,
    active_panel: Option<Panel>,
    explanations: HashMap<String, ExplanationCard>,
    market: MarketAnalysis,
    /// Last generation handed to a request. Survives resubmission and reset.
    last_generation: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_generation(&mut self) -> u64 {
        self.last_generation += 1;
        self.last_generation
    }

    pub fn apply(&mut self, action: Action) -> Effect {
        debug!("Applying action: {:?}", action);
        match action {
            Action::PortfolioSubmitted(entries) => {
                info!("Submitting portfolio with {} entries", entries.len());
                let submission = self.next_generation();
                self.portfolio = entries.clone();
                self.result = None;
                self.explanations.clear();
                self.market = MarketAnalysis::default();
                self.active_panel = None;
                self.pending_submission = Some(submission);
                self.submission_error = None;
                Effect::ProcessPortfolio {
                    submission,
                    entries,
                }
            }
            Action::ResultReceived { submission, result } => {
                if self.pending_submission != Some(submission) {
                    warn!("Ignoring analysis result for stale submission {}", submission);
                    return Effect::None;
                }
                self.pending_submission = None;
                self.result = Some(result);
                Effect::None
            }
            Action::SubmissionFailed {
                submission,
                message,
            } => {
                if self.pending_submission != Some(submission) {
                    warn!("Ignoring failure of stale submission {}", submission);
                    return Effect::None;
                }
                self.pending_submission = None;
                self.submission_error = Some(message);
                Effect::None
            }
            Action::OpenPanel(panel) => {
                if self.result.is_none() {
                    warn!("Cannot open {:?} without an analysis result", panel);
                    return Effect::None;
                }
                self.active_panel = Some(panel);
                match panel {
                    Panel::MarketAnalysis => self.load_market_analysis(),
                    Panel::SectorGrowth | Panel::ImportantEvents => Effect::None,
                }
            }
            Action::BackToDashboard => {
                self.active_panel = None;
                Effect::None
            }
            Action::ExplainToggled { event } => self.toggle_explanation(event),
            Action::ExplanationLoaded {
                event,
                generation,
                text,
            } => {
                if let Some(card) = self.explanations.get_mut(&event) {
                    card.resolve(generation, Ok(text));
                }
                Effect::None
            }
            Action::ExplanationFailed {
                event,
                generation,
                message,
            } => {
                if let Some(card) = self.explanations.get_mut(&event) {
                    card.resolve(generation, Err(message));
                }
                Effect::None
            }
            Action::RecommendationsLoaded { generation, text } => {
                self.market.resolve_recommendations(generation, Ok(text));
                Effect::None
            }
            Action::RecommendationsFailed {
                generation,
                message,
            } => {
                self.market.resolve_recommendations(generation, Err(message));
                Effect::None
            }
            Action::HistogramGenerated { generation } => {
                self.market.resolve_histogram(generation, Ok(()));
                Effect::None
            }
            Action::HistogramFailed {
                generation,
                message,
            } => {
                self.market.resolve_histogram(generation, Err(message));
                Effect::None
            }
            Action::RemakeHistogram => {
                if self.result.is_none() {
                    warn!("Histogram requested without an analysis result");
                    return Effect::None;
                }
                let generation = self.next_generation();
                if self.market.remake_histogram(generation) {
                    Effect::GenerateHistogram { generation }
                } else {
                    Effect::None
                }
            }
            Action::Reset => {
                *self = Self {
                    last_generation: self.last_generation,
                    ..Self::default()
                };
                Effect::None
            }
        }
    }

    fn load_market_analysis(&mut self) -> Effect {
        let generation = self.next_generation();
        let load = self.market.begin(generation);
        if !load.recommendations && !load.histogram {
            return Effect::None;
        }
        let recommendations = match (&self.result, load.recommendations) {
            (Some(result), true) => Some(market::recommendation_request(&self.portfolio, result)),
            _ => None,
        };
        Effect::LoadMarketAnalysis {
            generation,
            recommendations,
            histogram: load.histogram,
        }
    }

    fn toggle_explanation(&mut self, event: String) -> Effect {
        let Some(result) = &self.result else {
            warn!("Explanation requested without an analysis result");
            return Effect::None;
        };
        if !result.top_5_events.iter().any(|e| e.event == event) {
            warn!("Explanation requested for unknown event: {}", event);
            return Effect::None;
        }

        let request = ExplainRequest {
            event: event.clone(),
            portfolio: self.portfolio.clone(),
            sector_predictions: result.all_predictions.clone(),
        };
        let generation = self.next_generation();
        let card = self.explanations.entry(event.clone()).or_default();
        match card.toggle(generation) {
            Some(generation) => Effect::FetchExplanation {
                event,
                generation,
                request,
            },
            None => Effect::None,
        }
    }

    pub fn portfolio(&self) -> &[PortfolioEntry] {
        &self.portfolio
    }

    pub fn is_submitting(&self) -> bool {
        self.pending_submission.is_some()
    }

    pub fn submission_error(&self) -> Option<&str> {
        self.submission_error.as_deref()
    }

    pub fn active_panel(&self) -> Option<Panel> {
        self.active_panel
    }

    pub fn result(&self) -> Result<&AnalysisResult, DashboardError> {
        self.result.as_ref().ok_or(DashboardError::NoResult)
    }

    pub fn risk_summary(&self) -> Result<RiskSummary, DashboardError> {
        self.result().map(RiskSummary::for_result)
    }

    pub fn sector_rows(&self) -> Result<Vec<SectorRow>, DashboardError> {
        self.result().map(panels::sector_rows)
    }

    pub fn sorted_events(&self) -> Result<Vec<&ImpactfulEvent>, DashboardError> {
        self.result().map(panels::sorted_events)
    }

    pub fn feature_cards(&self) -> Result<[FeatureCard; 3], DashboardError> {
        self.result().map(panels::feature_cards)
    }

    pub fn growth_potential(&self) -> Result<Option<GrowthPotential>, DashboardError> {
        self.result().map(market::growth_potential)
    }

    pub fn market_analysis(&self) -> Result<&MarketAnalysis, DashboardError> {
        self.result().map(|_| &self.market)
    }

    /// Card state for an event of the current result.
    pub fn explanation(&self, event: &str) -> Result<ExplanationCard, DashboardError> {
        let result = self.result()?;
        if !result.top_5_events.iter().any(|e| e.event == event) {
            return Err(DashboardError::UnknownEvent(event.to_string()));
        }
        Ok(self.explanations.get(event).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FetchState;

    fn analysis() -> AnalysisResult {
        serde_json::from_value(serde_json::json!({
            "top_5_events": [
                {"event": "Oil supply shock", "impact": 0.91},
                {"event": "Chip export limits", "impact": 0.12}
            ],
            "all_predictions": {"energy": 1.5, "information_technology": -0.4}
        }))
        .unwrap()
    }

    fn submit(session: &mut Session, ticker: &str) -> u64 {
        match session.apply(Action::PortfolioSubmitted(vec![PortfolioEntry::new(ticker, "10")])) {
            Effect::ProcessPortfolio { submission, .. } => submission,
            other => panic!("Expected a process effect, got {:?}", other),
        }
    }

    fn session_with_result() -> Session {
        let mut session = Session::new();
        let submission = submit(&mut session, "AAPL");
        session.apply(Action::ResultReceived {
            submission,
            result: analysis(),
        });
        session
    }

    fn explain(session: &mut Session, event: &str) -> (u64, ExplainRequest) {
        match session.apply(Action::ExplainToggled {
            event: event.to_string(),
        }) {
            Effect::FetchExplanation {
                generation,
                request,
                ..
            } => (generation, request),
            other => panic!("Expected a fetch effect, got {:?}", other),
        }
    }

    #[test]
    fn test_views_fail_without_result() {
        let session = Session::new();
        assert_eq!(session.risk_summary().unwrap_err(), DashboardError::NoResult);
        assert_eq!(session.market_analysis().unwrap_err(), DashboardError::NoResult);
        assert_eq!(
            session.result().unwrap_err().to_string(),
            "No result available yet. Please submit your portfolio first."
        );
    }

    #[test]
    fn test_submission_emits_process_effect() {
        let mut session = Session::new();
        let entries = vec![PortfolioEntry::new("AAPL", "10")];

        let effect = session.apply(Action::PortfolioSubmitted(entries.clone()));

        assert_eq!(
            effect,
            Effect::ProcessPortfolio {
                submission: 1,
                entries: entries.clone()
            }
        );
        assert!(session.is_submitting());
        assert_eq!(session.portfolio(), entries.as_slice());
    }

    #[test]
    fn test_new_submission_discards_previous_result() {
        let mut session = session_with_result();

        submit(&mut session, "MSFT");

        assert!(session.result().is_err());
        assert_eq!(session.portfolio()[0].ticker, "MSFT");
    }

    #[test]
    fn test_unsolicited_result_is_ignored() {
        let mut session = Session::new();
        session.apply(Action::ResultReceived {
            submission: 1,
            result: analysis(),
        });
        assert!(session.result().is_err());
    }

    #[test]
    fn test_result_of_superseded_submission_is_ignored() {
        let mut session = Session::new();
        let aapl = submit(&mut session, "AAPL");
        let xom = submit(&mut session, "XOM");

        session.apply(Action::ResultReceived {
            submission: aapl,
            result: analysis(),
        });
        assert!(session.is_submitting());
        assert_eq!(session.result().unwrap_err(), DashboardError::NoResult);

        session.apply(Action::SubmissionFailed {
            submission: aapl,
            message: "Python script failed".to_string(),
        });
        assert_eq!(session.submission_error(), None);

        session.apply(Action::ResultReceived {
            submission: xom,
            result: analysis(),
        });
        assert!(!session.is_submitting());
        assert_eq!(session.portfolio()[0].ticker, "XOM");
        assert_eq!(session.result().unwrap().all_predictions["energy"], 1.5);
    }

    #[test]
    fn test_submission_failure_is_recorded() {
        let mut session = Session::new();
        let submission = submit(&mut session, "AAPL");
        session.apply(Action::SubmissionFailed {
            submission,
            message: "Python script failed".to_string(),
        });

        assert!(!session.is_submitting());
        assert_eq!(session.submission_error(), Some("Python script failed"));
    }

    #[test]
    fn test_panels_open_and_close() {
        let mut session = session_with_result();

        assert_eq!(session.apply(Action::OpenPanel(Panel::SectorGrowth)), Effect::None);
        assert_eq!(session.active_panel(), Some(Panel::SectorGrowth));

        session.apply(Action::BackToDashboard);
        assert_eq!(session.active_panel(), None);
    }

    #[test]
    fn test_panel_needs_result() {
        let mut session = Session::new();
        session.apply(Action::OpenPanel(Panel::ImportantEvents));
        assert_eq!(session.active_panel(), None);
    }

    #[test]
    fn test_explain_round_trip() {
        let mut session = session_with_result();
        let event = "Oil supply shock".to_string();

        let (generation, request) = explain(&mut session, &event);
        assert_eq!(request.portfolio, vec![PortfolioEntry::new("AAPL", "10")]);
        assert_eq!(request.sector_predictions["energy"], 1.5);

        session.apply(Action::ExplanationLoaded {
            event: event.clone(),
            generation,
            text: "Higher oil prices lift energy.".to_string(),
        });
        let card = session.explanation(&event).unwrap();
        assert_eq!(
            card.state(),
            &FetchState::Ready("Higher oil prices lift energy.".to_string())
        );

        assert_eq!(session.apply(Action::ExplainToggled { event: event.clone() }), Effect::None);
        assert_eq!(session.explanation(&event).unwrap().state(), &FetchState::Idle);
    }

    #[test]
    fn test_retrigger_drops_earlier_reply() {
        let mut session = session_with_result();
        let event = "Chip export limits";

        let (first, _) = explain(&mut session, event);
        explain(&mut session, event);
        session.apply(Action::ExplanationLoaded {
            event: event.to_string(),
            generation: first,
            text: "stale".to_string(),
        });

        assert!(session.explanation(event).unwrap().state().is_pending());
    }

    #[test]
    fn test_explanation_from_previous_portfolio_is_dropped() {
        let mut session = session_with_result();
        let event = "Oil supply shock";
        let (old_generation, _) = explain(&mut session, event);

        let submission = submit(&mut session, "XOM");
        session.apply(Action::ResultReceived {
            submission,
            result: analysis(),
        });
        let (new_generation, request) = explain(&mut session, event);
        assert_ne!(new_generation, old_generation);
        assert_eq!(request.portfolio[0].ticker, "XOM");

        session.apply(Action::ExplanationLoaded {
            event: event.to_string(),
            generation: old_generation,
            text: "about the AAPL portfolio".to_string(),
        });

        assert!(session.explanation(event).unwrap().state().is_pending());
    }

    #[test]
    fn test_explain_unknown_event() {
        let mut session = session_with_result();

        let effect = session.apply(Action::ExplainToggled {
            event: "Not in the result".to_string(),
        });

        assert_eq!(effect, Effect::None);
        assert_eq!(
            session.explanation("Not in the result").unwrap_err(),
            DashboardError::UnknownEvent("Not in the result".to_string())
        );
    }

    #[test]
    fn test_market_analysis_loads_on_open() {
        let mut session = session_with_result();

        let effect = session.apply(Action::OpenPanel(Panel::MarketAnalysis));
        let (generation, request) = match effect {
            Effect::LoadMarketAnalysis {
                generation,
                recommendations: Some(request),
                histogram: true,
            } => (generation, request),
            other => panic!("Expected a market load effect, got {:?}", other),
        };
        assert_eq!(request.portfolio, vec![PortfolioEntry::new("AAPL", "10")]);
        assert_eq!(request.events.len(), 2);

        session.apply(Action::RecommendationsLoaded {
            generation,
            text: "Rebalance toward energy.".to_string(),
        });
        session.apply(Action::HistogramGenerated { generation });

        let market = session.market_analysis().unwrap();
        assert_eq!(
            market.recommendations().ready().map(String::as_str),
            Some("Rebalance toward energy.")
        );
        assert!(market.histogram_url().is_some());

        session.apply(Action::BackToDashboard);
        assert_eq!(session.apply(Action::OpenPanel(Panel::MarketAnalysis)), Effect::None);
    }

    #[test]
    fn test_histogram_failure_then_remake() {
        let mut session = session_with_result();
        let generation = match session.apply(Action::OpenPanel(Panel::MarketAnalysis)) {
            Effect::LoadMarketAnalysis { generation, .. } => generation,
            other => panic!("Expected a market load effect, got {:?}", other),
        };
        session.apply(Action::HistogramFailed {
            generation,
            message: "HTTP 500".to_string(),
        });
        assert_eq!(
            session.market_analysis().unwrap().histogram_button(),
            Some("Retry")
        );

        let retry = match session.apply(Action::RemakeHistogram) {
            Effect::GenerateHistogram { generation } => generation,
            other => panic!("Expected a histogram effect, got {:?}", other),
        };
        assert!(retry > generation);
        assert_eq!(session.apply(Action::RemakeHistogram), Effect::None);

        session.apply(Action::HistogramGenerated { generation: retry });
        assert!(session.market_analysis().unwrap().histogram().is_ready());
    }

    #[test]
    fn test_market_replies_from_previous_portfolio_are_dropped() {
        let mut session = session_with_result();
        let old = match session.apply(Action::OpenPanel(Panel::MarketAnalysis)) {
            Effect::LoadMarketAnalysis { generation, .. } => generation,
            other => panic!("Expected a market load effect, got {:?}", other),
        };

        let submission = submit(&mut session, "XOM");
        session.apply(Action::ResultReceived {
            submission,
            result: analysis(),
        });
        session.apply(Action::OpenPanel(Panel::MarketAnalysis));
        session.apply(Action::RecommendationsLoaded {
            generation: old,
            text: "about the AAPL portfolio".to_string(),
        });

        assert!(session.market_analysis().unwrap().recommendations().is_pending());
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut session = session_with_result();
        explain(&mut session, "Oil supply shock");

        session.apply(Action::Reset);

        assert!(session.result().is_err());
        assert!(session.portfolio().is_empty());
        assert!(!session.is_submitting());
        assert_eq!(session.active_panel(), None);
    }

    #[test]
    fn test_reply_from_before_reset_is_dropped() {
        let mut session = Session::new();
        let before = submit(&mut session, "AAPL");
        session.apply(Action::Reset);
        let after = submit(&mut session, "XOM");
        assert_ne!(before, after);

        session.apply(Action::ResultReceived {
            submission: before,
            result: analysis(),
        });

        assert!(session.is_submitting());
        assert!(session.result().is_err());
    }
}
