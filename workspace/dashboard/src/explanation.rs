use crate::fetch::{FetchState, TrackedFetch};
use log::debug;

/// Shown when the explanation request fails.
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch explanation. Please try again.";
pub const NO_EXPLANATION: &str = "No explanation available.";

/// "Explain why" state of one event card.
///
/// The owner hands out the generation of every fetch, so a re-triggered card
/// never shows the answer of an earlier request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExplanationCard {
    fetch: TrackedFetch<String>,
}

impl ExplanationCard {
    pub fn state(&self) -> &FetchState<String> {
        self.fetch.state()
    }

    pub fn generation(&self) -> u64 {
        self.fetch.generation()
    }

    /// Button caption for the current state.
    pub fn button_label(&self) -> &'static str {
        if self.state().is_ready() {
            "Clear Response"
        } else {
            "Explain why"
        }
    }

    /// Toggle the card. Returns `generation` when a fetch should be issued
    /// under it, or `None` when the shown explanation was cleared instead.
    pub fn toggle(&mut self, generation: u64) -> Option<u64> {
        if self.state().is_ready() {
            self.fetch.clear();
            return None;
        }
        self.fetch.start(generation);
        Some(generation)
    }

    /// Store a reply. Returns false if the reply was stale and dropped.
    pub fn resolve(&mut self, generation: u64, reply: Result<String, String>) -> bool {
        let reply = match reply {
            Ok(text) if text.trim().is_empty() => Ok(NO_EXPLANATION.to_string()),
            Ok(text) => Ok(text),
            Err(message) => {
                debug!("Explanation request failed: {}", message);
                Err(FETCH_FAILED_MESSAGE.to_string())
            }
        };
        self.fetch.resolve(generation, reply)
    }
}
