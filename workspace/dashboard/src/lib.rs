//! Presentation state for the portfolio-risk dashboard.
//!
//! Nothing here renders or talks to the network. A UI shell owns one
//! [`Session`], feeds it [`Action`]s and performs the [`Effect`]s it returns;
//! panels are derived from the session on demand.

pub mod error;
pub mod explanation;
pub mod fetch;
pub mod form;
pub mod market;
pub mod panels;
pub mod session;

pub use error::{DashboardError, FormError};
pub use explanation::ExplanationCard;
pub use fetch::{FetchState, TrackedFetch};
pub use form::{FormRow, PortfolioForm};
pub use market::{GrowthPotential, MarketAnalysis, MarketLoad};
pub use panels::{FeatureCard, RiskSummary, SectorRow, Trend};
pub use session::{Action, Effect, Panel, Session};
