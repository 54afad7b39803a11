//! Committee-facing reporting: nominator engagement, CSV export, and the insight briefing.

mod export;
mod insights;
mod summary;

pub use export::{engagement_csv, ExportError};
pub use insights::{
    insights_or_fallback, CommitteeInsights, DisabledInsights, InsightError, InsightInput,
    InsightProvider, RuleBasedInsights, INSIGHTS_DISABLED, INSIGHTS_FALLBACK,
};
pub use summary::{
    aggregate_engagement, EngagementReport, NominatorEngagement, NominatorPattern,
    PositionBreakdown,
};
