use serde::Serialize;

use super::super::domain::{ElectionSnapshot, PositionCategory};
use super::super::rules::ElectionStandings;
use super::summary::{EngagementReport, NominatorPattern};

pub const INSIGHTS_FALLBACK: &str = "Unable to generate insights at this time.";
pub const INSIGHTS_DISABLED: &str = "Insights are disabled for this deployment.";

const MAX_OBSERVATIONS: usize = 4;
const LOW_PARTICIPATION_RATE: u32 = 25;

/// Everything an insight provider may look at. Providers never see contact details beyond
/// what the snapshot already carries, and never write back.
pub struct InsightInput<'a> {
    pub snapshot: &'a ElectionSnapshot,
    pub standings: &'a ElectionStandings,
    pub engagement: &'a EngagementReport,
}

/// Source of the committee's free-text briefing.
pub trait InsightProvider: Send + Sync {
    fn observations(&self, input: &InsightInput<'_>) -> Result<Vec<String>, InsightError>;
}

#[derive(Debug, thiserror::Error)]
pub enum InsightError {
    #[error("insights are disabled")]
    Disabled,
    #[error("insight provider unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitteeInsights {
    pub observations: Vec<String>,
    /// Set when the provider failed and `observations` holds the fixed fallback text.
    pub degraded: bool,
}

/// Asks `provider` for observations and substitutes the fixed fallback text on any failure.
pub fn insights_or_fallback(
    provider: &dyn InsightProvider,
    input: &InsightInput<'_>,
) -> CommitteeInsights {
    match provider.observations(input) {
        Ok(observations) if !observations.is_empty() => CommitteeInsights {
            observations,
            degraded: false,
        },
        Ok(_) => degraded(INSIGHTS_FALLBACK),
        Err(InsightError::Disabled) => degraded(INSIGHTS_DISABLED),
        Err(err) => {
            tracing::warn!(error = %err, "insight provider failed; serving fallback text");
            degraded(INSIGHTS_FALLBACK)
        }
    }
}

fn degraded(text: &str) -> CommitteeInsights {
    CommitteeInsights {
        observations: vec![text.to_string()],
        degraded: true,
    }
}

/// Provider used when the deployment turns insights off.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledInsights;

impl InsightProvider for DisabledInsights {
    fn observations(&self, _input: &InsightInput<'_>) -> Result<Vec<String>, InsightError> {
        Err(InsightError::Disabled)
    }
}

/// Deterministic observations about candidate gaps, succession coverage and engagement.
#[derive(Debug, Default, Clone, Copy)]
pub struct RuleBasedInsights;

impl InsightProvider for RuleBasedInsights {
    fn observations(&self, input: &InsightInput<'_>) -> Result<Vec<String>, InsightError> {
        let InsightInput {
            snapshot,
            standings,
            engagement,
        } = input;

        let mut observations = Vec::new();

        let uncovered: Vec<&str> = snapshot
            .positions
            .iter()
            .filter(|position| position.is_elected)
            .filter(|position| {
                standings
                    .roster(&position.id)
                    .map(|roster| roster.entries.is_empty())
                    .unwrap_or(true)
            })
            .map(|position| position.title.as_str())
            .collect();

        let succession_gaps: Vec<&str> = snapshot
            .positions
            .iter()
            .filter(|position| position.category == PositionCategory::Succession)
            .filter(|position| uncovered.contains(&position.title.as_str()))
            .map(|position| position.title.as_str())
            .collect();

        if !succession_gaps.is_empty() {
            observations.push(format!(
                "Succession pipeline at risk: no qualified candidate for {}",
                succession_gaps.join(", ")
            ));
        }

        if !uncovered.is_empty() {
            let shown: Vec<&str> = uncovered.iter().take(3).copied().collect();
            let remainder = uncovered.len() - shown.len();
            observations.push(format!(
                "{} position{} without a qualified candidate: {}{}",
                uncovered.len(),
                if uncovered.len() == 1 { "" } else { "s" },
                shown.join(", "),
                if remainder > 0 {
                    format!(" and {remainder} more")
                } else {
                    String::new()
                }
            ));
        }

        if engagement.total_members > 0 && engagement.participation_rate < LOW_PARTICIPATION_RATE {
            observations.push(format!(
                "Only {}% of members have nominated anyone; consider a reminder before nominations \
                 close",
                engagement.participation_rate
            ));
        }

        if engagement.pending_reviews > 0 {
            observations.push(format!(
                "{} nomination{} awaiting committee review",
                engagement.pending_reviews,
                if engagement.pending_reviews == 1 { "" } else { "s" }
            ));
        }

        let duplicates = engagement.pattern_count(NominatorPattern::Duplicate);
        if duplicates > 0 {
            observations.push(format!(
                "{duplicates} nominator{} submitted repeat nominations for the same position",
                if duplicates == 1 { "" } else { "s" }
            ));
        }

        let contested = standings
            .rosters
            .iter()
            .filter(|roster| roster.confirmed_count() > 1)
            .count();
        if contested > 0 {
            observations.push(format!(
                "{contested} contested race{} on the ballot",
                if contested == 1 { "" } else { "s" }
            ));
        }

        if observations.is_empty() {
            observations
                .push("No gaps detected; every elected position has a qualified candidate".into());
        }

        observations.truncate(MAX_OBSERVATIONS);
        Ok(observations)
    }
}
