use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;

use super::super::domain::{ElectionSnapshot, MemberId, PositionId, ReviewStatus};
use super::super::rules::{partition_records, rounded_rate, ElectionStandings, EvaluationIssue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NominatorPattern {
    /// Two or more nominations for the same position.
    Duplicate,
    /// One nomination for every position on the ballot.
    Full,
    /// Some positions but not all.
    Partial,
}

impl NominatorPattern {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Duplicate => "Mistaken/duplicate",
            Self::Full => "Full slate",
            Self::Partial => "Partial slate",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NominatorEngagement {
    pub nominator_id: MemberId,
    pub positions_nominated: usize,
    pub pattern: NominatorPattern,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PositionBreakdown {
    pub position_id: PositionId,
    pub title: String,
    pub total_nominations: usize,
    pub approved: usize,
    pub qualified_candidates: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngagementReport {
    pub total_members: usize,
    pub total_nominations: usize,
    pub distinct_nominators: usize,
    /// Distinct nominators as a rounded percentage of the membership.
    pub participation_rate: u32,
    pub full_slate: usize,
    pub partial_slate: usize,
    pub duplicate: usize,
    /// Members qualified for at least one position.
    pub qualified_candidates: usize,
    pub pending_reviews: usize,
    pub positions: Vec<PositionBreakdown>,
    pub nominators: Vec<NominatorEngagement>,
    /// Orphaned records left out of every count above.
    pub skipped_records: usize,
    pub issues: Vec<EvaluationIssue>,
}

impl EngagementReport {
    pub fn position(&self, position_id: &PositionId) -> Option<&PositionBreakdown> {
        self.positions
            .iter()
            .find(|breakdown| &breakdown.position_id == position_id)
    }

    pub fn pattern_count(&self, pattern: NominatorPattern) -> usize {
        match pattern {
            NominatorPattern::Duplicate => self.duplicate,
            NominatorPattern::Full => self.full_slate,
            NominatorPattern::Partial => self.partial_slate,
        }
    }
}

/// Classifies every nominator and summarises nominations per position.
///
/// `standings` must cover all positions; its qualified set feeds the per-position candidate
/// lists so the report and the ballot never disagree about who qualified.
pub fn aggregate_engagement(
    snapshot: &ElectionSnapshot,
    standings: &ElectionStandings,
) -> EngagementReport {
    let (valid, issues) = partition_records(snapshot);
    let skipped_records = issues
        .iter()
        .filter(|issue| matches!(issue, EvaluationIssue::MissingReference { .. }))
        .count();

    let mut per_nominator: BTreeMap<&MemberId, BTreeMap<&PositionId, usize>> = BTreeMap::new();
    for nomination in &valid.nominations {
        *per_nominator
            .entry(&nomination.nominator_id)
            .or_default()
            .entry(&nomination.position_id)
            .or_insert(0) += 1;
    }

    let ballot_size = snapshot.positions.len();
    let nominators: Vec<NominatorEngagement> = per_nominator
        .into_iter()
        .map(|(nominator_id, counts)| {
            let pattern = if counts.values().any(|count| *count >= 2) {
                NominatorPattern::Duplicate
            } else if counts.len() >= ballot_size && ballot_size > 0 {
                NominatorPattern::Full
            } else {
                NominatorPattern::Partial
            };

            NominatorEngagement {
                nominator_id: nominator_id.clone(),
                positions_nominated: counts.len(),
                pattern,
            }
        })
        .collect();

    let names: HashMap<&MemberId, &str> = snapshot
        .members
        .iter()
        .map(|member| (&member.id, member.name.as_str()))
        .collect();

    let positions = snapshot
        .positions
        .iter()
        .map(|position| {
            let for_position = valid
                .nominations
                .iter()
                .filter(|nomination| nomination.position_id == position.id);
            let total_nominations = for_position.clone().count();
            let approved = for_position
                .filter(|nomination| nomination.review_status == ReviewStatus::Approved)
                .count();
            let qualified_candidates = standings
                .eligibility
                .qualified()
                .filter(|entry| entry.position_id == position.id)
                .map(|entry| {
                    names
                        .get(&entry.member_id)
                        .map(|name| name.to_string())
                        .unwrap_or_else(|| entry.member_id.to_string())
                })
                .collect();

            PositionBreakdown {
                position_id: position.id.clone(),
                title: position.title.clone(),
                total_nominations,
                approved,
                qualified_candidates,
            }
        })
        .collect();

    let qualified_candidates = standings
        .eligibility
        .qualified()
        .map(|entry| &entry.member_id)
        .collect::<BTreeSet<_>>()
        .len();
    let pending_reviews = valid
        .nominations
        .iter()
        .filter(|nomination| nomination.review_status == ReviewStatus::Pending)
        .count();

    let count = |pattern: NominatorPattern| {
        nominators
            .iter()
            .filter(|nominator| nominator.pattern == pattern)
            .count()
    };

    EngagementReport {
        total_members: snapshot.members.len(),
        total_nominations: valid.nominations.len(),
        distinct_nominators: nominators.len(),
        participation_rate: rounded_rate(nominators.len(), snapshot.members.len()),
        full_slate: count(NominatorPattern::Full),
        partial_slate: count(NominatorPattern::Partial),
        duplicate: count(NominatorPattern::Duplicate),
        qualified_candidates,
        pending_reviews,
        positions,
        nominators,
        skipped_records,
        issues,
    }
}
