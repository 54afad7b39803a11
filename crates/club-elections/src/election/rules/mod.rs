//! Election rules shared by every view: qualification, candidacy rosters, unopposed races,
//! ballot completeness, and tallying.
//!
//! Everything here is a pure function of an [`ElectionSnapshot`]. Evaluating the same snapshot
//! twice yields identical output, so callers are free to cache results per snapshot.

mod ballot;
mod candidacy;
mod config;
mod eligibility;
mod issues;
mod tally;
mod unopposed;

pub use ballot::{
    check_ballot, requires_selection, BallotCheck, BallotSelections, InvalidSelection,
    SelectionProblem,
};
pub use candidacy::{build_rosters, PositionRoster, RosterEntry};
pub use config::{ConfigurationIssue, RulesConfig, DEFAULT_NOMINATION_THRESHOLD};
pub use eligibility::{
    evaluate_eligibility, EligibilityEntry, EligibilityReport, EligibilityStatus, PositionFilter,
};
pub use issues::{EvaluationIssue, RecordKind, ReferenceKind};
pub use tally::{tally_votes, CandidateTally, DuplicateVote, PositionTally, TallyOutcome};
pub use unopposed::{resolve_unopposed, UnopposedResolution};

pub(crate) use issues::partition_records;

use std::collections::HashSet;

use serde::Serialize;

use super::domain::{ElectionSettings, ElectionSnapshot, MemberId, Position, PositionId};
use super::schedule::ElectionSchedule;

/// Applies a [`RulesConfig`] to snapshots.
#[derive(Debug, Clone)]
pub struct RulesEngine {
    config: RulesConfig,
    config_issues: Vec<ConfigurationIssue>,
}

impl RulesEngine {
    pub fn new(config: RulesConfig) -> Self {
        Self {
            config,
            config_issues: Vec::new(),
        }
    }

    /// Derives the rules from the committee's settings row, remembering any fallbacks (rules
    /// and schedule alike) so they are reported with every evaluation.
    pub fn from_settings(settings: Option<&ElectionSettings>) -> Self {
        let (config, mut config_issues) = RulesConfig::from_settings(settings);
        let (_, schedule_issues) = ElectionSchedule::from_settings(settings);
        for issue in schedule_issues {
            if !config_issues.contains(&issue) {
                config_issues.push(issue);
            }
        }
        Self {
            config,
            config_issues,
        }
    }

    pub fn config(&self) -> &RulesConfig {
        &self.config
    }

    pub fn config_issues(&self) -> &[ConfigurationIssue] {
        &self.config_issues
    }

    pub fn evaluate(
        &self,
        snapshot: &ElectionSnapshot,
        filter: &PositionFilter,
    ) -> ElectionStandings {
        let (valid, mut issues) = partition_records(snapshot);
        issues.splice(
            0..0,
            self.config_issues.iter().cloned().map(EvaluationIssue::from),
        );

        let positions: Vec<&Position> = snapshot
            .positions
            .iter()
            .filter(|position| filter.matches(&position.id))
            .collect();

        let eligibility = evaluate_eligibility(
            valid.nominations.iter().copied(),
            filter,
            self.config.nomination_threshold,
            &snapshot.disqualifications,
        );
        let rosters = build_rosters(
            &positions,
            &eligibility,
            valid.responses.iter().copied(),
            &snapshot.members,
        );
        let resolutions = rosters.iter().map(resolve_unopposed).collect();

        ElectionStandings {
            threshold: eligibility.threshold,
            eligibility,
            rosters,
            resolutions,
            issues,
        }
    }

    pub fn check_ballot(
        &self,
        standings: &ElectionStandings,
        selections: &BallotSelections,
    ) -> BallotCheck {
        check_ballot(selections, &standings.rosters, &standings.resolutions)
    }

    /// Tallies the snapshot's votes against standings evaluated over all positions.
    pub fn tally(
        &self,
        snapshot: &ElectionSnapshot,
        standings: &ElectionStandings,
    ) -> ElectionResults {
        let (valid, _) = partition_records(snapshot);
        let positions: Vec<&Position> = snapshot
            .positions
            .iter()
            .filter(|position| standings.roster(&position.id).is_some())
            .collect();

        let outcome = tally_votes(
            valid.votes.iter().copied(),
            &positions,
            &standings.resolutions,
        );

        let mut issues = standings.issues.clone();
        issues.extend(outcome.duplicate_votes.iter().map(|duplicate| {
            EvaluationIssue::DuplicateVote {
                voter_id: duplicate.voter_id.clone(),
                position_id: duplicate.position_id.clone(),
                count: duplicate.count,
            }
        }));

        let unique_voters = valid
            .votes
            .iter()
            .map(|vote| &vote.voter_id)
            .collect::<HashSet<&MemberId>>()
            .len();

        ElectionResults {
            total_votes_cast: valid.votes.len(),
            unique_voters,
            turnout: rounded_rate(unique_voters, snapshot.members.len()),
            positions: outcome.positions,
            duplicate_votes: outcome.duplicate_votes,
            issues,
        }
    }
}

impl Default for RulesEngine {
    fn default() -> Self {
        Self::new(RulesConfig::default())
    }
}

/// Qualification, rosters, and unopposed status for the evaluated positions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElectionStandings {
    pub threshold: usize,
    pub eligibility: EligibilityReport,
    pub rosters: Vec<PositionRoster>,
    pub resolutions: Vec<UnopposedResolution>,
    pub issues: Vec<EvaluationIssue>,
}

impl ElectionStandings {
    pub fn roster(&self, position_id: &PositionId) -> Option<&PositionRoster> {
        self.rosters
            .iter()
            .find(|roster| &roster.position_id == position_id)
    }

    pub fn resolution(&self, position_id: &PositionId) -> Option<&UnopposedResolution> {
        self.resolutions
            .iter()
            .find(|resolution| &resolution.position_id == position_id)
    }

    pub fn is_unopposed(&self, position_id: &PositionId) -> bool {
        self.resolution(position_id)
            .map(|resolution| resolution.is_unopposed)
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElectionResults {
    pub total_votes_cast: usize,
    pub unique_voters: usize,
    /// Unique voters as a rounded percentage of the membership.
    pub turnout: u32,
    pub positions: Vec<PositionTally>,
    pub duplicate_votes: Vec<DuplicateVote>,
    pub issues: Vec<EvaluationIssue>,
}

impl ElectionResults {
    pub fn position(&self, position_id: &PositionId) -> Option<&PositionTally> {
        self.positions
            .iter()
            .find(|tally| &tally.position_id == position_id)
    }
}

pub(crate) fn rounded_rate(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        0
    } else {
        (part as f64 / whole as f64 * 100.0).round() as u32
    }
}
