use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::Serialize;

use super::super::domain::{
    CandidacyResponse, ElectionSnapshot, MemberId, Nomination, PositionId, Vote,
};
use super::config::ConfigurationIssue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Nomination,
    CandidacyResponse,
    Vote,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RecordKind::Nomination => "nomination",
            RecordKind::CandidacyResponse => "candidacy response",
            RecordKind::Vote => "vote",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    Member,
    Position,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceKind::Member => f.write_str("member"),
            ReferenceKind::Position => f.write_str("position"),
        }
    }
}

/// Recoverable data problems found while evaluating a snapshot.
///
/// None of these stop evaluation: the offending records are left out and the issue travels
/// with the result so callers can surface it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EvaluationIssue {
    #[error("{record} {record_id} references unknown {missing} {missing_id}")]
    MissingReference {
        record: RecordKind,
        record_id: String,
        missing: ReferenceKind,
        missing_id: String,
    },
    #[error("voter {voter_id} has {count} votes recorded for position {position_id}")]
    DuplicateVote {
        voter_id: MemberId,
        position_id: PositionId,
        count: usize,
    },
    #[error("{issue}")]
    Configuration { issue: ConfigurationIssue },
}

impl From<ConfigurationIssue> for EvaluationIssue {
    fn from(issue: ConfigurationIssue) -> Self {
        Self::Configuration { issue }
    }
}

/// Records whose member and position references all resolve.
#[derive(Debug, Default)]
pub(crate) struct ValidRecords<'a> {
    pub nominations: Vec<&'a Nomination>,
    pub responses: Vec<&'a CandidacyResponse>,
    pub votes: Vec<&'a Vote>,
}

pub(crate) fn partition_records(
    snapshot: &ElectionSnapshot,
) -> (ValidRecords<'_>, Vec<EvaluationIssue>) {
    let members: HashSet<&MemberId> = snapshot.members.iter().map(|member| &member.id).collect();
    let positions: HashSet<&PositionId> = snapshot
        .positions
        .iter()
        .map(|position| &position.id)
        .collect();

    let mut issues = Vec::new();
    let mut valid = ValidRecords::default();

    for nomination in &snapshot.nominations {
        let missing = first_missing(
            &members,
            &positions,
            &[&nomination.nominator_id, &nomination.nominee_id],
            &nomination.position_id,
        );
        match missing {
            Some((kind, id)) => issues.push(EvaluationIssue::MissingReference {
                record: RecordKind::Nomination,
                record_id: nomination.id.to_string(),
                missing: kind,
                missing_id: id,
            }),
            None => valid.nominations.push(nomination),
        }
    }

    // Responses are keyed by (member, position); the latest answer wins.
    let mut latest: BTreeMap<(&MemberId, &PositionId), &CandidacyResponse> = BTreeMap::new();
    for response in &snapshot.responses {
        if let Some((kind, id)) = first_missing(
            &members,
            &positions,
            &[&response.member_id],
            &response.position_id,
        ) {
            issues.push(EvaluationIssue::MissingReference {
                record: RecordKind::CandidacyResponse,
                record_id: response.id.to_string(),
                missing: kind,
                missing_id: id,
            });
            continue;
        }

        let key = (&response.member_id, &response.position_id);
        match latest.get(&key) {
            Some(existing) if existing.timestamp > response.timestamp => {}
            _ => {
                latest.insert(key, response);
            }
        }
    }
    valid.responses = latest.into_values().collect();

    for vote in &snapshot.votes {
        match first_missing(
            &members,
            &positions,
            &[&vote.voter_id, &vote.candidate_id],
            &vote.position_id,
        ) {
            Some((kind, id)) => issues.push(EvaluationIssue::MissingReference {
                record: RecordKind::Vote,
                record_id: vote.id.to_string(),
                missing: kind,
                missing_id: id,
            }),
            None => valid.votes.push(vote),
        }
    }

    (valid, issues)
}

fn first_missing(
    members: &HashSet<&MemberId>,
    positions: &HashSet<&PositionId>,
    member_refs: &[&MemberId],
    position_ref: &PositionId,
) -> Option<(ReferenceKind, String)> {
    if let Some(member) = member_refs.iter().find(|id| !members.contains(*id)) {
        return Some((ReferenceKind::Member, member.to_string()));
    }
    if !positions.contains(position_ref) {
        return Some((ReferenceKind::Position, position_ref.to_string()));
    }
    None
}
