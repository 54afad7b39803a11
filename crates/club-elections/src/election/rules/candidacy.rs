use std::collections::HashMap;

use serde::Serialize;

use super::super::domain::{
    CandidacyResponse, Member, MemberId, Position, PositionId, ResponseStatus,
};
use super::eligibility::{EligibilityReport, EligibilityStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterEntry {
    pub candidate_id: MemberId,
    pub name: String,
    pub nomination_count: usize,
    pub response_status: ResponseStatus,
}

/// Qualified candidates for one position together with their candidacy answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PositionRoster {
    pub position_id: PositionId,
    pub entries: Vec<RosterEntry>,
}

impl PositionRoster {
    /// Candidates who accepted; these are the names that appear on the ballot.
    pub fn confirmed(&self) -> impl Iterator<Item = &RosterEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.response_status == ResponseStatus::Accepted)
    }

    pub fn confirmed_count(&self) -> usize {
        self.confirmed().count()
    }

    /// Candidates still in contention: accepted or yet to answer.
    pub fn active_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.response_status.is_active())
            .count()
    }

    pub fn is_confirmed(&self, candidate_id: &MemberId) -> bool {
        self.confirmed()
            .any(|entry| &entry.candidate_id == candidate_id)
    }
}

/// Merges the qualified set with responses into one roster per position, in position order.
///
/// A qualified pair without a response is `Pending`. Disqualified and under-threshold nominees
/// never reach the roster.
pub fn build_rosters<'a, I>(
    positions: &[&Position],
    eligibility: &EligibilityReport,
    responses: I,
    members: &[Member],
) -> Vec<PositionRoster>
where
    I: IntoIterator<Item = &'a CandidacyResponse>,
{
    let mut answers: HashMap<(&MemberId, &PositionId), &CandidacyResponse> = HashMap::new();
    for response in responses {
        let key = (&response.member_id, &response.position_id);
        match answers.get(&key) {
            Some(existing) if existing.timestamp > response.timestamp => {}
            _ => {
                answers.insert(key, response);
            }
        }
    }

    let names: HashMap<&MemberId, &str> = members
        .iter()
        .map(|member| (&member.id, member.name.as_str()))
        .collect();

    positions
        .iter()
        .map(|position| {
            let entries = eligibility
                .for_position(&position.id)
                .filter(|entry| entry.status == EligibilityStatus::Qualified)
                .map(|entry| RosterEntry {
                    candidate_id: entry.member_id.clone(),
                    name: names
                        .get(&entry.member_id)
                        .map(|name| name.to_string())
                        .unwrap_or_else(|| "Unknown".to_string()),
                    nomination_count: entry.distinct_nominators,
                    response_status: answers
                        .get(&(&entry.member_id, &entry.position_id))
                        .map(|response| response.status)
                        .unwrap_or(ResponseStatus::Pending),
                })
                .collect();

            PositionRoster {
                position_id: position.id.clone(),
                entries,
            }
        })
        .collect()
}
