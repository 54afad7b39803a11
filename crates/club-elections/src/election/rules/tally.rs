use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::Serialize;

use super::super::domain::{MemberId, Position, PositionId, Vote};
use super::unopposed::UnopposedResolution;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateTally {
    pub candidate_id: MemberId,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionTally {
    pub position_id: PositionId,
    pub total_votes: usize,
    pub ranked: Vec<CandidateTally>,
    pub is_unopposed: bool,
    /// Sole accepted candidate of an unopposed race, elected without a vote.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub declared_winner: Option<MemberId>,
    /// Plurality leader of a contested race. Not certified as elected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leading: Option<MemberId>,
    /// Votes present in the store but left out of `total_votes`.
    pub excluded_votes: usize,
}

impl PositionTally {
    pub fn has_votes(&self) -> bool {
        self.total_votes > 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateVote {
    pub voter_id: MemberId,
    pub position_id: PositionId,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TallyOutcome {
    pub positions: Vec<PositionTally>,
    pub duplicate_votes: Vec<DuplicateVote>,
}

/// Counts votes per position and ranks candidates by count, breaking ties by candidate id.
///
/// A voter with more than one vote for a position breaks the one-ballot guarantee; all of that
/// voter's votes for the position are held out of the count and reported in
/// `duplicate_votes`. Unopposed positions are settled without counting anything.
pub fn tally_votes<'a, I>(
    votes: I,
    positions: &[&Position],
    resolutions: &[UnopposedResolution],
) -> TallyOutcome
where
    I: IntoIterator<Item = &'a Vote>,
{
    let mut ballots: BTreeMap<(&PositionId, &MemberId), Vec<&MemberId>> = BTreeMap::new();
    for vote in votes {
        ballots
            .entry((&vote.position_id, &vote.voter_id))
            .or_default()
            .push(&vote.candidate_id);
    }

    let mut duplicate_votes = Vec::new();
    let mut per_position: BTreeMap<&PositionId, PositionCounts<'_>> = BTreeMap::new();
    for ((position_id, voter_id), picks) in &ballots {
        let counts = per_position.entry(*position_id).or_default();
        if picks.len() > 1 {
            duplicate_votes.push(DuplicateVote {
                voter_id: (*voter_id).clone(),
                position_id: (*position_id).clone(),
                count: picks.len(),
            });
            counts.excluded += picks.len();
            continue;
        }
        for candidate in picks {
            *counts.by_candidate.entry(*candidate).or_insert(0) += 1;
        }
    }

    let positions = positions
        .iter()
        .map(|position| {
            let resolution = resolutions
                .iter()
                .find(|resolution| resolution.position_id == position.id);
            let counts = per_position.remove(&position.id).unwrap_or_default();
            tally_position(&position.id, resolution, counts)
        })
        .collect();

    TallyOutcome {
        positions,
        duplicate_votes,
    }
}

#[derive(Default)]
struct PositionCounts<'a> {
    by_candidate: BTreeMap<&'a MemberId, usize>,
    excluded: usize,
}

fn tally_position(
    position_id: &PositionId,
    resolution: Option<&UnopposedResolution>,
    counts: PositionCounts<'_>,
) -> PositionTally {
    if let Some(resolution) = resolution.filter(|resolution| resolution.is_unopposed) {
        let stray: usize = counts.by_candidate.values().sum();
        return PositionTally {
            position_id: position_id.clone(),
            total_votes: 0,
            ranked: Vec::new(),
            is_unopposed: true,
            declared_winner: resolution.winner.clone(),
            leading: None,
            excluded_votes: counts.excluded + stray,
        };
    }

    let total_votes: usize = counts.by_candidate.values().sum();
    let mut ranked: Vec<CandidateTally> = counts
        .by_candidate
        .into_iter()
        .map(|(candidate_id, count)| CandidateTally {
            candidate_id: candidate_id.clone(),
            count,
            percentage: percentage(count, total_votes),
        })
        .collect();

    ranked.sort_by(|left, right| match right.count.cmp(&left.count) {
        Ordering::Equal => left.candidate_id.cmp(&right.candidate_id),
        other => other,
    });

    PositionTally {
        position_id: position_id.clone(),
        total_votes,
        leading: ranked.first().map(|entry| entry.candidate_id.clone()),
        ranked,
        is_unopposed: false,
        declared_winner: None,
        excluded_votes: counts.excluded,
    }
}

fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}
