use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::super::domain::{MemberId, PositionId};
use super::candidacy::PositionRoster;
use super::unopposed::UnopposedResolution;

/// A voter's in-progress choices, one candidate per position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BallotSelections(BTreeMap<PositionId, MemberId>);

impl BallotSelections {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&mut self, position_id: PositionId, candidate_id: MemberId) -> &mut Self {
        self.0.insert(position_id, candidate_id);
        self
    }

    pub fn clear(&mut self, position_id: &PositionId) -> Option<MemberId> {
        self.0.remove(position_id)
    }

    pub fn get(&self, position_id: &PositionId) -> Option<&MemberId> {
        self.0.get(position_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PositionId, &MemberId)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(PositionId, MemberId)> for BallotSelections {
    fn from_iter<T: IntoIterator<Item = (PositionId, MemberId)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionProblem {
    UnknownPosition,
    NoSelectionRequired,
    NotConfirmedCandidate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvalidSelection {
    pub position_id: PositionId,
    pub candidate_id: MemberId,
    pub problem: SelectionProblem,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BallotCheck {
    pub is_complete: bool,
    pub missing_positions: Vec<PositionId>,
    pub invalid_selections: Vec<InvalidSelection>,
}

impl BallotCheck {
    /// Complete and every pick names a confirmed candidate of a contested position.
    pub fn is_valid(&self) -> bool {
        self.is_complete && self.invalid_selections.is_empty()
    }
}

/// A position needs a pick when it is contested and someone accepted candidacy.
pub fn requires_selection(roster: &PositionRoster, resolution: &UnopposedResolution) -> bool {
    !resolution.is_unopposed && roster.confirmed_count() > 0
}

pub fn check_ballot(
    selections: &BallotSelections,
    rosters: &[PositionRoster],
    resolutions: &[UnopposedResolution],
) -> BallotCheck {
    let mut missing_positions = Vec::new();
    let mut required = Vec::new();

    for roster in rosters {
        let needs_pick = resolutions
            .iter()
            .find(|resolution| resolution.position_id == roster.position_id)
            .map(|resolution| requires_selection(roster, resolution))
            .unwrap_or(false);

        if needs_pick {
            required.push(&roster.position_id);
            if selections.get(&roster.position_id).is_none() {
                missing_positions.push(roster.position_id.clone());
            }
        }
    }

    let invalid_selections = selections
        .iter()
        .filter_map(|(position_id, candidate_id)| {
            let problem = match rosters
                .iter()
                .find(|roster| &roster.position_id == position_id)
            {
                None => SelectionProblem::UnknownPosition,
                Some(_) if !required.contains(&position_id) => {
                    SelectionProblem::NoSelectionRequired
                }
                Some(roster) if !roster.is_confirmed(candidate_id) => {
                    SelectionProblem::NotConfirmedCandidate
                }
                Some(_) => return None,
            };

            Some(InvalidSelection {
                position_id: position_id.clone(),
                candidate_id: candidate_id.clone(),
                problem,
            })
        })
        .collect();

    BallotCheck {
        is_complete: missing_positions.is_empty(),
        missing_positions,
        invalid_selections,
    }
}
