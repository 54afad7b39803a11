use serde::Serialize;

use super::super::domain::{MemberId, PositionId};
use super::candidacy::PositionRoster;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnopposedResolution {
    pub position_id: PositionId,
    pub is_unopposed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<MemberId>,
}

/// A race is unopposed only when exactly one candidate accepted and nobody else is still
/// active. A second qualified candidate who has not answered keeps the race open.
pub fn resolve_unopposed(roster: &PositionRoster) -> UnopposedResolution {
    let is_unopposed = roster.confirmed_count() == 1 && roster.active_count() == 1;
    let winner = if is_unopposed {
        roster.confirmed().next().map(|entry| entry.candidate_id.clone())
    } else {
        None
    };

    UnopposedResolution {
        position_id: roster.position_id.clone(),
        is_unopposed,
        winner,
    }
}
