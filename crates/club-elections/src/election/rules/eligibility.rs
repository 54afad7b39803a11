use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::super::domain::{DisqualificationSet, MemberId, Nomination, PositionId, ReviewStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EligibilityStatus {
    Qualified,
    InsufficientNoms,
    Disqualified,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PositionFilter {
    #[default]
    All,
    Only(PositionId),
}

impl PositionFilter {
    pub fn matches(&self, position_id: &PositionId) -> bool {
        match self {
            PositionFilter::All => true,
            PositionFilter::Only(target) => target == position_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EligibilityEntry {
    pub member_id: MemberId,
    pub position_id: PositionId,
    pub distinct_nominators: usize,
    pub status: EligibilityStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EligibilityReport {
    pub threshold: usize,
    pub entries: Vec<EligibilityEntry>,
}

impl EligibilityReport {
    pub fn entry(
        &self,
        member_id: &MemberId,
        position_id: &PositionId,
    ) -> Option<&EligibilityEntry> {
        self.entries
            .iter()
            .find(|entry| &entry.member_id == member_id && &entry.position_id == position_id)
    }

    /// `None` means the member holds no approved nominations for the position.
    pub fn status(
        &self,
        member_id: &MemberId,
        position_id: &PositionId,
    ) -> Option<EligibilityStatus> {
        self.entry(member_id, position_id).map(|entry| entry.status)
    }

    pub fn is_qualified(&self, member_id: &MemberId, position_id: &PositionId) -> bool {
        self.status(member_id, position_id) == Some(EligibilityStatus::Qualified)
    }

    pub fn qualified(&self) -> impl Iterator<Item = &EligibilityEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.status == EligibilityStatus::Qualified)
    }

    pub fn for_position<'a>(
        &'a self,
        position_id: &'a PositionId,
    ) -> impl Iterator<Item = &'a EligibilityEntry> + 'a {
        self.entries
            .iter()
            .filter(move |entry| &entry.position_id == position_id)
    }

    pub fn for_member<'a>(
        &'a self,
        member_id: &'a MemberId,
    ) -> impl Iterator<Item = &'a EligibilityEntry> + 'a {
        self.entries
            .iter()
            .filter(move |entry| &entry.member_id == member_id)
    }
}

/// Counts distinct nominators per (nominee, position) over APPROVED nominations.
///
/// Repeat nominations from the same nominator count once. Pairs at or above `threshold` are
/// qualified unless the committee has disqualified them.
pub fn evaluate_eligibility<'a, I>(
    nominations: I,
    filter: &PositionFilter,
    threshold: usize,
    disqualified: &DisqualificationSet,
) -> EligibilityReport
where
    I: IntoIterator<Item = &'a Nomination>,
{
    let threshold = threshold.max(1);
    let mut nominators: BTreeMap<(&PositionId, &MemberId), BTreeSet<&MemberId>> =
        BTreeMap::new();

    for nomination in nominations {
        if nomination.review_status != ReviewStatus::Approved
            || !filter.matches(&nomination.position_id)
        {
            continue;
        }
        nominators
            .entry((&nomination.position_id, &nomination.nominee_id))
            .or_default()
            .insert(&nomination.nominator_id);
    }

    let entries = nominators
        .into_iter()
        .map(|((position_id, member_id), distinct)| {
            let distinct_nominators = distinct.len();
            let status = if distinct_nominators < threshold {
                EligibilityStatus::InsufficientNoms
            } else if disqualified.is_disqualified(member_id, position_id) {
                EligibilityStatus::Disqualified
            } else {
                EligibilityStatus::Qualified
            };

            EligibilityEntry {
                member_id: member_id.clone(),
                position_id: position_id.clone(),
                distinct_nominators,
                status,
            }
        })
        .collect();

    EligibilityReport { threshold, entries }
}
