use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Identifier of a club member as issued by the member directory.
    MemberId
);
string_id!(
    /// Short code of an elected position, e.g. `sec` or `pn`.
    PositionId
);
string_id!(NominationId);
string_id!(ResponseId);
string_id!(VoteId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemberRole {
    Member,
    Committee,
}

/// Directory record for a club member. Imported externally and never mutated here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: MemberId,
    pub name: String,
    pub rotary_id: String,
    pub email: String,
    pub phone: String,
    pub is_good_standing: bool,
    pub role: MemberRole,
}

impl Member {
    pub fn is_committee(&self) -> bool {
        self.role == MemberRole::Committee
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PositionCategory {
    Executive,
    Director,
    Succession,
}

impl PositionCategory {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Executive => "Executive Board",
            Self::Director => "Directors",
            Self::Succession => "Succession",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PositionStatus {
    Open,
    Filled,
    Appointed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub id: PositionId,
    pub title: String,
    pub category: PositionCategory,
    pub description: String,
    pub is_elected: bool,
    pub status: PositionStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewStatus {
    Pending,
    Approved,
    Rejected,
}

impl ReviewStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        }
    }

    /// Review decisions only ever move out of `Pending`.
    pub fn can_transition_to(self, next: ReviewStatus) -> bool {
        self == ReviewStatus::Pending && next != ReviewStatus::Pending
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Nomination {
    pub id: NominationId,
    pub nominator_id: MemberId,
    pub nominee_id: MemberId,
    pub position_id: PositionId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statement: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub is_self_nomination: bool,
    pub review_status: ReviewStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseStatus {
    Accepted,
    Declined,
    Pending,
}

impl ResponseStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Accepted => "ACCEPTED",
            Self::Declined => "DECLINED",
            Self::Pending => "PENDING",
        }
    }

    /// Accepted and not-yet-answered candidates are both still in contention.
    pub fn is_active(self) -> bool {
        self != ResponseStatus::Declined
    }
}

/// A member's answer to their candidacy invitation, unique per (member, position).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidacyResponse {
    pub id: ResponseId,
    pub member_id: MemberId,
    pub position_id: PositionId,
    pub status: ResponseStatus,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub id: VoteId,
    pub voter_id: MemberId,
    pub position_id: PositionId,
    pub candidate_id: MemberId,
    pub timestamp: DateTime<Utc>,
}

/// Singleton configuration row maintained by the committee.
///
/// Dates are kept as the raw strings the store hands back; parsing (and falling back when they
/// are malformed) happens in [`super::schedule::ElectionSchedule`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionSettings {
    #[serde(default)]
    pub nomination_start: Option<String>,
    #[serde(default)]
    pub nomination_end: Option<String>,
    #[serde(default)]
    pub voting_start: Option<String>,
    #[serde(default)]
    pub voting_end: Option<String>,
    #[serde(default)]
    pub require_two_seconds: Option<bool>,
    #[serde(default)]
    pub limit_one_position: Option<bool>,
    #[serde(default)]
    pub require_good_standing: Option<bool>,
    #[serde(default)]
    pub allow_self_nomination: Option<bool>,
}

/// Committee-maintained exclusions of otherwise qualified (member, position) pairs.
///
/// Pairs are held as tuples. At rest the set is a list of `memberId-positionId` keys; position
/// codes never contain `-`, so stored keys split at their last `-`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<String>", try_from = "Vec<String>")]
pub struct DisqualificationSet(BTreeSet<(MemberId, PositionId)>);

impl DisqualificationSet {
    pub fn key(member_id: &MemberId, position_id: &PositionId) -> String {
        format!("{member_id}-{position_id}")
    }

    pub fn disqualify(&mut self, member_id: &MemberId, position_id: &PositionId) -> bool {
        self.0.insert((member_id.clone(), position_id.clone()))
    }

    pub fn restore(&mut self, member_id: &MemberId, position_id: &PositionId) -> bool {
        self.0.remove(&(member_id.clone(), position_id.clone()))
    }

    pub fn is_disqualified(&self, member_id: &MemberId, position_id: &PositionId) -> bool {
        self.0.contains(&(member_id.clone(), position_id.clone()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<DisqualificationSet> for Vec<String> {
    fn from(set: DisqualificationSet) -> Self {
        set.0
            .iter()
            .map(|(member_id, position_id)| DisqualificationSet::key(member_id, position_id))
            .collect()
    }
}

impl TryFrom<Vec<String>> for DisqualificationSet {
    type Error = String;

    fn try_from(keys: Vec<String>) -> Result<Self, Self::Error> {
        keys.iter()
            .map(|key| match key.rsplit_once('-') {
                Some((member, position)) if !member.is_empty() && !position.is_empty() => {
                    Ok((MemberId::new(member), PositionId::new(position)))
                }
                _ => Err(format!("disqualification key '{key}' is not memberId-positionId")),
            })
            .collect::<Result<BTreeSet<_>, _>>()
            .map(Self)
    }
}

/// Immutable view of every collection the rules engine reads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElectionSnapshot {
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub positions: Vec<Position>,
    #[serde(default)]
    pub nominations: Vec<Nomination>,
    #[serde(default)]
    pub responses: Vec<CandidacyResponse>,
    #[serde(default)]
    pub votes: Vec<Vote>,
    #[serde(default)]
    pub settings: Option<ElectionSettings>,
    #[serde(default)]
    pub disqualifications: DisqualificationSet,
}

impl ElectionSnapshot {
    pub fn member(&self, id: &MemberId) -> Option<&Member> {
        self.members.iter().find(|member| &member.id == id)
    }

    pub fn position(&self, id: &PositionId) -> Option<&Position> {
        self.positions.iter().find(|position| &position.id == id)
    }

    pub fn has_voted(&self, voter_id: &MemberId) -> bool {
        self.votes.iter().any(|vote| &vote.voter_id == voter_id)
    }
}
