//! Optimistic view of writes the store has not confirmed yet.
//!
//! Clients record a mutation as soon as they send it, render `apply(snapshot)` instead of the
//! raw snapshot, and call `reconcile` whenever a fresh snapshot arrives. The store always wins.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{
    CandidacyResponse, ElectionSnapshot, MemberId, NominationId, PositionId, ResponseId,
    ResponseStatus, ReviewStatus,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PendingMutation {
    Review {
        nomination_id: NominationId,
        status: ReviewStatus,
    },
    Candidacy {
        member_id: MemberId,
        position_id: PositionId,
        status: ResponseStatus,
        recorded_at: DateTime<Utc>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationState {
    /// The store now holds the value we wrote.
    Confirmed,
    /// The store settled on a different value; the local change is dropped.
    Conflicted,
    /// Not visible in the store yet.
    Pending,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciledMutation {
    pub mutation: PendingMutation,
    pub state: MutationState,
}

#[derive(Debug, Clone, Default)]
pub struct PendingOverlay {
    pending: Vec<PendingMutation>,
}

impl PendingOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_review(&mut self, nomination_id: NominationId, status: ReviewStatus) {
        self.pending.retain(|mutation| match mutation {
            PendingMutation::Review {
                nomination_id: id, ..
            } => id != &nomination_id,
            _ => true,
        });
        self.pending.push(PendingMutation::Review {
            nomination_id,
            status,
        });
    }

    pub fn record_candidacy(
        &mut self,
        member_id: MemberId,
        position_id: PositionId,
        status: ResponseStatus,
        recorded_at: DateTime<Utc>,
    ) {
        self.pending.retain(|mutation| match mutation {
            PendingMutation::Candidacy {
                member_id: member,
                position_id: position,
                ..
            } => member != &member_id || position != &position_id,
            _ => true,
        });
        self.pending.push(PendingMutation::Candidacy {
            member_id,
            position_id,
            status,
            recorded_at,
        });
    }

    pub fn pending(&self) -> &[PendingMutation] {
        &self.pending
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Projects every pending mutation onto a copy of `snapshot`.
    pub fn apply(&self, snapshot: &ElectionSnapshot) -> ElectionSnapshot {
        let mut projected = snapshot.clone();

        for mutation in &self.pending {
            match mutation {
                PendingMutation::Review {
                    nomination_id,
                    status,
                } => {
                    if let Some(nomination) = projected
                        .nominations
                        .iter_mut()
                        .find(|nomination| &nomination.id == nomination_id)
                    {
                        nomination.review_status = *status;
                    }
                }
                PendingMutation::Candidacy {
                    member_id,
                    position_id,
                    status,
                    recorded_at,
                } => {
                    projected.responses.retain(|response| {
                        !(&response.member_id == member_id && &response.position_id == position_id)
                    });
                    projected.responses.push(CandidacyResponse {
                        id: ResponseId(format!("pending-{member_id}-{position_id}")),
                        member_id: member_id.clone(),
                        position_id: position_id.clone(),
                        status: *status,
                        timestamp: *recorded_at,
                    });
                }
            }
        }

        projected
    }

    /// Classifies each pending mutation against an authoritative snapshot and keeps only the
    /// ones still pending.
    pub fn reconcile(&mut self, authoritative: &ElectionSnapshot) -> Vec<ReconciledMutation> {
        let outcomes: Vec<ReconciledMutation> = self
            .pending
            .drain(..)
            .map(|mutation| {
                let state = classify(&mutation, authoritative);
                ReconciledMutation { mutation, state }
            })
            .collect();

        self.pending = outcomes
            .iter()
            .filter(|outcome| outcome.state == MutationState::Pending)
            .map(|outcome| outcome.mutation.clone())
            .collect();

        for outcome in &outcomes {
            if outcome.state == MutationState::Conflicted {
                tracing::debug!(mutation = ?outcome.mutation, "pending mutation lost to store");
            }
        }

        outcomes
    }
}

fn classify(mutation: &PendingMutation, store: &ElectionSnapshot) -> MutationState {
    match mutation {
        PendingMutation::Review {
            nomination_id,
            status,
        } => match store
            .nominations
            .iter()
            .find(|nomination| &nomination.id == nomination_id)
        {
            None => MutationState::Conflicted,
            Some(nomination) if nomination.review_status == *status => MutationState::Confirmed,
            Some(nomination) if nomination.review_status == ReviewStatus::Pending => {
                MutationState::Pending
            }
            Some(_) => MutationState::Conflicted,
        },
        PendingMutation::Candidacy {
            member_id,
            position_id,
            status,
            recorded_at,
        } => {
            let latest = store
                .responses
                .iter()
                .filter(|response| {
                    &response.member_id == member_id && &response.position_id == position_id
                })
                .max_by_key(|response| response.timestamp);

            match latest {
                Some(response) if response.status == *status => MutationState::Confirmed,
                Some(response)
                    if response.status != ResponseStatus::Pending
                        && response.timestamp >= *recorded_at =>
                {
                    MutationState::Conflicted
                }
                _ => MutationState::Pending,
            }
        }
    }
}
