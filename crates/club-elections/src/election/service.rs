use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::domain::{
    CandidacyResponse, ElectionSettings, ElectionSnapshot, Member, MemberId, Nomination,
    NominationId, PositionId, PositionStatus, ResponseId, ResponseStatus, ReviewStatus, Vote,
    VoteId,
};
use super::report::{
    aggregate_engagement, engagement_csv, insights_or_fallback, CommitteeInsights,
    EngagementReport, ExportError, InsightInput, InsightProvider,
};
use super::repository::{ElectionRepository, RepositoryError};
use super::rules::{
    BallotCheck, BallotSelections, ElectionResults, ElectionStandings, InvalidSelection,
    PositionFilter, RulesEngine,
};
use super::schedule::{ElectionPhase, ElectionSchedule};

fn next_record_id(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4().simple())
}

/// Payload a member submits to nominate someone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NominationDraft {
    pub nominee_id: MemberId,
    pub position_id: PositionId,
    #[serde(default)]
    pub statement: Option<String>,
}

/// A member's candidacy for one position as shown on their dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidacyView {
    pub position_id: PositionId,
    pub title: String,
    pub nomination_count: usize,
    pub response_status: ResponseStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BallotReceipt {
    pub voter_id: MemberId,
    pub votes_recorded: usize,
    pub cast_at: DateTime<Utc>,
}

/// Service composing the repository, the rules engine, and the insight provider.
///
/// Every call reads a fresh snapshot; nothing derived is cached between calls.
pub struct ElectionService<R> {
    repository: Arc<R>,
    insights: Arc<dyn InsightProvider>,
}

impl<R> ElectionService<R>
where
    R: ElectionRepository + 'static,
{
    pub fn new(repository: Arc<R>, insights: Arc<dyn InsightProvider>) -> Self {
        Self {
            repository,
            insights,
        }
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    pub fn phase(&self, now: DateTime<Utc>) -> Result<ElectionPhase, ElectionServiceError> {
        let snapshot = self.repository.snapshot()?;
        Ok(schedule_for(&snapshot).phase(now))
    }

    pub fn submit_nomination(
        &self,
        nominator_id: &MemberId,
        draft: NominationDraft,
        now: DateTime<Utc>,
    ) -> Result<Nomination, ElectionServiceError> {
        let snapshot = self.repository.snapshot()?;
        let schedule = schedule_for(&snapshot);
        if !schedule.nominations_open(now) {
            return Err(RuleViolation::NominationsClosed {
                phase: schedule.phase(now),
            }
            .into());
        }

        let engine = RulesEngine::from_settings(snapshot.settings.as_ref());
        let config = engine.config();

        member_or_unknown(&snapshot, nominator_id)?;
        let nominee = member_or_unknown(&snapshot, &draft.nominee_id)?;
        let position = snapshot
            .position(&draft.position_id)
            .ok_or_else(|| ElectionServiceError::UnknownPosition(draft.position_id.clone()))?;

        if !position.is_elected {
            return Err(RuleViolation::PositionNotElected(position.id.clone()).into());
        }
        if position.status != PositionStatus::Open {
            return Err(RuleViolation::PositionNotOpen(position.id.clone()).into());
        }
        if config.require_good_standing && !nominee.is_good_standing {
            return Err(RuleViolation::NotInGoodStanding(nominee.id.clone()).into());
        }

        let is_self_nomination = nominator_id == &draft.nominee_id;
        if is_self_nomination && !config.allow_self_nomination {
            return Err(RuleViolation::SelfNominationDisabled.into());
        }

        let nomination = Nomination {
            id: NominationId(next_record_id("nom")),
            nominator_id: nominator_id.clone(),
            nominee_id: draft.nominee_id,
            position_id: draft.position_id,
            statement: draft
                .statement
                .map(|statement| statement.trim().to_string())
                .filter(|statement| !statement.is_empty()),
            timestamp: now,
            is_self_nomination,
            review_status: ReviewStatus::Pending,
        };

        let stored = self.repository.insert_nomination(nomination)?;
        tracing::info!(
            nomination_id = %stored.id,
            position_id = %stored.position_id,
            self_nomination = stored.is_self_nomination,
            "nomination submitted"
        );
        Ok(stored)
    }

    pub fn review_nomination(
        &self,
        reviewer_id: &MemberId,
        nomination_id: &NominationId,
        decision: ReviewStatus,
    ) -> Result<Nomination, ElectionServiceError> {
        let snapshot = self.repository.snapshot()?;
        require_committee(&snapshot, reviewer_id)?;

        if decision == ReviewStatus::Pending {
            return Err(RuleViolation::InvalidReviewDecision(decision).into());
        }

        let current = snapshot
            .nominations
            .iter()
            .find(|nomination| &nomination.id == nomination_id)
            .ok_or_else(|| ElectionServiceError::NominationNotFound(nomination_id.clone()))?;

        if !current.review_status.can_transition_to(decision) {
            return Err(ElectionServiceError::AlreadyReviewed {
                nomination_id: nomination_id.clone(),
                status: current.review_status,
            });
        }

        let updated = self
            .repository
            .update_review_status(nomination_id, decision)?;
        tracing::info!(
            nomination_id = %updated.id,
            reviewer_id = %reviewer_id,
            decision = decision.label(),
            "nomination reviewed"
        );
        Ok(updated)
    }

    pub fn respond_to_candidacy(
        &self,
        member_id: &MemberId,
        position_id: &PositionId,
        decision: ResponseStatus,
        now: DateTime<Utc>,
    ) -> Result<CandidacyResponse, ElectionServiceError> {
        if decision == ResponseStatus::Pending {
            return Err(RuleViolation::InvalidCandidacyDecision(decision).into());
        }

        let snapshot = self.repository.snapshot()?;
        member_or_unknown(&snapshot, member_id)?;
        if snapshot.position(position_id).is_none() {
            return Err(ElectionServiceError::UnknownPosition(position_id.clone()));
        }

        let engine = RulesEngine::from_settings(snapshot.settings.as_ref());
        let standings = engine.evaluate(&snapshot, &PositionFilter::All);
        if !standings.eligibility.is_qualified(member_id, position_id) {
            return Err(RuleViolation::NotQualified {
                member_id: member_id.clone(),
                position_id: position_id.clone(),
            }
            .into());
        }

        if decision == ResponseStatus::Accepted && engine.config().limit_one_position {
            let accepted_elsewhere = standings.rosters.iter().find(|roster| {
                &roster.position_id != position_id
                    && roster.entries.iter().any(|entry| {
                        &entry.candidate_id == member_id
                            && entry.response_status == ResponseStatus::Accepted
                    })
            });
            if let Some(roster) = accepted_elsewhere {
                return Err(RuleViolation::AlreadyAcceptedElsewhere {
                    position_id: roster.position_id.clone(),
                }
                .into());
            }
        }

        let response = CandidacyResponse {
            id: ResponseId(next_record_id("resp")),
            member_id: member_id.clone(),
            position_id: position_id.clone(),
            status: decision,
            timestamp: now,
        };

        let stored = self.repository.upsert_response(response)?;
        tracing::info!(
            member_id = %member_id,
            position_id = %position_id,
            decision = decision.label(),
            "candidacy response recorded"
        );
        Ok(stored)
    }

    pub fn disqualify(
        &self,
        reviewer_id: &MemberId,
        member_id: &MemberId,
        position_id: &PositionId,
    ) -> Result<(), ElectionServiceError> {
        self.set_disqualified(reviewer_id, member_id, position_id, true)
    }

    pub fn restore(
        &self,
        reviewer_id: &MemberId,
        member_id: &MemberId,
        position_id: &PositionId,
    ) -> Result<(), ElectionServiceError> {
        self.set_disqualified(reviewer_id, member_id, position_id, false)
    }

    fn set_disqualified(
        &self,
        reviewer_id: &MemberId,
        member_id: &MemberId,
        position_id: &PositionId,
        disqualified: bool,
    ) -> Result<(), ElectionServiceError> {
        let snapshot = self.repository.snapshot()?;
        require_committee(&snapshot, reviewer_id)?;
        member_or_unknown(&snapshot, member_id)?;
        if snapshot.position(position_id).is_none() {
            return Err(ElectionServiceError::UnknownPosition(position_id.clone()));
        }

        self.repository
            .set_disqualified(member_id, position_id, disqualified)?;
        tracing::info!(
            reviewer_id = %reviewer_id,
            member_id = %member_id,
            position_id = %position_id,
            disqualified,
            "disqualification updated"
        );
        Ok(())
    }

    pub fn settings(&self) -> Result<ElectionSettings, ElectionServiceError> {
        let snapshot = self.repository.snapshot()?;
        Ok(snapshot.settings.unwrap_or_default())
    }

    pub fn update_settings(
        &self,
        reviewer_id: &MemberId,
        settings: ElectionSettings,
    ) -> Result<ElectionSettings, ElectionServiceError> {
        let snapshot = self.repository.snapshot()?;
        require_committee(&snapshot, reviewer_id)?;

        let (_, issues) = ElectionSchedule::from_settings(Some(&settings));
        for issue in &issues {
            tracing::warn!(issue = %issue, "saved settings will fall back to a default");
        }

        let saved = self.repository.save_settings(settings)?;
        tracing::info!(reviewer_id = %reviewer_id, "election settings updated");
        Ok(saved)
    }

    pub fn standings(
        &self,
        filter: &PositionFilter,
    ) -> Result<ElectionStandings, ElectionServiceError> {
        let snapshot = self.repository.snapshot()?;
        Ok(evaluate(&snapshot, filter))
    }

    pub fn member_candidacy(
        &self,
        member_id: &MemberId,
    ) -> Result<Vec<CandidacyView>, ElectionServiceError> {
        let snapshot = self.repository.snapshot()?;
        member_or_unknown(&snapshot, member_id)?;
        let standings = evaluate(&snapshot, &PositionFilter::All);

        let views = standings
            .rosters
            .iter()
            .filter_map(|roster| {
                let entry = roster
                    .entries
                    .iter()
                    .find(|entry| &entry.candidate_id == member_id)?;
                let title = snapshot
                    .position(&roster.position_id)
                    .map(|position| position.title.clone())
                    .unwrap_or_else(|| roster.position_id.to_string());

                Some(CandidacyView {
                    position_id: roster.position_id.clone(),
                    title,
                    nomination_count: entry.nomination_count,
                    response_status: entry.response_status,
                })
            })
            .collect();
        Ok(views)
    }

    pub fn check_ballot(
        &self,
        selections: &BallotSelections,
    ) -> Result<BallotCheck, ElectionServiceError> {
        let snapshot = self.repository.snapshot()?;
        let engine = RulesEngine::from_settings(snapshot.settings.as_ref());
        let standings = engine.evaluate(&snapshot, &PositionFilter::All);
        Ok(engine.check_ballot(&standings, selections))
    }

    pub fn cast_ballot(
        &self,
        voter_id: &MemberId,
        selections: &BallotSelections,
        now: DateTime<Utc>,
    ) -> Result<BallotReceipt, ElectionServiceError> {
        let snapshot = self.repository.snapshot()?;
        let schedule = schedule_for(&snapshot);
        if !schedule.voting_open(now) {
            return Err(RuleViolation::VotingClosed {
                phase: schedule.phase(now),
            }
            .into());
        }

        let engine = RulesEngine::from_settings(snapshot.settings.as_ref());
        let voter = member_or_unknown(&snapshot, voter_id)?;
        if engine.config().require_good_standing && !voter.is_good_standing {
            return Err(RuleViolation::NotInGoodStanding(voter.id.clone()).into());
        }
        if snapshot.has_voted(voter_id) {
            return Err(ElectionServiceError::AlreadyVoted(voter_id.clone()));
        }

        let standings = engine.evaluate(&snapshot, &PositionFilter::All);
        let check = engine.check_ballot(&standings, selections);
        if !check.invalid_selections.is_empty() {
            return Err(RuleViolation::InvalidSelections(check.invalid_selections).into());
        }
        if !check.is_complete {
            return Err(RuleViolation::IncompleteBallot(check.missing_positions).into());
        }

        let votes: Vec<Vote> = selections
            .iter()
            .map(|(position_id, candidate_id)| Vote {
                id: VoteId(next_record_id("vote")),
                voter_id: voter_id.clone(),
                position_id: position_id.clone(),
                candidate_id: candidate_id.clone(),
                timestamp: now,
            })
            .collect();
        let votes_recorded = votes.len();

        match self.repository.insert_votes(votes) {
            Ok(()) => {}
            Err(RepositoryError::Conflict) => {
                return Err(ElectionServiceError::AlreadyVoted(voter_id.clone()))
            }
            Err(other) => return Err(other.into()),
        }

        tracing::info!(voter_id = %voter_id, votes_recorded, "ballot cast");
        Ok(BallotReceipt {
            voter_id: voter_id.clone(),
            votes_recorded,
            cast_at: now,
        })
    }

    pub fn results(&self) -> Result<ElectionResults, ElectionServiceError> {
        let snapshot = self.repository.snapshot()?;
        let engine = RulesEngine::from_settings(snapshot.settings.as_ref());
        let standings = evaluate(&snapshot, &PositionFilter::All);
        let results = engine.tally(&snapshot, &standings);
        if !results.duplicate_votes.is_empty() {
            tracing::warn!(
                duplicates = results.duplicate_votes.len(),
                "duplicate votes excluded from the tally"
            );
        }
        Ok(results)
    }

    pub fn engagement_report(&self) -> Result<EngagementReport, ElectionServiceError> {
        let snapshot = self.repository.snapshot()?;
        let standings = evaluate(&snapshot, &PositionFilter::All);
        Ok(aggregate_engagement(&snapshot, &standings))
    }

    pub fn export_report_csv(&self) -> Result<String, ElectionServiceError> {
        let report = self.engagement_report()?;
        Ok(engagement_csv(&report)?)
    }

    pub fn insights(&self) -> Result<CommitteeInsights, ElectionServiceError> {
        let snapshot = self.repository.snapshot()?;
        let standings = evaluate(&snapshot, &PositionFilter::All);
        let engagement = aggregate_engagement(&snapshot, &standings);
        let input = InsightInput {
            snapshot: &snapshot,
            standings: &standings,
            engagement: &engagement,
        };
        Ok(insights_or_fallback(self.insights.as_ref(), &input))
    }

    /// Looks a member up by their club-issued Rotary id, as the sign-in flow does.
    pub fn find_member(&self, rotary_id: &str) -> Result<Member, ElectionServiceError> {
        self.repository
            .find_member_by_rotary_id(rotary_id.trim())?
            .ok_or_else(|| ElectionServiceError::UnknownRotaryId(rotary_id.trim().to_string()))
    }
}

fn schedule_for(snapshot: &ElectionSnapshot) -> ElectionSchedule {
    let (schedule, issues) = ElectionSchedule::from_settings(snapshot.settings.as_ref());
    for issue in &issues {
        tracing::warn!(issue = %issue, "election schedule fell back to a default");
    }
    schedule
}

fn evaluate(snapshot: &ElectionSnapshot, filter: &PositionFilter) -> ElectionStandings {
    let engine = RulesEngine::from_settings(snapshot.settings.as_ref());
    for issue in engine.config_issues() {
        tracing::warn!(issue = %issue, "election settings fell back to a default");
    }
    let standings = engine.evaluate(snapshot, filter);
    if !standings.issues.is_empty() {
        tracing::debug!(
            issues = standings.issues.len(),
            "snapshot evaluated with data issues"
        );
    }
    standings
}

fn member_or_unknown<'a>(
    snapshot: &'a ElectionSnapshot,
    member_id: &MemberId,
) -> Result<&'a Member, ElectionServiceError> {
    snapshot
        .member(member_id)
        .ok_or_else(|| ElectionServiceError::UnknownMember(member_id.clone()))
}

fn require_committee<'a>(
    snapshot: &'a ElectionSnapshot,
    member_id: &MemberId,
) -> Result<&'a Member, ElectionServiceError> {
    match snapshot.member(member_id) {
        Some(member) if member.is_committee() => Ok(member),
        _ => Err(ElectionServiceError::Forbidden(member_id.clone())),
    }
}

/// A request that breaks an election rule.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleViolation {
    #[error("nominations are not open ({})", .phase.label())]
    NominationsClosed { phase: ElectionPhase },
    #[error("voting is not open ({})", .phase.label())]
    VotingClosed { phase: ElectionPhase },
    #[error("position {0} is not elected")]
    PositionNotElected(PositionId),
    #[error("position {0} is not open for nominations")]
    PositionNotOpen(PositionId),
    #[error("member {0} is not in good standing")]
    NotInGoodStanding(MemberId),
    #[error("self-nomination is disabled for this election")]
    SelfNominationDisabled,
    #[error("{} is not a review decision", .0.label())]
    InvalidReviewDecision(ReviewStatus),
    #[error("{} is not a candidacy decision", .0.label())]
    InvalidCandidacyDecision(ResponseStatus),
    #[error("member {member_id} is not qualified for position {position_id}")]
    NotQualified {
        member_id: MemberId,
        position_id: PositionId,
    },
    #[error("candidacy already accepted for position {position_id}")]
    AlreadyAcceptedElsewhere { position_id: PositionId },
    #[error("ballot is incomplete: {} position(s) still need a selection", .0.len())]
    IncompleteBallot(Vec<PositionId>),
    #[error("ballot has {} invalid selection(s)", .0.len())]
    InvalidSelections(Vec<InvalidSelection>),
}

/// Error raised by the election service.
#[derive(Debug, thiserror::Error)]
pub enum ElectionServiceError {
    #[error(transparent)]
    Rule(#[from] RuleViolation),
    #[error("member {0} is not on the election committee")]
    Forbidden(MemberId),
    #[error("unknown member {0}")]
    UnknownMember(MemberId),
    #[error("no member holds Rotary id {0}")]
    UnknownRotaryId(String),
    #[error("unknown position {0}")]
    UnknownPosition(PositionId),
    #[error("nomination {0} not found")]
    NominationNotFound(NominationId),
    #[error("nomination {nomination_id} is already {}", .status.label())]
    AlreadyReviewed {
        nomination_id: NominationId,
        status: ReviewStatus,
    },
    #[error("member {0} has already voted")]
    AlreadyVoted(MemberId),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Export(#[from] ExportError),
}
