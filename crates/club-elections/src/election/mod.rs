//! Club officer elections: nominations, committee review, candidacy, ballots, and results.
//!
//! The [`rules`] module holds the pure rules engine over an [`ElectionSnapshot`]; the service
//! and router layer it over an [`ElectionRepository`] for the HTTP surface.

pub mod catalog;
pub mod domain;
pub mod overlay;
pub mod report;
pub mod repository;
pub mod router;
pub mod rules;
pub mod schedule;
pub mod service;

#[cfg(test)]
mod tests;

pub use catalog::PositionCatalog;
pub use domain::{
    CandidacyResponse, DisqualificationSet, ElectionSettings, ElectionSnapshot, Member, MemberId,
    MemberRole, Nomination, NominationId, Position, PositionCategory, PositionId, PositionStatus,
    ResponseId, ResponseStatus, ReviewStatus, Vote, VoteId,
};
pub use overlay::{MutationState, PendingMutation, PendingOverlay, ReconciledMutation};
pub use report::{
    aggregate_engagement, engagement_csv, insights_or_fallback, CommitteeInsights,
    DisabledInsights, EngagementReport, InsightProvider, NominatorPattern, RuleBasedInsights,
};
pub use repository::{ElectionRepository, RepositoryError};
pub use router::{election_router, MEMBER_HEADER};
pub use rules::{
    BallotCheck, BallotSelections, ElectionResults, ElectionStandings, EligibilityStatus,
    EvaluationIssue, PositionFilter, RulesConfig, RulesEngine,
};
pub use schedule::{ElectionPhase, ElectionSchedule};
pub use service::{
    BallotReceipt, CandidacyView, ElectionService, ElectionServiceError, NominationDraft,
    RuleViolation,
};
