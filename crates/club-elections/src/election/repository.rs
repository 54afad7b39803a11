use super::domain::{
    CandidacyResponse, ElectionSettings, ElectionSnapshot, Member, MemberId, Nomination,
    NominationId, PositionId, ReviewStatus, Vote,
};

/// Storage abstraction over the hosted document store so the service can be exercised in
/// isolation.
pub trait ElectionRepository: Send + Sync {
    /// Current contents of every collection, read together.
    fn snapshot(&self) -> Result<ElectionSnapshot, RepositoryError>;

    fn insert_nomination(&self, nomination: Nomination) -> Result<Nomination, RepositoryError>;

    fn update_review_status(
        &self,
        id: &NominationId,
        status: ReviewStatus,
    ) -> Result<Nomination, RepositoryError>;

    /// Replaces any earlier response for the same (member, position).
    fn upsert_response(
        &self,
        response: CandidacyResponse,
    ) -> Result<CandidacyResponse, RepositoryError>;

    /// Writes a whole ballot or nothing. Fails with `Conflict` when any (voter, position) pair
    /// already holds a vote.
    fn insert_votes(&self, votes: Vec<Vote>) -> Result<(), RepositoryError>;

    fn set_disqualified(
        &self,
        member_id: &MemberId,
        position_id: &PositionId,
        disqualified: bool,
    ) -> Result<(), RepositoryError>;

    fn save_settings(&self, settings: ElectionSettings)
        -> Result<ElectionSettings, RepositoryError>;

    fn find_member_by_rotary_id(&self, rotary_id: &str) -> Result<Option<Member>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
