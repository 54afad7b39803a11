use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;

use crate::election::domain::{
    CandidacyResponse, ElectionSettings, ElectionSnapshot, Member, MemberId, MemberRole,
    Nomination, NominationId, Position, PositionCategory, PositionId, PositionStatus, ResponseId,
    ResponseStatus, ReviewStatus, Vote, VoteId,
};
use crate::election::report::{InsightError, InsightInput, InsightProvider, RuleBasedInsights};
use crate::election::repository::{ElectionRepository, RepositoryError};
use crate::election::service::ElectionService;

pub(super) fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 20, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn at(minutes: i64) -> DateTime<Utc> {
    base_time() + Duration::minutes(minutes)
}

pub(super) fn mid(value: &str) -> MemberId {
    MemberId::new(value)
}

pub(super) fn pid(value: &str) -> PositionId {
    PositionId::new(value)
}

pub(super) fn member(id: &str, name: &str) -> Member {
    Member {
        id: mid(id),
        name: name.to_string(),
        rotary_id: format!("R-{id}"),
        email: format!("{id}@club.example"),
        phone: "+000 000 000".to_string(),
        is_good_standing: true,
        role: MemberRole::Member,
    }
}

pub(super) fn committee(id: &str, name: &str) -> Member {
    Member {
        role: MemberRole::Committee,
        ..member(id, name)
    }
}

pub(super) fn position(id: &str, title: &str, category: PositionCategory) -> Position {
    Position {
        id: pid(id),
        title: title.to_string(),
        category,
        description: String::new(),
        is_elected: true,
        status: PositionStatus::Open,
    }
}

pub(super) fn members() -> Vec<Member> {
    vec![
        member("m1", "Amina"),
        member("m2", "Baraka"),
        member("m3", "Chloe"),
        member("m4", "Dawit"),
        member("m5", "Esther"),
        member("m6", "Farid"),
        committee("c1", "Grace"),
    ]
}

pub(super) fn positions() -> Vec<Position> {
    vec![
        position("sec", "Club Secretary", PositionCategory::Executive),
        position("trs", "Club Treasurer", PositionCategory::Executive),
        position("pn", "President Nominee", PositionCategory::Succession),
    ]
}

pub(super) fn nomination(
    id: &str,
    nominator: &str,
    nominee: &str,
    position_id: &str,
    review_status: ReviewStatus,
) -> Nomination {
    Nomination {
        id: NominationId::new(id),
        nominator_id: mid(nominator),
        nominee_id: mid(nominee),
        position_id: pid(position_id),
        statement: None,
        timestamp: base_time(),
        is_self_nomination: nominator == nominee,
        review_status,
    }
}

pub(super) fn approved(id: &str, nominator: &str, nominee: &str, position_id: &str) -> Nomination {
    nomination(id, nominator, nominee, position_id, ReviewStatus::Approved)
}

pub(super) fn response(
    member_id: &str,
    position_id: &str,
    status: ResponseStatus,
    minutes: i64,
) -> CandidacyResponse {
    CandidacyResponse {
        id: ResponseId::new(format!("resp-{member_id}-{position_id}-{minutes}")),
        member_id: mid(member_id),
        position_id: pid(position_id),
        status,
        timestamp: at(minutes),
    }
}

pub(super) fn vote(id: &str, voter: &str, position_id: &str, candidate: &str) -> Vote {
    Vote {
        id: VoteId::new(id),
        voter_id: mid(voter),
        position_id: pid(position_id),
        candidate_id: mid(candidate),
        timestamp: base_time(),
    }
}

/// Settings with both windows spelled out, nominations first and voting a week later.
pub(super) fn settings_around(now: DateTime<Utc>) -> ElectionSettings {
    ElectionSettings {
        nomination_start: Some((now - Duration::days(1)).to_rfc3339()),
        nomination_end: Some((now + Duration::days(1)).to_rfc3339()),
        voting_start: Some((now + Duration::days(6)).to_rfc3339()),
        voting_end: Some((now + Duration::days(8)).to_rfc3339()),
        require_two_seconds: Some(true),
        limit_one_position: Some(true),
        require_good_standing: Some(true),
        allow_self_nomination: Some(true),
    }
}

/// Settings whose voting window contains `now`.
pub(super) fn voting_settings(now: DateTime<Utc>) -> ElectionSettings {
    ElectionSettings {
        nomination_start: Some((now - Duration::days(8)).to_rfc3339()),
        nomination_end: Some((now - Duration::days(6)).to_rfc3339()),
        voting_start: Some((now - Duration::days(1)).to_rfc3339()),
        voting_end: Some((now + Duration::days(1)).to_rfc3339()),
        ..settings_around(now)
    }
}

/// Sec is contested by m1 and m2 (both accepted); trs is unopposed for m3; pn has nobody.
pub(super) fn contested_snapshot() -> ElectionSnapshot {
    ElectionSnapshot {
        members: members(),
        positions: positions(),
        nominations: vec![
            approved("n1", "m3", "m1", "sec"),
            approved("n2", "m4", "m1", "sec"),
            approved("n3", "m5", "m2", "sec"),
            approved("n4", "m6", "m2", "sec"),
            approved("n5", "m1", "m3", "trs"),
            approved("n6", "m2", "m3", "trs"),
        ],
        responses: vec![
            response("m1", "sec", ResponseStatus::Accepted, 10),
            response("m2", "sec", ResponseStatus::Accepted, 11),
            response("m3", "trs", ResponseStatus::Accepted, 12),
        ],
        votes: Vec::new(),
        settings: Some(settings_around(base_time())),
        disqualifications: Default::default(),
    }
}

pub(super) fn build_service(
    snapshot: ElectionSnapshot,
) -> (ElectionService<MemoryRepository>, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::new(snapshot));
    let service = ElectionService::new(repository.clone(), Arc::new(RuleBasedInsights));
    (service, repository)
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) state: Arc<Mutex<ElectionSnapshot>>,
}

impl MemoryRepository {
    pub(super) fn new(snapshot: ElectionSnapshot) -> Self {
        Self {
            state: Arc::new(Mutex::new(snapshot)),
        }
    }

    pub(super) fn current(&self) -> ElectionSnapshot {
        self.state.lock().expect("repository mutex poisoned").clone()
    }
}

impl ElectionRepository for MemoryRepository {
    fn snapshot(&self) -> Result<ElectionSnapshot, RepositoryError> {
        Ok(self.current())
    }

    fn insert_nomination(&self, nomination: Nomination) -> Result<Nomination, RepositoryError> {
        let mut guard = self.state.lock().expect("repository mutex poisoned");
        if guard
            .nominations
            .iter()
            .any(|existing| existing.id == nomination.id)
        {
            return Err(RepositoryError::Conflict);
        }
        guard.nominations.push(nomination.clone());
        Ok(nomination)
    }

    fn update_review_status(
        &self,
        id: &NominationId,
        status: ReviewStatus,
    ) -> Result<Nomination, RepositoryError> {
        let mut guard = self.state.lock().expect("repository mutex poisoned");
        let nomination = guard
            .nominations
            .iter_mut()
            .find(|nomination| &nomination.id == id)
            .ok_or(RepositoryError::NotFound)?;
        nomination.review_status = status;
        Ok(nomination.clone())
    }

    fn upsert_response(
        &self,
        response: CandidacyResponse,
    ) -> Result<CandidacyResponse, RepositoryError> {
        let mut guard = self.state.lock().expect("repository mutex poisoned");
        guard.responses.retain(|existing| {
            existing.member_id != response.member_id
                || existing.position_id != response.position_id
        });
        guard.responses.push(response.clone());
        Ok(response)
    }

    fn insert_votes(&self, votes: Vec<Vote>) -> Result<(), RepositoryError> {
        let mut guard = self.state.lock().expect("repository mutex poisoned");
        let taken = votes.iter().any(|vote| {
            guard.votes.iter().any(|existing| {
                existing.voter_id == vote.voter_id && existing.position_id == vote.position_id
            })
        });
        if taken {
            return Err(RepositoryError::Conflict);
        }
        guard.votes.extend(votes);
        Ok(())
    }

    fn set_disqualified(
        &self,
        member_id: &MemberId,
        position_id: &PositionId,
        disqualified: bool,
    ) -> Result<(), RepositoryError> {
        let mut guard = self.state.lock().expect("repository mutex poisoned");
        if disqualified {
            guard.disqualifications.disqualify(member_id, position_id);
        } else {
            guard.disqualifications.restore(member_id, position_id);
        }
        Ok(())
    }

    fn save_settings(
        &self,
        settings: ElectionSettings,
    ) -> Result<ElectionSettings, RepositoryError> {
        let mut guard = self.state.lock().expect("repository mutex poisoned");
        guard.settings = Some(settings.clone());
        Ok(settings)
    }

    fn find_member_by_rotary_id(&self, rotary_id: &str) -> Result<Option<Member>, RepositoryError> {
        let guard = self.state.lock().expect("repository mutex poisoned");
        Ok(guard
            .members
            .iter()
            .find(|member| member.rotary_id == rotary_id)
            .cloned())
    }
}

pub(super) struct UnavailableRepository;

impl ElectionRepository for UnavailableRepository {
    fn snapshot(&self) -> Result<ElectionSnapshot, RepositoryError> {
        Err(RepositoryError::Unavailable("store offline".to_string()))
    }

    fn insert_nomination(&self, _nomination: Nomination) -> Result<Nomination, RepositoryError> {
        Err(RepositoryError::Unavailable("store offline".to_string()))
    }

    fn update_review_status(
        &self,
        _id: &NominationId,
        _status: ReviewStatus,
    ) -> Result<Nomination, RepositoryError> {
        Err(RepositoryError::Unavailable("store offline".to_string()))
    }

    fn upsert_response(
        &self,
        _response: CandidacyResponse,
    ) -> Result<CandidacyResponse, RepositoryError> {
        Err(RepositoryError::Unavailable("store offline".to_string()))
    }

    fn insert_votes(&self, _votes: Vec<Vote>) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("store offline".to_string()))
    }

    fn set_disqualified(
        &self,
        _member_id: &MemberId,
        _position_id: &PositionId,
        _disqualified: bool,
    ) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("store offline".to_string()))
    }

    fn save_settings(
        &self,
        _settings: ElectionSettings,
    ) -> Result<ElectionSettings, RepositoryError> {
        Err(RepositoryError::Unavailable("store offline".to_string()))
    }

    fn find_member_by_rotary_id(
        &self,
        _rotary_id: &str,
    ) -> Result<Option<Member>, RepositoryError> {
        Err(RepositoryError::Unavailable("store offline".to_string()))
    }
}

pub(super) struct FailingInsights;

impl InsightProvider for FailingInsights {
    fn observations(&self, _input: &InsightInput<'_>) -> Result<Vec<String>, InsightError> {
        Err(InsightError::Unavailable("model timeout".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 64)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
