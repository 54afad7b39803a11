use club_elections::election::{
    CandidacyResponse, DisabledInsights, ElectionRepository, ElectionSettings, ElectionSnapshot,
    InsightProvider, Member, MemberId, Nomination, NominationId, PositionCatalog, PositionId,
    RepositoryError, ReviewStatus, RuleBasedInsights, Vote,
};
use club_elections::error::AppError;
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local stand-in for the hosted document store.
#[derive(Default, Clone)]
pub(crate) struct InMemoryElectionRepository {
    state: Arc<Mutex<ElectionSnapshot>>,
}

impl InMemoryElectionRepository {
    pub(crate) fn new(mut snapshot: ElectionSnapshot) -> Self {
        if snapshot.positions.is_empty() {
            snapshot.positions = PositionCatalog::standard().into_positions();
        }
        Self {
            state: Arc::new(Mutex::new(snapshot)),
        }
    }

    pub(crate) fn seeded_from(path: Option<&Path>) -> Result<Self, AppError> {
        let Some(path) = path else {
            return Ok(Self::new(ElectionSnapshot::default()));
        };

        let snapshot = load_snapshot(path)?;
        info!(
            path = %path.display(),
            members = snapshot.members.len(),
            nominations = snapshot.nominations.len(),
            votes = snapshot.votes.len(),
            "seeded election store from snapshot"
        );
        Ok(Self::new(snapshot))
    }
}

impl ElectionRepository for InMemoryElectionRepository {
    fn snapshot(&self) -> Result<ElectionSnapshot, RepositoryError> {
        let guard = self.state.lock().expect("repository mutex poisoned");
        Ok(guard.clone())
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
        let existing = guard.responses.iter_mut().find(|existing| {
            existing.member_id == response.member_id
                && existing.position_id == response.position_id
        });
        match existing {
            Some(existing) => *existing = response.clone(),
            None => guard.responses.push(response.clone()),
        }
        Ok(response)
    }

    fn insert_votes(&self, votes: Vec<Vote>) -> Result<(), RepositoryError> {
        let mut guard = self.state.lock().expect("repository mutex poisoned");
        let already_cast = votes.iter().any(|vote| {
            guard.votes.iter().any(|existing| {
                existing.voter_id == vote.voter_id && existing.position_id == vote.position_id
            })
        });
        if already_cast {
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
            .find(|member| member.rotary_id.eq_ignore_ascii_case(rotary_id))
            .cloned())
    }
}

/// Reads a JSON export of the store collections.
pub(crate) fn load_snapshot(path: &Path) -> Result<ElectionSnapshot, AppError> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

pub(crate) fn insight_provider(enabled: bool) -> Arc<dyn InsightProvider> {
    if enabled {
        Arc::new(RuleBasedInsights)
    } else {
        warn!("committee insights disabled by configuration");
        Arc::new(DisabledInsights)
    }
}
