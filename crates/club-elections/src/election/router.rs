use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use super::domain::{
    ElectionSettings, MemberId, NominationId, PositionId, ResponseStatus, ReviewStatus,
};
use super::repository::{ElectionRepository, RepositoryError};
use super::rules::{BallotSelections, PositionFilter};
use super::service::{ElectionService, ElectionServiceError, NominationDraft};

/// Header carrying the id of the member acting on a request.
pub const MEMBER_HEADER: &str = "x-member-id";

/// Router builder exposing the election endpoints.
pub fn election_router<R>(service: Arc<ElectionService<R>>) -> Router
where
    R: ElectionRepository + 'static,
{
    Router::new()
        .route("/api/v1/election/standings", get(standings_handler::<R>))
        .route(
            "/api/v1/election/nominations",
            post(submit_nomination_handler::<R>),
        )
        .route(
            "/api/v1/election/nominations/:nomination_id/review",
            post(review_handler::<R>),
        )
        .route("/api/v1/election/candidacy", post(candidacy_handler::<R>))
        .route(
            "/api/v1/election/candidacy/:member_id",
            get(member_candidacy_handler::<R>),
        )
        .route(
            "/api/v1/election/members/by-rotary/:rotary_id",
            get(find_member_handler::<R>),
        )
        .route(
            "/api/v1/election/ballots/check",
            post(check_ballot_handler::<R>),
        )
        .route("/api/v1/election/ballots", post(cast_ballot_handler::<R>))
        .route("/api/v1/election/results", get(results_handler::<R>))
        .route("/api/v1/election/report", get(report_handler::<R>))
        .route("/api/v1/election/report.csv", get(report_csv_handler::<R>))
        .route("/api/v1/election/insights", get(insights_handler::<R>))
        .route(
            "/api/v1/election/disqualifications/:member_id/:position_id",
            put(disqualify_handler::<R>).delete(restore_handler::<R>),
        )
        .route(
            "/api/v1/election/settings",
            get(settings_handler::<R>).put(update_settings_handler::<R>),
        )
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct StandingsQuery {
    position: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReviewRequest {
    decision: ReviewStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CandidacyRequest {
    position_id: PositionId,
    decision: ResponseStatus,
}

pub(crate) async fn standings_handler<R>(
    State(service): State<Arc<ElectionService<R>>>,
    Query(query): Query<StandingsQuery>,
) -> Response
where
    R: ElectionRepository + 'static,
{
    let filter = match query.position.filter(|position| !position.trim().is_empty()) {
        Some(position) => PositionFilter::Only(PositionId::new(position.trim())),
        None => PositionFilter::All,
    };

    match service.standings(&filter) {
        Ok(standings) => (StatusCode::OK, Json(standings)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn submit_nomination_handler<R>(
    State(service): State<Arc<ElectionService<R>>>,
    headers: HeaderMap,
    Json(draft): Json<NominationDraft>,
) -> Response
where
    R: ElectionRepository + 'static,
{
    let nominator = match acting_member(&headers) {
        Ok(member) => member,
        Err(response) => return response,
    };

    match service.submit_nomination(&nominator, draft, Utc::now()) {
        Ok(nomination) => (StatusCode::CREATED, Json(nomination)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn review_handler<R>(
    State(service): State<Arc<ElectionService<R>>>,
    headers: HeaderMap,
    Path(nomination_id): Path<String>,
    Json(request): Json<ReviewRequest>,
) -> Response
where
    R: ElectionRepository + 'static,
{
    let reviewer = match acting_member(&headers) {
        Ok(member) => member,
        Err(response) => return response,
    };

    match service.review_nomination(&reviewer, &NominationId(nomination_id), request.decision) {
        Ok(nomination) => (StatusCode::OK, Json(nomination)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn candidacy_handler<R>(
    State(service): State<Arc<ElectionService<R>>>,
    headers: HeaderMap,
    Json(request): Json<CandidacyRequest>,
) -> Response
where
    R: ElectionRepository + 'static,
{
    let member = match acting_member(&headers) {
        Ok(member) => member,
        Err(response) => return response,
    };

    match service.respond_to_candidacy(
        &member,
        &request.position_id,
        request.decision,
        Utc::now(),
    ) {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn member_candidacy_handler<R>(
    State(service): State<Arc<ElectionService<R>>>,
    Path(member_id): Path<String>,
) -> Response
where
    R: ElectionRepository + 'static,
{
    let member_id = MemberId(member_id);
    match service.member_candidacy(&member_id) {
        Ok(positions) => {
            let payload = json!({
                "member_id": member_id,
                "positions": positions,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn find_member_handler<R>(
    State(service): State<Arc<ElectionService<R>>>,
    Path(rotary_id): Path<String>,
) -> Response
where
    R: ElectionRepository + 'static,
{
    match service.find_member(&rotary_id) {
        Ok(member) => (StatusCode::OK, Json(member)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn check_ballot_handler<R>(
    State(service): State<Arc<ElectionService<R>>>,
    Json(selections): Json<BallotSelections>,
) -> Response
where
    R: ElectionRepository + 'static,
{
    match service.check_ballot(&selections) {
        Ok(check) => (StatusCode::OK, Json(check)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn cast_ballot_handler<R>(
    State(service): State<Arc<ElectionService<R>>>,
    headers: HeaderMap,
    Json(selections): Json<BallotSelections>,
) -> Response
where
    R: ElectionRepository + 'static,
{
    let voter = match acting_member(&headers) {
        Ok(member) => member,
        Err(response) => return response,
    };

    match service.cast_ballot(&voter, &selections, Utc::now()) {
        Ok(receipt) => (StatusCode::CREATED, Json(receipt)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn results_handler<R>(State(service): State<Arc<ElectionService<R>>>) -> Response
where
    R: ElectionRepository + 'static,
{
    match service.results() {
        Ok(results) => (StatusCode::OK, Json(results)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn report_handler<R>(State(service): State<Arc<ElectionService<R>>>) -> Response
where
    R: ElectionRepository + 'static,
{
    match service.engagement_report() {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn report_csv_handler<R>(
    State(service): State<Arc<ElectionService<R>>>,
) -> Response
where
    R: ElectionRepository + 'static,
{
    match service.export_report_csv() {
        Ok(csv) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"election-report.csv\"",
                ),
            ],
            csv,
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn insights_handler<R>(
    State(service): State<Arc<ElectionService<R>>>,
) -> Response
where
    R: ElectionRepository + 'static,
{
    match service.insights() {
        Ok(insights) => (StatusCode::OK, Json(insights)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn disqualify_handler<R>(
    State(service): State<Arc<ElectionService<R>>>,
    headers: HeaderMap,
    Path((member_id, position_id)): Path<(String, String)>,
) -> Response
where
    R: ElectionRepository + 'static,
{
    let reviewer = match acting_member(&headers) {
        Ok(member) => member,
        Err(response) => return response,
    };

    match service.disqualify(&reviewer, &MemberId(member_id), &PositionId(position_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn restore_handler<R>(
    State(service): State<Arc<ElectionService<R>>>,
    headers: HeaderMap,
    Path((member_id, position_id)): Path<(String, String)>,
) -> Response
where
    R: ElectionRepository + 'static,
{
    let reviewer = match acting_member(&headers) {
        Ok(member) => member,
        Err(response) => return response,
    };

    match service.restore(&reviewer, &MemberId(member_id), &PositionId(position_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn settings_handler<R>(
    State(service): State<Arc<ElectionService<R>>>,
) -> Response
where
    R: ElectionRepository + 'static,
{
    match service.settings() {
        Ok(settings) => (StatusCode::OK, Json(settings)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn update_settings_handler<R>(
    State(service): State<Arc<ElectionService<R>>>,
    headers: HeaderMap,
    Json(settings): Json<ElectionSettings>,
) -> Response
where
    R: ElectionRepository + 'static,
{
    let reviewer = match acting_member(&headers) {
        Ok(member) => member,
        Err(response) => return response,
    };

    match service.update_settings(&reviewer, settings) {
        Ok(saved) => (StatusCode::OK, Json(saved)).into_response(),
        Err(error) => error_response(error),
    }
}

fn acting_member(headers: &HeaderMap) -> Result<MemberId, Response> {
    headers
        .get(MEMBER_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(MemberId::new)
        .ok_or_else(|| {
            let payload = json!({
                "error": format!("missing {MEMBER_HEADER} header"),
            });
            (StatusCode::UNAUTHORIZED, Json(payload)).into_response()
        })
}

pub(crate) fn error_status(error: &ElectionServiceError) -> StatusCode {
    match error {
        ElectionServiceError::Rule(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ElectionServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
        ElectionServiceError::UnknownMember(_)
        | ElectionServiceError::UnknownRotaryId(_)
        | ElectionServiceError::UnknownPosition(_)
        | ElectionServiceError::NominationNotFound(_)
        | ElectionServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        ElectionServiceError::AlreadyReviewed { .. }
        | ElectionServiceError::AlreadyVoted(_)
        | ElectionServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        ElectionServiceError::Repository(RepositoryError::Unavailable(_))
        | ElectionServiceError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(error: ElectionServiceError) -> Response {
    let status = error_status(&error);
    if status.is_server_error() {
        tracing::error!(error = %error, "election request failed");
    }

    let payload = json!({
        "error": error.to_string(),
    });
    (status, Json(payload)).into_response()
}
