use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request, StatusCode};
use chrono::Utc;
use serde_json::json;
use tower::ServiceExt;

use super::common::*;

use crate::election::domain::ReviewStatus;
use crate::election::report::RuleBasedInsights;
use crate::election::router::{election_router, MEMBER_HEADER};
use crate::election::service::ElectionService;

fn json_request(
    method: &str,
    uri: &str,
    member: Option<&str>,
    body: serde_json::Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(member) = member {
        builder = builder.header(MEMBER_HEADER, member);
    }
    builder
        .body(Body::from(serde_json::to_vec(&body).expect("serialize body")))
        .expect("request builds")
}

fn get_request(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).expect("request builds")
}

fn live_snapshot() -> crate::election::domain::ElectionSnapshot {
    let mut snapshot = contested_snapshot();
    snapshot.settings = Some(settings_around(Utc::now()));
    snapshot
}

#[tokio::test]
async fn standings_route_filters_by_position() {
    let (service, _) = build_service(contested_snapshot());
    let router = election_router(Arc::new(service));

    let response = router
        .oneshot(get_request("/api/v1/election/standings?position=trs"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    let rosters = payload["rosters"].as_array().expect("rosters array");
    assert_eq!(rosters.len(), 1);
    assert_eq!(rosters[0]["position_id"], json!("trs"));
    assert_eq!(payload["resolutions"][0]["is_unopposed"], json!(true));
    assert_eq!(payload["resolutions"][0]["winner"], json!("m3"));
}

#[tokio::test]
async fn nomination_route_requires_member_header() {
    let (service, _) = build_service(live_snapshot());
    let router = election_router(Arc::new(service));

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/election/nominations",
            None,
            json!({ "nomineeId": "m6", "positionId": "pn" }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn nomination_route_creates_pending_records() {
    let (service, repository) = build_service(live_snapshot());
    let router = election_router(Arc::new(service));

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/election/nominations",
            Some("m4"),
            json!({ "nomineeId": "m6", "positionId": "pn", "statement": "Steady hand" }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert_eq!(payload["reviewStatus"], json!("PENDING"));
    assert_eq!(payload["isSelfNomination"], json!(false));
    assert_eq!(repository.current().nominations.len(), 7);
}

#[tokio::test]
async fn review_route_maps_forbidden_and_conflict() {
    let mut snapshot = live_snapshot();
    snapshot
        .nominations
        .push(nomination("n-new", "m4", "m6", "pn", ReviewStatus::Pending));
    let router = election_router(Arc::new(build_service(snapshot).0));

    let forbidden = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/election/nominations/n-new/review",
            Some("m1"),
            json!({ "decision": "APPROVED" }),
        ))
        .await
        .expect("route executes");
    assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

    let approved = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/election/nominations/n-new/review",
            Some("c1"),
            json!({ "decision": "APPROVED" }),
        ))
        .await
        .expect("route executes");
    assert_eq!(approved.status(), StatusCode::OK);

    let repeat = router
        .oneshot(json_request(
            "POST",
            "/api/v1/election/nominations/n-new/review",
            Some("c1"),
            json!({ "decision": "REJECTED" }),
        ))
        .await
        .expect("route executes");
    assert_eq!(repeat.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn candidacy_route_rejects_unqualified_members() {
    let router = election_router(Arc::new(build_service(live_snapshot()).0));

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/election/candidacy",
            Some("m6"),
            json!({ "positionId": "sec", "decision": "ACCEPTED" }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .unwrap_or_default()
        .contains("not qualified"));
}

#[tokio::test]
async fn member_candidacy_route_returns_not_found_for_unknown_members() {
    let router = election_router(Arc::new(build_service(contested_snapshot()).0));

    let response = router
        .oneshot(get_request("/api/v1/election/candidacy/ghost"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn member_lookup_route_finds_members_by_rotary_id() {
    let router = election_router(Arc::new(build_service(contested_snapshot()).0));

    let found = router
        .clone()
        .oneshot(get_request("/api/v1/election/members/by-rotary/R-m3"))
        .await
        .expect("route executes");
    assert_eq!(found.status(), StatusCode::OK);
    let payload = read_json_body(found).await;
    assert_eq!(payload["id"], json!("m3"));

    let missing = router
        .oneshot(get_request("/api/v1/election/members/by-rotary/R-404"))
        .await
        .expect("route executes");
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn ballot_check_reports_missing_positions() {
    let router = election_router(Arc::new(build_service(contested_snapshot()).0));

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/election/ballots/check",
            None,
            json!({}),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["is_complete"], json!(false));
    assert_eq!(payload["missing_positions"], json!(["sec"]));
}

#[tokio::test]
async fn ballot_route_records_once() {
    let mut snapshot = contested_snapshot();
    snapshot.settings = Some(voting_settings(Utc::now()));
    let (service, repository) = build_service(snapshot);
    let router = election_router(Arc::new(service));

    let first = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/election/ballots",
            Some("m5"),
            json!({ "sec": "m2" }),
        ))
        .await
        .expect("route executes");
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = router
        .oneshot(json_request(
            "POST",
            "/api/v1/election/ballots",
            Some("m5"),
            json!({ "sec": "m1" }),
        ))
        .await
        .expect("route executes");
    assert_eq!(second.status(), StatusCode::CONFLICT);
    assert_eq!(repository.current().votes.len(), 1);
}

#[tokio::test]
async fn report_csv_route_sets_content_type() {
    let router = election_router(Arc::new(build_service(contested_snapshot()).0));

    let response = router
        .oneshot(get_request("/api/v1/election/report.csv"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok()),
        Some("text/csv; charset=utf-8")
    );
    let body = axum::body::to_bytes(response.into_body(), 1024 * 64)
        .await
        .expect("read body");
    assert!(String::from_utf8_lossy(&body).starts_with("Metric,Value"));
}

#[tokio::test]
async fn insights_route_serves_fallback_when_provider_fails() {
    let service = ElectionService::new(
        Arc::new(MemoryRepository::new(contested_snapshot())),
        Arc::new(FailingInsights),
    );
    let router = election_router(Arc::new(service));

    let response = router
        .oneshot(get_request("/api/v1/election/insights"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["degraded"], json!(true));
    assert_eq!(
        payload["observations"],
        json!(["Unable to generate insights at this time."])
    );
}

#[tokio::test]
async fn disqualification_routes_toggle_membership_in_the_set() {
    let (service, repository) = build_service(contested_snapshot());
    let router = election_router(Arc::new(service));

    let put = router
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/v1/election/disqualifications/m1/sec",
            Some("c1"),
            json!(null),
        ))
        .await
        .expect("route executes");
    assert_eq!(put.status(), StatusCode::NO_CONTENT);
    assert_eq!(repository.current().disqualifications.len(), 1);

    let delete = router
        .oneshot(json_request(
            "DELETE",
            "/api/v1/election/disqualifications/m1/sec",
            Some("c1"),
            json!(null),
        ))
        .await
        .expect("route executes");
    assert_eq!(delete.status(), StatusCode::NO_CONTENT);
    assert!(repository.current().disqualifications.is_empty());
}

#[tokio::test]
async fn settings_route_round_trips_for_committee() {
    let (service, _) = build_service(contested_snapshot());
    let router = election_router(Arc::new(service));
    let mut settings = settings_around(Utc::now());
    settings.allow_self_nomination = Some(false);

    let saved = router
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/v1/election/settings",
            Some("c1"),
            serde_json::to_value(&settings).expect("settings json"),
        ))
        .await
        .expect("route executes");
    assert_eq!(saved.status(), StatusCode::OK);

    let fetched = router
        .oneshot(get_request("/api/v1/election/settings"))
        .await
        .expect("route executes");
    let payload = read_json_body(fetched).await;
    assert_eq!(payload["allow_self_nomination"], json!(false));
}

#[tokio::test]
async fn results_handler_returns_internal_error_when_store_is_down() {
    let service = Arc::new(ElectionService::new(
        Arc::new(UnavailableRepository),
        Arc::new(RuleBasedInsights),
    ));

    let response =
        crate::election::router::results_handler::<UnavailableRepository>(State(service)).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
