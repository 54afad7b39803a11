use super::common::*;

use crate::election::domain::{NominationId, ResponseStatus, ReviewStatus};
use crate::election::overlay::{MutationState, PendingOverlay};
use crate::election::rules::{PositionFilter, RulesEngine};

#[test]
fn apply_projects_pending_review_and_candidacy() {
    let mut snapshot = contested_snapshot();
    snapshot
        .nominations
        .push(nomination("n-new", "m4", "m6", "pn", ReviewStatus::Pending));
    let mut overlay = PendingOverlay::new();
    overlay.record_review(NominationId::new("n-new"), ReviewStatus::Approved);
    overlay.record_candidacy(mid("m2"), pid("sec"), ResponseStatus::Declined, at(60));

    let projected = overlay.apply(&snapshot);

    assert_eq!(
        projected
            .nominations
            .iter()
            .find(|nomination| nomination.id == NominationId::new("n-new"))
            .map(|nomination| nomination.review_status),
        Some(ReviewStatus::Approved)
    );
    let standings = RulesEngine::from_settings(projected.settings.as_ref())
        .evaluate(&projected, &PositionFilter::All);
    assert!(standings.is_unopposed(&pid("sec")));

    // the authoritative snapshot is untouched
    assert!(snapshot
        .responses
        .iter()
        .all(|response| response.status == ResponseStatus::Accepted));
}

#[test]
fn later_mutation_for_the_same_record_replaces_the_earlier_one() {
    let mut overlay = PendingOverlay::new();
    overlay.record_candidacy(mid("m1"), pid("sec"), ResponseStatus::Declined, at(1));
    overlay.record_candidacy(mid("m1"), pid("sec"), ResponseStatus::Accepted, at(2));
    overlay.record_review(NominationId::new("n1"), ReviewStatus::Rejected);
    overlay.record_review(NominationId::new("n1"), ReviewStatus::Approved);

    assert_eq!(overlay.len(), 2);
}

#[test]
fn reconcile_classifies_confirmed_conflicted_and_pending() {
    let mut snapshot = contested_snapshot();
    snapshot.nominations.extend([
        nomination("n-a", "m4", "m6", "pn", ReviewStatus::Approved),
        nomination("n-b", "m5", "m6", "pn", ReviewStatus::Rejected),
        nomination("n-c", "m1", "m6", "pn", ReviewStatus::Pending),
    ]);

    let mut overlay = PendingOverlay::new();
    overlay.record_review(NominationId::new("n-a"), ReviewStatus::Approved);
    overlay.record_review(NominationId::new("n-b"), ReviewStatus::Approved);
    overlay.record_review(NominationId::new("n-c"), ReviewStatus::Approved);
    overlay.record_candidacy(mid("m1"), pid("sec"), ResponseStatus::Declined, at(5));

    let outcomes = overlay.reconcile(&snapshot);
    let states: Vec<MutationState> = outcomes.iter().map(|outcome| outcome.state).collect();

    assert_eq!(
        states,
        vec![
            MutationState::Confirmed,
            MutationState::Conflicted,
            MutationState::Pending,
            // store answered ACCEPTED at minute 10, after the local decline at minute 5
            MutationState::Conflicted,
        ]
    );
    assert_eq!(overlay.len(), 1);

    snapshot.nominations[8].review_status = ReviewStatus::Approved;
    let outcomes = overlay.reconcile(&snapshot);
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].state, MutationState::Confirmed);
    assert!(overlay.is_empty());
}

#[test]
fn unseen_candidacy_write_stays_pending() {
    let snapshot = contested_snapshot();
    let mut overlay = PendingOverlay::new();
    overlay.record_candidacy(mid("m1"), pid("sec"), ResponseStatus::Declined, at(90));

    let outcomes = overlay.reconcile(&snapshot);

    assert_eq!(outcomes[0].state, MutationState::Pending);
    assert_eq!(overlay.len(), 1);
}
