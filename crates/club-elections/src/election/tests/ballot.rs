use super::common::*;

use crate::election::domain::ResponseStatus;
use crate::election::rules::{BallotSelections, PositionFilter, RulesEngine, SelectionProblem};

fn standings_for(
    snapshot: &crate::election::domain::ElectionSnapshot,
) -> (RulesEngine, crate::election::rules::ElectionStandings) {
    let engine = RulesEngine::from_settings(snapshot.settings.as_ref());
    let standings = engine.evaluate(snapshot, &PositionFilter::All);
    (engine, standings)
}

#[test]
fn only_contested_positions_with_confirmed_candidates_need_a_pick() {
    let snapshot = contested_snapshot();
    let (engine, standings) = standings_for(&snapshot);

    let empty = engine.check_ballot(&standings, &BallotSelections::new());
    assert!(!empty.is_complete);
    assert_eq!(empty.missing_positions, vec![pid("sec")]);

    let mut selections = BallotSelections::new();
    selections.select(pid("sec"), mid("m2"));
    let check = engine.check_ballot(&standings, &selections);

    assert!(check.is_complete);
    assert!(check.is_valid());
    assert!(check.missing_positions.is_empty());
}

#[test]
fn positions_without_confirmed_candidates_are_skipped() {
    let mut snapshot = contested_snapshot();
    snapshot.responses = vec![response("m3", "trs", ResponseStatus::Accepted, 5)];
    let (engine, standings) = standings_for(&snapshot);

    let check = engine.check_ballot(&standings, &BallotSelections::new());

    assert!(check.is_complete);
    assert!(check.missing_positions.is_empty());
}

#[test]
fn picks_for_unopposed_or_unknown_positions_are_flagged() {
    let snapshot = contested_snapshot();
    let (engine, standings) = standings_for(&snapshot);

    let selections: BallotSelections = [
        (pid("sec"), mid("m1")),
        (pid("trs"), mid("m3")),
        (pid("vice"), mid("m4")),
    ]
    .into_iter()
    .collect();
    let check = engine.check_ballot(&standings, &selections);

    assert!(check.is_complete);
    assert!(!check.is_valid());
    let problems: Vec<_> = check
        .invalid_selections
        .iter()
        .map(|invalid| (invalid.position_id.as_str(), invalid.problem))
        .collect();
    assert!(problems.contains(&("trs", SelectionProblem::NoSelectionRequired)));
    assert!(problems.contains(&("vice", SelectionProblem::UnknownPosition)));
}

#[test]
fn picking_an_unconfirmed_candidate_is_invalid() {
    let mut snapshot = contested_snapshot();
    snapshot.nominations.extend([
        approved("n7", "m1", "m5", "sec"),
        approved("n8", "m2", "m5", "sec"),
    ]);
    let (engine, standings) = standings_for(&snapshot);

    let mut selections = BallotSelections::new();
    selections.select(pid("sec"), mid("m5"));
    let check = engine.check_ballot(&standings, &selections);

    assert_eq!(check.invalid_selections.len(), 1);
    assert_eq!(
        check.invalid_selections[0].problem,
        SelectionProblem::NotConfirmedCandidate
    );
}

#[test]
fn completeness_only_moves_toward_true_as_required_picks_are_added() {
    let mut snapshot = contested_snapshot();
    snapshot.nominations.extend([
        approved("n7", "m1", "m4", "pn"),
        approved("n8", "m2", "m4", "pn"),
        approved("n9", "m3", "m5", "pn"),
        approved("n10", "m4", "m5", "pn"),
    ]);
    snapshot.responses.extend([
        response("m4", "pn", ResponseStatus::Accepted, 20),
        response("m5", "pn", ResponseStatus::Accepted, 21),
    ]);
    let (engine, standings) = standings_for(&snapshot);

    let mut selections = BallotSelections::new();
    let mut previous = engine.check_ballot(&standings, &selections).is_complete;
    assert!(!previous);

    for (position, candidate) in [("sec", "m1"), ("pn", "m5")] {
        selections.select(pid(position), mid(candidate));
        let current = engine.check_ballot(&standings, &selections).is_complete;
        assert!(current || !previous, "completeness regressed after adding {position}");
        previous = current;
    }
    assert!(previous);

    selections.clear(&pid("pn"));
    assert!(!engine.check_ballot(&standings, &selections).is_complete);
}
