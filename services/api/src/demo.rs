use crate::infra::{insight_provider, load_snapshot, InMemoryElectionRepository};
use chrono::{DateTime, Duration, Utc};
use clap::Args;
use club_elections::election::{
    BallotSelections, ElectionRepository, ElectionResults, ElectionService, ElectionSettings,
    ElectionSnapshot, ElectionStandings, EngagementReport, Member, MemberId, MemberRole,
    NominationDraft, PositionFilter, PositionId, ResponseStatus, ReviewStatus,
};
use club_elections::error::AppError;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    /// JSON export of the election collections
    #[arg(long)]
    pub(crate) snapshot: PathBuf,
    /// Limit standings to a single position code (e.g. `sec`)
    #[arg(long)]
    pub(crate) position: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct ExportArgs {
    /// JSON export of the election collections
    #[arg(long)]
    pub(crate) snapshot: PathBuf,
    /// Write the CSV here instead of stdout
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Stop after candidacy responses instead of running the ballot.
    #[arg(long)]
    pub(crate) skip_voting: bool,
}

type DemoService = ElectionService<InMemoryElectionRepository>;

fn service_for(snapshot: ElectionSnapshot) -> DemoService {
    let repository = Arc::new(InMemoryElectionRepository::new(snapshot));
    ElectionService::new(repository, insight_provider(true))
}

pub(crate) fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let ReportArgs { snapshot, position } = args;
    let service = service_for(load_snapshot(&snapshot)?);

    let filter = position
        .map(|code| PositionFilter::Only(PositionId::new(code.trim())))
        .unwrap_or_default();
    let current = service.repository().snapshot().map_err(election_error)?;
    let standings = service.standings(&filter)?;
    render_standings(&current, &standings);

    let results = service.results()?;
    render_results(&current, &results);

    let engagement = service.engagement_report()?;
    render_engagement(&engagement);

    let insights = service.insights()?;
    println!("\nCommittee insights");
    for observation in &insights.observations {
        println!("- {observation}");
    }

    Ok(())
}

pub(crate) fn run_export(args: ExportArgs) -> Result<(), AppError> {
    let ExportArgs { snapshot, output } = args;
    let service = service_for(load_snapshot(&snapshot)?);
    let csv = service.export_report_csv()?;

    match output {
        Some(path) => {
            std::fs::write(&path, csv)?;
            println!("Engagement report written to {}", path.display());
        }
        None => print!("{csv}"),
    }
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let now = Utc::now();
    let service = service_for(demo_snapshot(now));
    let committee = MemberId::new("c1");

    println!("Club election demo");
    println!("- Phase: {}", service.phase(now)?.label());

    println!("\nNominations");
    let drafts = [
        ("m2", "m1", "sec"),
        ("m3", "m1", "sec"),
        ("m7", "m6", "sec"),
        ("m8", "m6", "sec"),
        ("m5", "m4", "sec"),
        ("m6", "m5", "trs"),
        ("m7", "m5", "trs"),
        ("m8", "m3", "pn"),
        ("m3", "m3", "pn"),
        ("m4", "m2", "pnd"),
    ];
    let mut submitted = Vec::new();
    for (nominator, nominee, position) in drafts {
        let draft = NominationDraft {
            nominee_id: MemberId::new(nominee),
            position_id: PositionId::new(position),
            statement: None,
        };
        match service.submit_nomination(&MemberId::new(nominator), draft, now) {
            Ok(nomination) => {
                let flag = if nomination.is_self_nomination {
                    " (self)"
                } else {
                    ""
                };
                println!("- {nominator} nominated {nominee} for {position}{flag}");
                submitted.push(nomination);
            }
            Err(err) => println!("- {nominator} -> {nominee} for {position} rejected: {err}"),
        }
    }

    println!("\nCommittee review");
    for nomination in &submitted {
        // the lone pnd nomination is turned down to show rejected records dropping out
        let decision = if nomination.position_id.as_str() == "pnd" {
            ReviewStatus::Rejected
        } else {
            ReviewStatus::Approved
        };
        let reviewed = service.review_nomination(&committee, &nomination.id, decision)?;
        println!("- {} -> {}", reviewed.id, reviewed.review_status.label());
    }

    let snapshot = service.repository().snapshot().map_err(election_error)?;
    let standings = service.standings(&PositionFilter::All)?;
    render_standings(&snapshot, &standings);

    println!("\nCandidacy responses");
    let answers = [
        ("m1", "sec", ResponseStatus::Accepted),
        ("m6", "sec", ResponseStatus::Accepted),
        ("m4", "sec", ResponseStatus::Accepted),
        ("m5", "trs", ResponseStatus::Accepted),
        ("m3", "pn", ResponseStatus::Accepted),
    ];
    for (member, position, decision) in answers {
        match service.respond_to_candidacy(
            &MemberId::new(member),
            &PositionId::new(position),
            decision,
            now,
        ) {
            Ok(response) => println!(
                "- {member} {} candidacy for {position}",
                response.status.label()
            ),
            Err(err) => println!("- {member} could not answer for {position}: {err}"),
        }
    }

    let snapshot = service.repository().snapshot().map_err(election_error)?;
    let standings = service.standings(&PositionFilter::All)?;
    render_standings(&snapshot, &standings);

    if args.skip_voting {
        return Ok(());
    }

    let voting_at = now + Duration::days(2) + Duration::hours(1);
    println!("\nBallots ({})", service.phase(voting_at)?.label());

    let empty = BallotSelections::new();
    let check = service.check_ballot(&empty)?;
    let missing: Vec<&str> = check
        .missing_positions
        .iter()
        .map(PositionId::as_str)
        .collect();
    println!("- An empty ballot is missing: {}", missing.join(", "));

    let picks = [
        ("m1", "m1"),
        ("m2", "m1"),
        ("m3", "m6"),
        ("m4", "m1"),
        ("m5", "m6"),
        ("m7", "m1"),
    ];
    for (voter, candidate) in picks {
        let mut selections = BallotSelections::new();
        selections.select(PositionId::new("sec"), MemberId::new(candidate));
        match service.cast_ballot(&MemberId::new(voter), &selections, voting_at) {
            Ok(receipt) => println!(
                "- {} cast {} vote(s)",
                receipt.voter_id, receipt.votes_recorded
            ),
            Err(err) => println!("- {voter} ballot rejected: {err}"),
        }
    }

    let mut repeat = BallotSelections::new();
    repeat.select(PositionId::new("sec"), MemberId::new("m6"));
    if let Err(err) = service.cast_ballot(&MemberId::new("m1"), &repeat, voting_at) {
        println!("- m1 tried again: {err}");
    }

    let snapshot = service.repository().snapshot().map_err(election_error)?;
    let results = service.results()?;
    render_results(&snapshot, &results);
    render_engagement(&service.engagement_report()?);

    let insights = service.insights()?;
    println!("\nCommittee insights");
    for observation in &insights.observations {
        println!("- {observation}");
    }

    Ok(())
}

fn election_error(err: club_elections::election::RepositoryError) -> AppError {
    AppError::Election(err.into())
}

fn demo_snapshot(now: DateTime<Utc>) -> ElectionSnapshot {
    let names = [
        ("m1", "Amina Odhiambo"),
        ("m2", "Baraka Njoroge"),
        ("m3", "Chloe Wanjiru"),
        ("m4", "Dawit Tesfaye"),
        ("m5", "Esther Mwangi"),
        ("m6", "Farid Hassan"),
        ("m7", "Grace Achieng"),
        ("m8", "Hamisi Juma"),
    ];
    let mut members: Vec<Member> = names
        .iter()
        .enumerate()
        .map(|(index, (id, name))| demo_member(id, name, index + 1, MemberRole::Member))
        .collect();
    members.push(demo_member("c1", "Lydia Chebet", 100, MemberRole::Committee));

    let settings = ElectionSettings {
        nomination_start: Some((now - Duration::days(1)).to_rfc3339()),
        nomination_end: Some((now + Duration::days(1)).to_rfc3339()),
        voting_start: Some((now + Duration::days(2)).to_rfc3339()),
        voting_end: Some((now + Duration::days(3)).to_rfc3339()),
        require_two_seconds: Some(true),
        limit_one_position: Some(true),
        require_good_standing: Some(true),
        allow_self_nomination: Some(true),
    };

    ElectionSnapshot {
        members,
        settings: Some(settings),
        ..ElectionSnapshot::default()
    }
}

fn demo_member(id: &str, name: &str, number: usize, role: MemberRole) -> Member {
    Member {
        id: MemberId::new(id),
        name: name.to_string(),
        rotary_id: format!("RC-{:04}", 1000 + number),
        email: format!("{id}@club.example"),
        phone: format!("+254 700 000 {number:03}"),
        is_good_standing: true,
        role,
    }
}

fn member_name<'a>(snapshot: &'a ElectionSnapshot, id: &'a MemberId) -> &'a str {
    snapshot
        .member(id)
        .map(|member| member.name.as_str())
        .unwrap_or(id.as_str())
}

fn position_title<'a>(snapshot: &'a ElectionSnapshot, id: &'a PositionId) -> &'a str {
    snapshot
        .position(id)
        .map(|position| position.title.as_str())
        .unwrap_or(id.as_str())
}

fn render_standings(snapshot: &ElectionSnapshot, standings: &ElectionStandings) {
    println!(
        "\nStandings (qualification needs {} distinct nominators)",
        standings.threshold
    );
    let mut uncontested = 0;
    for roster in &standings.rosters {
        if roster.entries.is_empty() {
            uncontested += 1;
            continue;
        }
        let title = position_title(snapshot, &roster.position_id);
        let status = match standings.resolution(&roster.position_id) {
            Some(resolution) if resolution.is_unopposed => {
                let winner = resolution
                    .winner
                    .as_ref()
                    .map(|winner| member_name(snapshot, winner))
                    .unwrap_or("-");
                format!("unopposed, {winner} elected")
            }
            _ => format!("{} confirmed", roster.confirmed_count()),
        };
        println!("- {title}: {status}");
        for entry in &roster.entries {
            println!(
                "    - {} ({} nominators, {})",
                entry.name,
                entry.nomination_count,
                entry.response_status.label()
            );
        }
    }
    if uncontested > 0 {
        println!("  {uncontested} position(s) without qualified candidates");
    }
    if !standings.issues.is_empty() {
        println!("  {} data issue(s) flagged", standings.issues.len());
    }
}

fn render_results(snapshot: &ElectionSnapshot, results: &ElectionResults) {
    println!(
        "\nResults: {} votes from {} voters ({}% turnout)",
        results.total_votes_cast, results.unique_voters, results.turnout
    );
    for tally in &results.positions {
        let title = position_title(snapshot, &tally.position_id);
        if let Some(winner) = &tally.declared_winner {
            println!(
                "- {title}: {} elected unopposed",
                member_name(snapshot, winner)
            );
            continue;
        }
        if !tally.has_votes() {
            continue;
        }
        println!("- {title}: {} votes", tally.total_votes);
        for entry in &tally.ranked {
            println!(
                "    - {}: {} ({:.1}%)",
                member_name(snapshot, &entry.candidate_id),
                entry.count,
                entry.percentage
            );
        }
    }
    if !results.duplicate_votes.is_empty() {
        println!(
            "  {} duplicate ballot(s) excluded",
            results.duplicate_votes.len()
        );
    }
}

fn render_engagement(report: &EngagementReport) {
    println!("\nEngagement");
    println!(
        "- {} of {} members nominated ({}% participation)",
        report.distinct_nominators, report.total_members, report.participation_rate
    );
    println!(
        "- {} full slate | {} partial slate | {} duplicate",
        report.full_slate, report.partial_slate, report.duplicate
    );
    println!(
        "- {} nominations, {} pending review, {} qualified candidates",
        report.total_nominations, report.pending_reviews, report.qualified_candidates
    );
    if report.skipped_records > 0 {
        println!("- {} records skipped as orphaned", report.skipped_records);
    }
}
