use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;

use super::domain::ElectionSettings;
use super::rules::ConfigurationIssue;

pub const DEFAULT_NOMINATION_START: &str = "2026-01-23T19:00:00+03:00";
pub const DEFAULT_NOMINATION_END: &str = "2026-01-25T19:00:00+03:00";
pub const DEFAULT_VOTING_START: &str = "2026-01-28T20:30:00+03:00";
pub const DEFAULT_VOTING_END: &str = "2026-01-30T20:30:00+03:00";

/// Half-open interval: opens inclusive, closes exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Window {
    pub opens_at: DateTime<Utc>,
    pub closes_at: DateTime<Utc>,
}

impl Window {
    pub fn contains(&self, now: DateTime<Utc>) -> bool {
        now >= self.opens_at && now < self.closes_at
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ElectionPhase {
    BeforeNominations,
    Nominations,
    AwaitingVoting,
    Voting,
    Closed,
}

impl ElectionPhase {
    pub const fn label(self) -> &'static str {
        match self {
            Self::BeforeNominations => "Nominations not yet open",
            Self::Nominations => "Nominations open",
            Self::AwaitingVoting => "Awaiting voting",
            Self::Voting => "Voting open",
            Self::Closed => "Closed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ElectionSchedule {
    pub nomination: Window,
    pub voting: Window,
}

impl Default for ElectionSchedule {
    fn default() -> Self {
        Self {
            nomination: default_window(DEFAULT_NOMINATION_START, DEFAULT_NOMINATION_END),
            voting: default_window(DEFAULT_VOTING_START, DEFAULT_VOTING_END),
        }
    }
}

impl ElectionSchedule {
    /// Builds the schedule from the settings row, replacing any missing, malformed, or inverted
    /// window with its default and flagging the substitution.
    pub fn from_settings(settings: Option<&ElectionSettings>) -> (Self, Vec<ConfigurationIssue>) {
        let defaults = Self::default();
        let Some(settings) = settings else {
            return (defaults, vec![ConfigurationIssue::SettingsMissing]);
        };

        let mut issues = Vec::new();
        let nomination = resolve_window(
            "nomination",
            ("nomination_start", settings.nomination_start.as_deref()),
            ("nomination_end", settings.nomination_end.as_deref()),
            defaults.nomination,
            &mut issues,
        );
        let voting = resolve_window(
            "voting",
            ("voting_start", settings.voting_start.as_deref()),
            ("voting_end", settings.voting_end.as_deref()),
            defaults.voting,
            &mut issues,
        );

        (Self { nomination, voting }, issues)
    }

    pub fn phase(&self, now: DateTime<Utc>) -> ElectionPhase {
        if now < self.nomination.opens_at {
            ElectionPhase::BeforeNominations
        } else if self.nomination.contains(now) {
            ElectionPhase::Nominations
        } else if self.voting.contains(now) {
            ElectionPhase::Voting
        } else if now < self.voting.opens_at {
            ElectionPhase::AwaitingVoting
        } else {
            ElectionPhase::Closed
        }
    }

    pub fn nominations_open(&self, now: DateTime<Utc>) -> bool {
        self.nomination.contains(now)
    }

    pub fn voting_open(&self, now: DateTime<Utc>) -> bool {
        self.voting.contains(now)
    }
}

fn resolve_window(
    window: &'static str,
    start: (&'static str, Option<&str>),
    end: (&'static str, Option<&str>),
    fallback: Window,
    issues: &mut Vec<ConfigurationIssue>,
) -> Window {
    let opens_at = resolve_instant(start.0, start.1, fallback.opens_at, issues);
    let closes_at = resolve_instant(end.0, end.1, fallback.closes_at, issues);

    if opens_at > closes_at {
        issues.push(ConfigurationIssue::InvertedWindow { window });
        return fallback;
    }

    Window {
        opens_at,
        closes_at,
    }
}

fn resolve_instant(
    field: &'static str,
    raw: Option<&str>,
    fallback: DateTime<Utc>,
    issues: &mut Vec<ConfigurationIssue>,
) -> DateTime<Utc> {
    let Some(raw) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
        issues.push(ConfigurationIssue::DateDefaulted {
            field,
            fallback: fallback.to_rfc3339(),
        });
        return fallback;
    };

    match parse_instant(raw) {
        Some(instant) => instant,
        None => {
            issues.push(ConfigurationIssue::MalformedDate {
                field,
                value: raw.to_string(),
                fallback: fallback.to_rfc3339(),
            });
            fallback
        }
    }
}

/// Accepts RFC 3339 timestamps, plus the offset-less `YYYY-MM-DDTHH:MM[:SS]` form that
/// datetime pickers produce, read as UTC.
pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(instant.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .map(|naive| naive.and_utc())
}

fn default_window(start: &str, end: &str) -> Window {
    Window {
        opens_at: parse_instant(start).unwrap_or(DateTime::<Utc>::MIN_UTC),
        closes_at: parse_instant(end).unwrap_or(DateTime::<Utc>::MIN_UTC),
    }
}
