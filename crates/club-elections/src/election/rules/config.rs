use serde::Serialize;

use super::super::domain::ElectionSettings;

/// Distinct nominators needed when the bylaws ask for a proposer plus a seconder.
pub const DEFAULT_NOMINATION_THRESHOLD: usize = 2;

/// Rule switches derived from the committee's settings row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RulesConfig {
    pub nomination_threshold: usize,
    pub limit_one_position: bool,
    pub require_good_standing: bool,
    pub allow_self_nomination: bool,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            nomination_threshold: DEFAULT_NOMINATION_THRESHOLD,
            limit_one_position: true,
            require_good_standing: true,
            allow_self_nomination: true,
        }
    }
}

impl RulesConfig {
    pub fn from_settings(settings: Option<&ElectionSettings>) -> (Self, Vec<ConfigurationIssue>) {
        let defaults = Self::default();
        let Some(settings) = settings else {
            return (defaults, vec![ConfigurationIssue::SettingsMissing]);
        };

        let mut issues = Vec::new();
        let nomination_threshold = match settings.require_two_seconds {
            Some(true) => DEFAULT_NOMINATION_THRESHOLD,
            Some(false) => 1,
            None => {
                issues.push(ConfigurationIssue::ThresholdDefaulted {
                    threshold: DEFAULT_NOMINATION_THRESHOLD,
                });
                DEFAULT_NOMINATION_THRESHOLD
            }
        };

        let config = Self {
            nomination_threshold,
            limit_one_position: settings
                .limit_one_position
                .unwrap_or(defaults.limit_one_position),
            require_good_standing: settings
                .require_good_standing
                .unwrap_or(defaults.require_good_standing),
            allow_self_nomination: settings
                .allow_self_nomination
                .unwrap_or(defaults.allow_self_nomination),
        };

        (config, issues)
    }
}

/// A setting that was missing or malformed and replaced by its documented default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum ConfigurationIssue {
    #[error("election settings are missing; using default rules and schedule")]
    SettingsMissing,
    #[error("require_two_seconds is not set; defaulting to {threshold} distinct nominators")]
    ThresholdDefaulted { threshold: usize },
    #[error("{field} is not set; using {fallback}")]
    DateDefaulted {
        field: &'static str,
        fallback: String,
    },
    #[error("{field} '{value}' is not a valid timestamp; using {fallback}")]
    MalformedDate {
        field: &'static str,
        value: String,
        fallback: String,
    },
    #[error("{window} window opens after it closes; using the default window")]
    InvertedWindow { window: &'static str },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_settings_fall_back_to_two_nominators() {
        let (config, issues) = RulesConfig::from_settings(None);

        assert_eq!(config.nomination_threshold, 2);
        assert_eq!(issues, vec![ConfigurationIssue::SettingsMissing]);
    }

    #[test]
    fn single_nominator_threshold_when_seconds_not_required() {
        let settings = ElectionSettings {
            require_two_seconds: Some(false),
            limit_one_position: Some(false),
            ..ElectionSettings::default()
        };

        let (config, issues) = RulesConfig::from_settings(Some(&settings));

        assert_eq!(config.nomination_threshold, 1);
        assert!(!config.limit_one_position);
        assert!(config.require_good_standing);
        assert!(issues.is_empty());
    }

    #[test]
    fn unset_threshold_is_flagged() {
        let settings = ElectionSettings::default();

        let (config, issues) = RulesConfig::from_settings(Some(&settings));

        assert_eq!(config.nomination_threshold, DEFAULT_NOMINATION_THRESHOLD);
        assert_eq!(
            issues,
            vec![ConfigurationIssue::ThresholdDefaulted { threshold: 2 }]
        );
    }
}
