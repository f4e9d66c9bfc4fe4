//! Tunable predictor constants.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::rules::DameRule;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("completion_indicators must contain at least one non-empty glyph")]
    NoCompletionIndicator,
}

/// Target offset, in games, applied for each rule.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuleOffsets {
    #[serde(default = "RuleOffsets::default_immediate")]
    pub immediate: u32,
    #[serde(default = "RuleOffsets::default_delayed")]
    pub next_draw: u32,
    #[serde(default = "RuleOffsets::default_delayed")]
    pub wait_one: u32,
    #[serde(default = "RuleOffsets::default_immediate")]
    pub fallback: u32,
}

impl Default for RuleOffsets {
    fn default() -> Self {
        Self {
            immediate: Self::default_immediate(),
            next_draw: Self::default_delayed(),
            wait_one: Self::default_delayed(),
            fallback: Self::default_immediate(),
        }
    }
}

impl RuleOffsets {
    const fn default_immediate() -> u32 {
        2
    }

    const fn default_delayed() -> u32 {
        3
    }

    /// Offset for `rule`; `None` selects the fallback offset.
    #[must_use]
    pub const fn for_rule(&self, rule: Option<DameRule>) -> u32 {
        match rule {
            Some(DameRule::ImmediateDoubleJack | DameRule::Immediate) => self.immediate,
            Some(DameRule::NextDraw) => self.next_draw,
            Some(DameRule::WaitOne) => self.wait_one,
            None => self.fallback,
        }
    }
}

/// Settings for a [`crate::Predictor`].
///
/// Every field has a default, so an absent or partial `predictor` section in
/// the config file yields the canonical behaviour.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PredictorSettings {
    /// Number of finalized draws kept in the rolling history.
    #[serde(default = "PredictorSettings::default_history_limit")]
    pub history_limit: usize,
    /// Consecutive failures that raise the operator prompt.
    #[serde(default = "PredictorSettings::default_max_failures")]
    pub max_failures_before_prompt: u32,
    /// Games after the target during which a Queen still counts.
    #[serde(default = "PredictorSettings::default_verification_window")]
    pub verification_window: u32,
    /// Glyphs marking an announcement as finalized.
    #[serde(default = "PredictorSettings::default_completion_indicators")]
    pub completion_indicators: Vec<String>,
    #[serde(default)]
    pub offsets: RuleOffsets,
}

impl Default for PredictorSettings {
    fn default() -> Self {
        Self {
            history_limit: Self::default_history_limit(),
            max_failures_before_prompt: Self::default_max_failures(),
            verification_window: Self::default_verification_window(),
            completion_indicators: Self::default_completion_indicators(),
            offsets: RuleOffsets::default(),
        }
    }
}

impl PredictorSettings {
    const fn default_history_limit() -> usize {
        10
    }

    const fn default_max_failures() -> u32 {
        2
    }

    const fn default_verification_window() -> u32 {
        3
    }

    fn default_completion_indicators() -> Vec<String> {
        vec!["✅".to_string(), "🔰".to_string()]
    }

    /// Reject settings the predictor cannot run with.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.history_limit == 0 {
            return Err(SettingsError::Zero("history_limit"));
        }
        if self.max_failures_before_prompt == 0 {
            return Err(SettingsError::Zero("max_failures_before_prompt"));
        }
        if self.offsets.immediate == 0
            || self.offsets.next_draw == 0
            || self.offsets.wait_one == 0
            || self.offsets.fallback == 0
        {
            return Err(SettingsError::Zero("offsets"));
        }
        if !self.completion_indicators.iter().any(|g| !g.is_empty()) {
            return Err(SettingsError::NoCompletionIndicator);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_canonical() {
        let settings = PredictorSettings::default();
        assert_eq!(settings.history_limit, 10);
        assert_eq!(settings.max_failures_before_prompt, 2);
        assert_eq!(settings.verification_window, 3);
        assert_eq!(settings.offsets.for_rule(Some(DameRule::Immediate)), 2);
        assert_eq!(settings.offsets.for_rule(Some(DameRule::NextDraw)), 3);
        assert_eq!(settings.offsets.for_rule(Some(DameRule::WaitOne)), 3);
        assert_eq!(settings.offsets.for_rule(None), 2);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let settings: PredictorSettings =
            serde_json::from_str(r#"{ "offsets": { "next_draw": 4 } }"#).unwrap();
        assert_eq!(settings.offsets.next_draw, 4);
        assert_eq!(settings.offsets.immediate, 2);
        assert_eq!(settings.completion_indicators, vec!["✅", "🔰"]);
    }

    #[test]
    fn validation_names_the_field() {
        let settings = PredictorSettings {
            history_limit: 0,
            ..PredictorSettings::default()
        };
        assert_eq!(settings.validate(), Err(SettingsError::Zero("history_limit")));

        let settings = PredictorSettings {
            completion_indicators: vec![String::new()],
            ..PredictorSettings::default()
        };
        assert_eq!(
            settings.validate(),
            Err(SettingsError::NoCompletionIndicator)
        );
    }
}
