//! Prediction and verification state machine.
//!
//! A [`Predictor`] consumes announcements one at a time through
//! [`Predictor::ingest`] and answers with at most one [`Action`] for the
//! transport to carry out. It performs no I/O itself.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::MessageRef;
use crate::extraction::{
    contains_queen_in_first_group, extract_figure_signals, extract_first_group_content,
    extract_first_two_cards, extract_game_number, has_completion_indicator,
};
use crate::history::{DrawHistory, DrawRecord};
use crate::report::CycleReport;
use crate::rules::{DameRule, select_rule};
use crate::settings::{PredictorSettings, SettingsError};
use crate::util::content_hash;

/// Status slot at the end of every rendered prediction.
pub const STATUS_PENDING: &str = "statut :⏳";
pub const STATUS_CORRECT: &str = "statut :✅";
pub const STATUS_FAILED: &str = "statut :❌";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PredictionStatus {
    Pending,
    Correct,
    Failed,
}

/// Whether new forecasts are produced.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Dormant,
    Active,
}

impl Mode {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Dormant => "dormant",
            Self::Active => "active",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A Queen forecast for `target_game`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prediction {
    pub target_game: u32,
    pub source_game: u32,
    /// `None` for the generic fallback forecast.
    pub rule: Option<DameRule>,
    pub status: PredictionStatus,
    /// Rendered announcement, ending with the status slot.
    pub text: String,
    pub is_queen: bool,
    /// Outbound message carrying this forecast, once the transport sent it.
    pub message_id: Option<MessageRef>,
}

impl Prediction {
    fn render(target_game: u32, rule: Option<DameRule>) -> String {
        match DameRule::label(rule) {
            (headline, Some(trigger)) => {
                format!("🎯{target_game}🎯: Dame (Q) *{headline}* ({trigger}) {STATUS_PENDING}")
            }
            (headline, None) => {
                format!("🎯{target_game}🎯: Dame (Q) *{headline}* {STATUS_PENDING}")
            }
        }
    }

    fn resolve(&mut self, status: PredictionStatus) {
        let slot = match status {
            PredictionStatus::Pending => return,
            PredictionStatus::Correct => STATUS_CORRECT,
            PredictionStatus::Failed => STATUS_FAILED,
        };
        self.status = status;
        self.text = self.text.replace(STATUS_PENDING, slot);
    }
}

/// What the transport should do after an announcement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    None,
    /// Post a new forecast to the prediction channel.
    SendPrediction { target_game: u32, text: String },
    /// Update a forecast with its resolution. Without a `message_id` the
    /// transport posts the text as a fresh message.
    EditMessage {
        target_game: u32,
        message_id: Option<MessageRef>,
        text: String,
    },
    /// The failure streak hit the threshold; prompt the operator.
    FailureThresholdReached { target_game: u32 },
}

/// Snapshot for status rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictorStatus {
    pub mode: Mode,
    pub consecutive_failures: u32,
    pub max_failures: u32,
    /// Encoded rule of the last forecast, e.g. `Q:Q_NEXT_DRAW`.
    pub last_prediction: Option<String>,
    pub last_prediction_at: Option<DateTime<Utc>>,
    pub history_size: usize,
    pub pending_predictions: usize,
}

/// Owns every piece of prediction state for the process lifetime.
///
/// Not synchronized: callers serialize access, announcements must be fed in
/// arrival order.
#[derive(Debug, Clone)]
pub struct Predictor {
    settings: PredictorSettings,
    predictions: BTreeMap<u32, Prediction>,
    history: DrawHistory,
    /// Dedup fingerprints grouped by game number.
    processed: BTreeMap<u32, HashSet<String>>,
    mode: Mode,
    consecutive_failures: u32,
    last_prediction: Option<DameRule>,
    last_prediction_at: Option<DateTime<Utc>>,
    newest_game: Option<u32>,
}

impl Default for Predictor {
    fn default() -> Self {
        Self::with_settings(PredictorSettings::default())
    }
}

impl Predictor {
    pub fn new(settings: PredictorSettings) -> Result<Self, SettingsError> {
        settings.validate()?;
        Ok(Self::with_settings(settings))
    }

    fn with_settings(settings: PredictorSettings) -> Self {
        Self {
            history: DrawHistory::new(settings.history_limit),
            settings,
            predictions: BTreeMap::new(),
            processed: BTreeMap::new(),
            mode: Mode::Dormant,
            consecutive_failures: 0,
            last_prediction: None,
            last_prediction_at: None,
            newest_game: None,
        }
    }

    /// Process one source-channel announcement.
    ///
    /// Verification runs before triggering and its action wins. Text without
    /// a game number yields [`Action::None`].
    pub fn ingest(&mut self, text: &str, message_id: Option<MessageRef>) -> Action {
        let Some(game_number) = extract_game_number(text) else {
            debug!("Announcement without game number ignored");
            return Action::None;
        };
        self.observe(game_number);

        let verification = self.verify(game_number, text, message_id);
        if verification != Action::None {
            return verification;
        }

        match self.should_predict(game_number, text) {
            Some(rule) => {
                let prediction = self.make_prediction(game_number, Some(rule));
                Action::SendPrediction {
                    target_game: prediction.target_game,
                    text: prediction.text.clone(),
                }
            }
            None => Action::None,
        }
    }

    #[must_use]
    pub fn is_finalized(&self, text: &str) -> bool {
        has_completion_indicator(text, self.settings.completion_indicators.as_slice())
    }

    /// Gate for a new forecast; records the dedup fingerprint on success.
    pub fn should_predict(&mut self, game_number: u32, text: &str) -> Option<DameRule> {
        if self.is_finalized(text) || self.mode != Mode::Active {
            return None;
        }

        let first_group = extract_first_group_content(text)?;
        let rule = select_rule(extract_figure_signals(text), first_group)?;

        let fingerprint = content_hash(game_number, text);
        if !self
            .processed
            .entry(game_number)
            .or_default()
            .insert(fingerprint)
        {
            debug!("Duplicate announcement for N{game_number} skipped");
            return None;
        }

        self.last_prediction = Some(rule);
        self.last_prediction_at = Some(Utc::now());
        Some(rule)
    }

    /// Create the forecast for `rule`, replacing any forecast at the same target.
    pub fn make_prediction(&mut self, source_game: u32, rule: Option<DameRule>) -> &Prediction {
        let target_game = source_game.saturating_add(self.settings.offsets.for_rule(rule));
        let prediction = Prediction {
            target_game,
            source_game,
            rule,
            status: PredictionStatus::Pending,
            text: Prediction::render(target_game, rule),
            is_queen: true,
            message_id: None,
        };

        info!(
            "Prediction for N{target_game} from N{source_game} ({})",
            rule.map_or("fallback", |r| r.as_str())
        );
        if let Some(previous) = self.predictions.insert(target_game, prediction) {
            debug!(
                "Prediction for N{target_game} replaced (was from N{})",
                previous.source_game
            );
        }
        &self.predictions[&target_game]
    }

    /// Resolve the lowest due forecast against a finalized announcement.
    ///
    /// Also records the draw in the history. At most one forecast is
    /// resolved per call.
    pub fn verify(
        &mut self,
        game_number: u32,
        text: &str,
        message_id: Option<MessageRef>,
    ) -> Action {
        if !self.is_finalized(text) {
            return Action::None;
        }

        if let Some(first_group) = extract_first_group_content(text) {
            let record = DrawRecord {
                text: text.to_string(),
                first_group: first_group.to_string(),
                first_two_cards: extract_first_two_cards(text),
                message_id,
            };
            if let Some(evicted) = self.history.record(game_number, record) {
                debug!("History full, dropped N{evicted}");
            }
        }

        if self.predictions.is_empty() {
            return Action::None;
        }

        let window = i64::from(self.settings.verification_window);
        let queen_found = contains_queen_in_first_group(text);

        let due = self
            .predictions
            .values()
            .filter(|p| p.status == PredictionStatus::Pending && p.is_queen)
            .find_map(|p| {
                let offset = i64::from(game_number) - i64::from(p.target_game);
                if offset < 0 {
                    None
                } else if offset <= window {
                    queen_found.then_some((p.target_game, PredictionStatus::Correct))
                } else {
                    Some((p.target_game, PredictionStatus::Failed))
                }
            });

        match due {
            Some((target_game, PredictionStatus::Correct)) => {
                self.resolve_correct(target_game, game_number)
            }
            Some((target_game, _)) => self.resolve_failed(target_game),
            None => Action::None,
        }
    }

    fn resolve_correct(&mut self, target_game: u32, game_number: u32) -> Action {
        let Some(prediction) = self.predictions.get_mut(&target_game) else {
            return Action::None;
        };
        prediction.resolve(PredictionStatus::Correct);
        self.consecutive_failures = 0;

        info!("Prediction N{target_game} confirmed at N{game_number}");
        Action::EditMessage {
            target_game,
            message_id: prediction.message_id,
            text: prediction.text.clone(),
        }
    }

    fn resolve_failed(&mut self, target_game: u32) -> Action {
        let Some(prediction) = self.predictions.get_mut(&target_game) else {
            return Action::None;
        };
        prediction.resolve(PredictionStatus::Failed);
        self.consecutive_failures += 1;

        info!(
            "Prediction N{target_game} failed ({}/{} consecutive)",
            self.consecutive_failures, self.settings.max_failures_before_prompt
        );
        // Exactly the threshold: later failures fall back to plain edits.
        if self.consecutive_failures == self.settings.max_failures_before_prompt {
            return Action::FailureThresholdReached { target_game };
        }
        Action::EditMessage {
            target_game,
            message_id: prediction.message_id,
            text: prediction.text.clone(),
        }
    }

    /// Remember the outbound message carrying the forecast for `target_game`.
    ///
    /// Returns `false` when no such forecast exists.
    pub fn attach_message(&mut self, target_game: u32, message_id: MessageRef) -> bool {
        self.predictions
            .get_mut(&target_game)
            .map(|p| p.message_id = Some(message_id))
            .is_some()
    }

    /// Switch mode; either direction clears the failure streak.
    pub fn set_mode(&mut self, active: bool) {
        let mode = if active { Mode::Active } else { Mode::Dormant };
        if mode != self.mode {
            info!("Intelligent mode {} -> {}", self.mode, mode);
        }
        self.mode = mode;
        self.consecutive_failures = 0;
    }

    pub fn reset_failures(&mut self) {
        self.consecutive_failures = 0;
    }

    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    #[must_use]
    pub const fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    #[must_use]
    pub const fn threshold_reached(&self) -> bool {
        self.consecutive_failures >= self.settings.max_failures_before_prompt
    }

    #[must_use]
    pub fn prediction(&self, target_game: u32) -> Option<&Prediction> {
        self.predictions.get(&target_game)
    }

    /// Forecasts in ascending target order.
    pub fn predictions(&self) -> impl Iterator<Item = &Prediction> {
        self.predictions.values()
    }

    #[must_use]
    pub const fn history(&self) -> &DrawHistory {
        &self.history
    }

    #[must_use]
    pub const fn settings(&self) -> &PredictorSettings {
        &self.settings
    }

    #[must_use]
    pub fn status(&self) -> PredictorStatus {
        PredictorStatus {
            mode: self.mode,
            consecutive_failures: self.consecutive_failures,
            max_failures: self.settings.max_failures_before_prompt,
            last_prediction: self.last_prediction.as_ref().map(DameRule::encoded),
            last_prediction_at: self.last_prediction_at,
            history_size: self.history.len(),
            pending_predictions: self
                .predictions
                .values()
                .filter(|p| p.status == PredictionStatus::Pending)
                .count(),
        }
    }

    #[must_use]
    pub fn cycle_report(&self) -> CycleReport {
        CycleReport::build(&self.history, self.threshold_reached())
    }

    /// Track the newest game and drop bookkeeping that fell behind it.
    ///
    /// A game more than `history_limit` below the newest starts a new
    /// sequence (counter reset or late edit). Pending forecasts are kept
    /// whatever their age.
    fn observe(&mut self, game_number: u32) {
        let span = u32::try_from(self.settings.history_limit).unwrap_or(u32::MAX);
        let newest = match self.newest_game {
            Some(newest) if game_number.saturating_add(span) < newest => {
                debug!("Game counter went back from N{newest} to N{game_number}");
                game_number
            }
            Some(newest) => newest.max(game_number),
            None => game_number,
        };
        self.newest_game = Some(newest);

        let horizon = newest.saturating_sub(span);
        if horizon == 0 {
            return;
        }

        self.predictions
            .retain(|target, p| p.status == PredictionStatus::Pending || *target >= horizon);
        self.processed = self.processed.split_off(&horizon);
    }
}
