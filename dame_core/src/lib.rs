#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Queen forecasting over a stream of card-draw announcements.
//!
//! The crate is transport-agnostic: feed announcements to a [`Predictor`]
//! and carry out the returned [`Action`].

pub mod extraction;
pub mod history;
pub mod predictor;
pub mod report;
pub mod rules;
pub mod settings;
pub mod util;

/// Identifier of a chat message, as handed over by the transport.
pub type MessageRef = i32;

pub use extraction::FigureSignals;
pub use history::{DrawHistory, DrawRecord};
pub use predictor::{
    Action, Mode, Prediction, PredictionStatus, Predictor, PredictorStatus, STATUS_CORRECT,
    STATUS_FAILED, STATUS_PENDING,
};
pub use report::{CycleRecord, CycleReport};
pub use rules::{DameRule, select_rule};
pub use settings::{PredictorSettings, RuleOffsets, SettingsError};
pub use util::content_hash;
