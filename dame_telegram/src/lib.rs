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

mod bot;
mod command;
mod error;
pub mod handler;
mod outbox;

pub use bot::TelegramBot;
pub use command::{Command, PromptChoice, status_text};
pub use error::{Error, Result};
pub use handler::{Channels, SharedPredictor};
pub use outbox::Outbox;
