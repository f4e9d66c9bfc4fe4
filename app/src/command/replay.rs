//! Feed a file of announcements through the predictor offline.
//!
//! Outbound messages are printed instead of sent, so rule changes can be
//! checked against a captured channel log.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicI32, Ordering};

use anyhow::Context;
use async_trait::async_trait;
use dame_config::Config;
use dame_core::{MessageRef, Predictor, PredictorSettings};
use dame_telegram::handler::{self, Channels};
use dame_telegram::{Outbox, status_text};
use tokio::sync::Mutex;
use tracing::{debug, info};

const SOURCE: i64 = 1;
const PREDICTION: i64 = 2;
const ADMIN: i64 = 3;

/// Input for the `replay` command.
pub struct ReplayInput {
    /// File with one announcement per line
    pub file: PathBuf,
    /// Start with the intelligent mode enabled
    pub active: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct ReplayStrategy;

/// Prints outbound messages and hands out sequential message ids.
#[derive(Default)]
struct ConsoleOutbox {
    next_id: AtomicI32,
}

impl ConsoleOutbox {
    fn print(&self, label: &str, text: &str) -> MessageRef {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        println!("[{label} #{id}] {text}");
        id
    }
}

const fn chat_label(chat_id: i64) -> &'static str {
    match chat_id {
        PREDICTION => "prediction",
        ADMIN => "admin",
        _ => "chat",
    }
}

#[async_trait]
impl Outbox for ConsoleOutbox {
    async fn send_text(&self, chat_id: i64, text: &str) -> dame_telegram::Result<MessageRef> {
        Ok(self.print(chat_label(chat_id), text))
    }

    async fn send_prompt(&self, chat_id: i64, text: &str) -> dame_telegram::Result<MessageRef> {
        Ok(self.print(&format!("{} prompt", chat_label(chat_id)), text))
    }

    async fn edit_text(
        &self,
        chat_id: i64,
        message_id: MessageRef,
        text: &str,
    ) -> dame_telegram::Result<()> {
        println!("[{} edit #{message_id}] {text}", chat_label(chat_id));
        Ok(())
    }
}

/// Settings from the config file when there is one, defaults otherwise.
fn load_settings() -> anyhow::Result<PredictorSettings> {
    let path = Config::config_path()?;
    if path.exists() {
        return Ok(Config::load_from(&path)?.predictor);
    }
    debug!("No config at {}, using default settings", path.display());
    Ok(PredictorSettings::default())
}

impl super::CommandStrategy for ReplayStrategy {
    type Input = ReplayInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let content = std::fs::read_to_string(&input.file)
            .with_context(|| format!("Failed to read {}", input.file.display()))?;

        let mut predictor = Predictor::new(load_settings()?)?;
        predictor.set_mode(input.active);
        let predictor = Arc::new(Mutex::new(predictor));

        let channels = Channels {
            source: SOURCE,
            prediction: PREDICTION,
            admin: Some(ADMIN),
            allowed_chats: Vec::new(),
        };
        let outbox = ConsoleOutbox::default();

        let mut replayed = 0usize;
        for (index, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let message_id = MessageRef::try_from(index + 1).unwrap_or(MessageRef::MAX);
            handler::handle_announcement(&outbox, &predictor, &channels, message_id, line).await?;
            replayed += 1;
        }
        info!("Replayed {replayed} announcements from {}", input.file.display());

        let predictor = predictor.lock().await;
        println!();
        println!("{}", status_text(&predictor.status()));
        println!();
        println!("{}", predictor.cycle_report());

        Ok(())
    }
}
