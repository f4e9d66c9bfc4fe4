use crate::command::Command;
use crate::handler::{self, Channels, SharedPredictor};
use crate::{Error, Result};
use dame_config::Config;
use dame_core::Predictor;
use std::{sync::Arc, time::Duration};
use teloxide::prelude::*;
use teloxide::types::{CallbackQuery, Message};
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Telegram front end for the Queen predictor
#[derive(Clone)]
pub struct TelegramBot {
    /// Teloxide bot instance
    pub bot: Bot,
    /// Prediction state shared by all handlers
    predictor: SharedPredictor,
    /// Source, prediction and admin chats
    channels: Channels,
}

impl TelegramBot {
    /// Create a new Telegram bot
    pub fn new(token: String, config: &Config) -> Result<Self> {
        let telegram = &config.telegram;
        let source = telegram.source_channel_id.ok_or_else(|| {
            Error::Config("source_channel_id (TARGET_CHANNEL_ID) is not set".into())
        })?;
        let prediction = telegram.prediction_channel_id.ok_or_else(|| {
            Error::Config("prediction_channel_id (PREDICTION_CHANNEL_ID) is not set".into())
        })?;

        // Parse allowed chat IDs
        let allowed_chats = telegram
            .allow_from
            .iter()
            .filter_map(|s| s.trim().parse::<i64>().ok())
            .collect();

        let predictor =
            Predictor::new(config.predictor.clone()).map_err(|e| Error::Config(e.to_string()))?;

        Ok(Self {
            bot: Bot::new(token),
            predictor: Arc::new(Mutex::new(predictor)),
            channels: Channels {
                source,
                prediction,
                admin: telegram.admin_chat_id,
                allowed_chats,
            },
        })
    }

    #[must_use]
    pub const fn channels(&self) -> &Channels {
        &self.channels
    }

    #[must_use]
    pub fn predictor(&self) -> SharedPredictor {
        Arc::clone(&self.predictor)
    }

    /// Test connection to Telegram API with linear backoff retry.
    /// Starts at 2s, increases by 2s each attempt, max 10s delay.
    /// Retries indefinitely until connection succeeds.
    async fn test_connection(&self) -> Result<()> {
        const INITIAL_DELAY_SECS: u64 = 2;
        const MAX_DELAY_SECS: u64 = 10;

        let mut attempt = 1u64;
        loop {
            match self.bot.get_me().await {
                Ok(me) => {
                    info!(
                        "Connected to Telegram API: @{} (id: {})",
                        me.user
                            .username
                            .unwrap_or_else(|| "no username".to_string()),
                        me.user.id
                    );
                    return Ok(());
                }
                Err(e) => {
                    let delay_secs = (INITIAL_DELAY_SECS * attempt).min(MAX_DELAY_SECS);

                    warn!("Connection attempt {attempt} failed: {e}. Retrying in {delay_secs}s...");
                    if attempt == 1 {
                        warn!("Check the bot token and that api.telegram.org is reachable");
                    }

                    sleep(Duration::from_secs(delay_secs)).await;
                    attempt += 1;
                }
            }
        }
    }

    async fn on_message(&self, msg: &Message) -> Result<()> {
        let Some(text) = msg.text().or_else(|| msg.caption()) else {
            debug!("[{}] Message without text ignored", msg.chat.id);
            return Ok(());
        };

        handler::handle_text(
            &self.bot,
            &self.predictor,
            &self.channels,
            msg.chat.id.0,
            msg.id.0,
            text,
        )
        .await
    }

    async fn on_callback(&self, query: &CallbackQuery) -> Result<()> {
        self.bot.answer_callback_query(query.id.clone()).await?;

        let (Some(data), Some(message)) = (query.data.as_deref(), query.message.as_ref()) else {
            return Ok(());
        };

        handler::handle_prompt_choice(
            &self.bot,
            &self.predictor,
            &self.channels,
            message.chat().id.0,
            message.id().0,
            data,
        )
        .await
    }

    /// Run the bot until Ctrl-C.
    pub async fn run(self) -> Result<()> {
        use teloxide::dispatching::{Dispatcher, UpdateFilterExt};
        use teloxide::dptree;
        use teloxide::types::Update;

        self.test_connection().await?;

        if let Err(e) = self.bot.set_my_commands(Command::bot_commands()).await {
            warn!("Failed to register bot commands: {e}");
        }

        info!(
            "Watching source {} and posting to {}",
            self.channels.source, self.channels.prediction
        );
        if self.channels.admin.is_none() {
            warn!("No admin chat configured; failure prompts will only be logged");
        }

        let message_endpoint = {
            let this = self.clone();
            move |msg: Message| {
                let this = this.clone();
                async move { this.on_message(&msg).await }
            }
        };
        let callback_endpoint = {
            let this = self.clone();
            move |query: CallbackQuery| {
                let this = this.clone();
                async move { this.on_callback(&query).await }
            }
        };

        // Results are often finalized by editing the original post.
        let schema = dptree::entry()
            .branch(Update::filter_message().endpoint(message_endpoint.clone()))
            .branch(Update::filter_edited_message().endpoint(message_endpoint.clone()))
            .branch(Update::filter_channel_post().endpoint(message_endpoint.clone()))
            .branch(Update::filter_edited_channel_post().endpoint(message_endpoint))
            .branch(Update::filter_callback_query().endpoint(callback_endpoint));

        Dispatcher::builder(self.bot.clone(), schema)
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;

        Ok(())
    }
}
