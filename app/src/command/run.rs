use crate::command::CommandStrategy;
use dame_config::Config;
use dame_telegram::TelegramBot;
use tracing::info;

/// Input for the `run` command.
pub struct RunInput {
    /// Optional bot token (overrides config and environment)
    pub token: Option<String>,
}

/// Runs the Telegram bot until Ctrl-C.
pub struct RunStrategy;

impl CommandStrategy for RunStrategy {
    type Input = RunInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;

        let token = match input.token {
            Some(t) if !t.trim().is_empty() => t,
            _ if !config.telegram.token.is_empty() => config.telegram.token.clone(),
            _ => anyhow::bail!(
                "Telegram bot token not configured. Set \"telegram.token\" in config or BOT_TOKEN"
            ),
        };

        info!("Starting Telegram bot...");
        let bot = TelegramBot::new(token, &config)?;

        info!("Telegram bot is running. Press Ctrl+C to stop.");
        bot.run().await?;

        Ok(())
    }
}
