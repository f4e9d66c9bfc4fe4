use dame_config::Config;

/// Prints the effective configuration with the token masked.
#[derive(Debug, Clone, Copy)]
pub struct InfoStrategy;

impl super::CommandStrategy for InfoStrategy {
    type Input = ();

    async fn execute(&self, _input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;

        println!("=== dame Configuration ===\n");

        println!("Telegram:");
        println!("  Token: {}", mask_token(&config.telegram.token));
        println!(
            "  Source Channel: {}",
            format_chat(config.telegram.source_channel_id)
        );
        println!(
            "  Prediction Channel: {}",
            format_chat(config.telegram.prediction_channel_id)
        );
        println!(
            "  Admin Chat: {}",
            format_chat(config.telegram.admin_chat_id)
        );
        if config.telegram.allow_from.is_empty() {
            println!("  Allow From: (empty - all chats allowed)");
        } else {
            println!("  Allow From: {}", config.telegram.allow_from.join(", "));
        }
        println!();

        let predictor = &config.predictor;
        println!("Predictor:");
        println!("  History Limit: {}", predictor.history_limit);
        println!(
            "  Failures Before Prompt: {}",
            predictor.max_failures_before_prompt
        );
        println!("  Verification Window: {}", predictor.verification_window);
        println!(
            "  Completion Indicators: {}",
            predictor.completion_indicators.join(" ")
        );
        println!(
            "  Offsets: immediate +{}, next draw +{}, wait one +{}, fallback +{}",
            predictor.offsets.immediate,
            predictor.offsets.next_draw,
            predictor.offsets.wait_one,
            predictor.offsets.fallback
        );

        Ok(())
    }
}

fn mask_token(token: &str) -> String {
    if token.is_empty() {
        return "(not set)".to_string();
    }
    match token.get(..8) {
        Some(prefix) if token.len() > 8 => format!("{prefix}...***"),
        _ => "***".to_string(),
    }
}

fn format_chat(chat_id: Option<i64>) -> String {
    chat_id.map_or_else(|| "(not set)".to_string(), |id| id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_masked() {
        assert_eq!(mask_token(""), "(not set)");
        assert_eq!(mask_token("short"), "***");
        assert_eq!(mask_token("123456789:ABCDEF"), "12345678...***");
    }
}
