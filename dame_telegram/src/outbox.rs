//! Outbound delivery, kept behind a trait so routing can run without Telegram.

use async_trait::async_trait;
use dame_core::MessageRef;
use teloxide::payloads::{EditMessageTextSetters, SendMessageSetters};
use teloxide::prelude::*;
use teloxide::types::{MessageId, ParseMode};

use crate::Result;
use crate::command::PromptChoice;

#[async_trait]
pub trait Outbox: Send + Sync {
    /// Send `text` to `chat_id` and return the new message id.
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<MessageRef>;

    /// Send `text` with the Yes/No activation keyboard.
    async fn send_prompt(&self, chat_id: i64, text: &str) -> Result<MessageRef>;

    /// Replace the text of an existing message.
    async fn edit_text(&self, chat_id: i64, message_id: MessageRef, text: &str) -> Result<()>;
}

#[async_trait]
impl Outbox for Bot {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<MessageRef> {
        let sent = self
            .send_message(ChatId(chat_id), text)
            .parse_mode(ParseMode::Markdown)
            .await?;
        Ok(sent.id.0)
    }

    async fn send_prompt(&self, chat_id: i64, text: &str) -> Result<MessageRef> {
        let sent = self
            .send_message(ChatId(chat_id), text)
            .parse_mode(ParseMode::Markdown)
            .reply_markup(PromptChoice::keyboard())
            .await?;
        Ok(sent.id.0)
    }

    async fn edit_text(&self, chat_id: i64, message_id: MessageRef, text: &str) -> Result<()> {
        self.edit_message_text(ChatId(chat_id), MessageId(message_id), text)
            .parse_mode(ParseMode::Markdown)
            .await?;
        Ok(())
    }
}
