use std::sync::Arc;

use dame_core::{Action, MessageRef, Predictor};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::command::{
    Command, DISABLED_TEXT, ENABLED_TEXT, PROMPT_QUESTION, PromptChoice, status_text,
};
use crate::{Error, Outbox, Result};

/// The single predictor instance, shared by every handler.
///
/// The lock is only held around predictor calls, never across a send.
pub type SharedPredictor = Arc<Mutex<Predictor>>;

/// Which chat plays which role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channels {
    pub source: i64,
    pub prediction: i64,
    pub admin: Option<i64>,
    /// Chats allowed to issue commands; empty allows everyone.
    pub allowed_chats: Vec<i64>,
}

impl Channels {
    #[must_use]
    pub fn is_allowed(&self, chat_id: i64) -> bool {
        self.allowed_chats.is_empty() || self.allowed_chats.contains(&chat_id)
    }
}

/// Route a text message: announcements from the source channel, commands
/// from anywhere but the prediction channel.
pub async fn handle_text<O: Outbox + ?Sized>(
    outbox: &O,
    predictor: &SharedPredictor,
    channels: &Channels,
    chat_id: i64,
    message_id: MessageRef,
    text: &str,
) -> Result<()> {
    if chat_id == channels.source {
        return handle_announcement(outbox, predictor, channels, message_id, text).await;
    }
    if chat_id == channels.prediction {
        return Ok(());
    }

    let Some(cmd) = Command::parse_from_text(text) else {
        return Ok(());
    };
    if !channels.is_allowed(chat_id) {
        return Err(Error::Unauthorized(chat_id));
    }
    handle_command(outbox, predictor, chat_id, cmd).await
}

pub async fn handle_announcement<O: Outbox + ?Sized>(
    outbox: &O,
    predictor: &SharedPredictor,
    channels: &Channels,
    message_id: MessageRef,
    text: &str,
) -> Result<()> {
    let action = predictor.lock().await.ingest(text, Some(message_id));
    dispatch_action(outbox, predictor, channels, action).await
}

/// Carry out what the predictor asked for.
pub async fn dispatch_action<O: Outbox + ?Sized>(
    outbox: &O,
    predictor: &SharedPredictor,
    channels: &Channels,
    action: Action,
) -> Result<()> {
    match action {
        Action::None => {}
        Action::SendPrediction { target_game, text } => {
            let message_id = outbox.send_text(channels.prediction, &text).await?;
            predictor
                .lock()
                .await
                .attach_message(target_game, message_id);
            info!("Prediction for N{target_game} posted (message {message_id})");
        }
        Action::EditMessage {
            target_game,
            message_id: Some(message_id),
            text,
        } => {
            outbox
                .edit_text(channels.prediction, message_id, &text)
                .await?;
            info!("Prediction for N{target_game} updated");
        }
        Action::EditMessage {
            target_game,
            message_id: None,
            text,
        } => {
            let text = format!("✅ *VÉRIFICATION TERMINÉE* pour N{target_game} :\n{text}");
            outbox.send_text(channels.prediction, &text).await?;
            info!("Prediction for N{target_game} resolved in a new message");
        }
        Action::FailureThresholdReached { target_game } => {
            if let Some(admin) = channels.admin {
                info!("Failure threshold reached at N{target_game}, prompting admin {admin}");
                send_inter_prompt(outbox, predictor, admin).await?;
            } else {
                warn!("Failure threshold reached at N{target_game} but no admin chat configured");
            }
        }
    }
    Ok(())
}

/// Cycle report followed by the Yes/No activation keyboard.
pub async fn send_inter_prompt<O: Outbox + ?Sized>(
    outbox: &O,
    predictor: &SharedPredictor,
    chat_id: i64,
) -> Result<()> {
    let report = predictor.lock().await.cycle_report();
    let text = format!("{report}\n\n{PROMPT_QUESTION}");
    outbox.send_prompt(chat_id, &text).await?;
    Ok(())
}

pub async fn handle_command<O: Outbox + ?Sized>(
    outbox: &O,
    predictor: &SharedPredictor,
    chat_id: i64,
    cmd: Command,
) -> Result<()> {
    info!("[{chat_id}] Command: {}", cmd.as_str());

    match cmd {
        Command::Start => {
            outbox.send_text(chat_id, Command::welcome_text()).await?;
        }
        Command::Help => {
            outbox.send_text(chat_id, Command::help_text()).await?;
        }
        Command::Status => {
            let status = predictor.lock().await.status();
            outbox.send_text(chat_id, &status_text(&status)).await?;
        }
        Command::Inter => {
            send_inter_prompt(outbox, predictor, chat_id).await?;
        }
        Command::Defaut => {
            predictor.lock().await.set_mode(false);
            outbox.send_text(chat_id, DISABLED_TEXT).await?;
        }
        Command::Activer => {
            predictor.lock().await.set_mode(true);
            outbox.send_text(chat_id, ENABLED_TEXT).await?;
        }
    }

    Ok(())
}

/// Apply the operator's answer and replace the prompt with a confirmation.
pub async fn handle_prompt_choice<O: Outbox + ?Sized>(
    outbox: &O,
    predictor: &SharedPredictor,
    channels: &Channels,
    chat_id: i64,
    message_id: MessageRef,
    data: &str,
) -> Result<()> {
    if !channels.is_allowed(chat_id) {
        return Err(Error::Unauthorized(chat_id));
    }
    let Some(choice) = PromptChoice::from_callback_data(data) else {
        warn!("[{chat_id}] Unknown callback data: {data}");
        return Ok(());
    };

    predictor
        .lock()
        .await
        .set_mode(choice == PromptChoice::Activate);
    info!("[{chat_id}] Prompt answered: {}", choice.callback_data());

    outbox
        .edit_text(chat_id, message_id, choice.confirmation_text())
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use dame_core::Mode;
    use std::sync::Mutex as StdMutex;

    const SOURCE: i64 = -100;
    const PREDICTION: i64 = -200;
    const ADMIN: i64 = 7;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Sent {
        Text(i64, String),
        Prompt(i64, String),
        Edit(i64, MessageRef, String),
    }

    #[derive(Default)]
    struct RecordingOutbox {
        sent: StdMutex<Vec<Sent>>,
    }

    impl RecordingOutbox {
        fn sent(&self) -> Vec<Sent> {
            self.sent.lock().unwrap().clone()
        }

        fn push(&self, sent: Sent) -> MessageRef {
            let mut log = self.sent.lock().unwrap();
            log.push(sent);
            MessageRef::try_from(log.len()).unwrap() + 500
        }
    }

    #[async_trait]
    impl Outbox for RecordingOutbox {
        async fn send_text(&self, chat_id: i64, text: &str) -> Result<MessageRef> {
            Ok(self.push(Sent::Text(chat_id, text.to_string())))
        }

        async fn send_prompt(&self, chat_id: i64, text: &str) -> Result<MessageRef> {
            Ok(self.push(Sent::Prompt(chat_id, text.to_string())))
        }

        async fn edit_text(&self, chat_id: i64, message_id: MessageRef, text: &str) -> Result<()> {
            self.push(Sent::Edit(chat_id, message_id, text.to_string()));
            Ok(())
        }
    }

    fn channels(admin: Option<i64>) -> Channels {
        Channels {
            source: SOURCE,
            prediction: PREDICTION,
            admin,
            allowed_chats: Vec::new(),
        }
    }

    fn active_predictor() -> SharedPredictor {
        let mut predictor = Predictor::default();
        predictor.set_mode(true);
        Arc::new(Mutex::new(predictor))
    }

    #[tokio::test]
    async fn prediction_is_posted_then_edited() {
        let outbox = RecordingOutbox::default();
        let predictor = active_predictor();
        let channels = channels(Some(ADMIN));

        handle_text(&outbox, &predictor, &channels, SOURCE, 1, "#N100. ⏳ 5(K♠3♦)")
            .await
            .unwrap();
        handle_text(&outbox, &predictor, &channels, SOURCE, 2, "#N103. ✅ 5(Q♠3♦)")
            .await
            .unwrap();

        let sent = outbox.sent();
        assert_eq!(sent.len(), 2);
        assert!(matches!(&sent[0], Sent::Text(PREDICTION, text) if text.contains("🎯103🎯")));
        assert!(matches!(
            &sent[1],
            Sent::Edit(PREDICTION, 501, text) if text.ends_with("statut :✅")
        ));
    }

    #[tokio::test]
    async fn edit_without_message_posts_fresh_text() {
        let outbox = RecordingOutbox::default();
        let predictor = active_predictor();
        predictor
            .lock()
            .await
            .make_prediction(10, Some(dame_core::DameRule::Immediate));

        handle_announcement(&outbox, &predictor, &channels(None), 3, "#N12. ✅ 5(Q♠3♦)")
            .await
            .unwrap();

        assert!(matches!(
            outbox.sent().as_slice(),
            [Sent::Text(PREDICTION, text)] if text.starts_with("✅ *VÉRIFICATION TERMINÉE* pour N12")
        ));
    }

    #[tokio::test]
    async fn threshold_prompts_admin() {
        let outbox = RecordingOutbox::default();
        let predictor = active_predictor();

        dispatch_action(
            &outbox,
            &predictor,
            &channels(Some(ADMIN)),
            Action::FailureThresholdReached { target_game: 12 },
        )
        .await
        .unwrap();

        assert!(matches!(
            outbox.sent().as_slice(),
            [Sent::Prompt(ADMIN, text)] if text.ends_with(PROMPT_QUESTION)
        ));
    }

    #[tokio::test]
    async fn threshold_without_admin_sends_nothing() {
        let outbox = RecordingOutbox::default();
        let predictor = active_predictor();

        dispatch_action(
            &outbox,
            &predictor,
            &channels(None),
            Action::FailureThresholdReached { target_game: 12 },
        )
        .await
        .unwrap();

        assert!(outbox.sent().is_empty());
    }

    #[tokio::test]
    async fn commands_ignored_in_prediction_channel() {
        let outbox = RecordingOutbox::default();
        let predictor = active_predictor();

        handle_text(&outbox, &predictor, &channels(None), PREDICTION, 1, "/defaut")
            .await
            .unwrap();

        assert!(outbox.sent().is_empty());
        assert_eq!(predictor.lock().await.mode(), Mode::Active);
    }

    #[tokio::test]
    async fn defaut_and_activer_switch_mode() {
        let outbox = RecordingOutbox::default();
        let predictor = active_predictor();
        let channels = channels(None);

        handle_text(&outbox, &predictor, &channels, ADMIN, 1, "/defaut")
            .await
            .unwrap();
        assert_eq!(predictor.lock().await.mode(), Mode::Dormant);

        handle_text(&outbox, &predictor, &channels, ADMIN, 2, "/activer")
            .await
            .unwrap();
        assert_eq!(predictor.lock().await.mode(), Mode::Active);
        assert_eq!(outbox.sent().len(), 2);
    }

    #[tokio::test]
    async fn unauthorized_chat_is_rejected() {
        let outbox = RecordingOutbox::default();
        let predictor = active_predictor();
        let channels = Channels {
            allowed_chats: vec![ADMIN],
            ..channels(None)
        };

        let result = handle_text(&outbox, &predictor, &channels, 99, 1, "/status").await;

        assert!(matches!(result, Err(Error::Unauthorized(99))));
        assert!(outbox.sent().is_empty());
    }

    #[tokio::test]
    async fn prompt_answer_sets_mode_and_edits_prompt() {
        let outbox = RecordingOutbox::default();
        let predictor = Arc::new(Mutex::new(Predictor::default()));

        handle_prompt_choice(
            &outbox,
            &predictor,
            &channels(None),
            ADMIN,
            40,
            "activate_intelligent_mode",
        )
        .await
        .unwrap();

        assert_eq!(predictor.lock().await.mode(), Mode::Active);
        assert!(matches!(
            outbox.sent().as_slice(),
            [Sent::Edit(ADMIN, 40, text)] if text.contains("ACTIVÉ")
        ));
    }
}
