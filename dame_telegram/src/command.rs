use dame_core::{Mode, PredictorStatus};
use teloxide::types::{BotCommand, InlineKeyboardButton, InlineKeyboardMarkup};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Status,
    Inter,
    Defaut,
    Activer,
}

impl Command {
    fn all() -> Vec<BotCommand> {
        vec![
            BotCommand {
                command: "status".to_string(),
                description: "État du Mode Intelligent et des échecs".to_string(),
            },
            BotCommand {
                command: "inter".to_string(),
                description: "Analyse des cycles Dame et activation interactive".to_string(),
            },
            BotCommand {
                command: "activer".to_string(),
                description: "Active le Mode Intelligent".to_string(),
            },
            BotCommand {
                command: "defaut".to_string(),
                description: "Désactive le Mode Intelligent".to_string(),
            },
            BotCommand {
                command: "help".to_string(),
                description: "Liste des commandes".to_string(),
            },
        ]
    }

    #[must_use]
    pub fn bot_commands() -> Vec<BotCommand> {
        Self::all()
    }

    /// Parse the leading `/command`, ignoring arguments and a `@bot` suffix.
    #[must_use]
    pub fn parse_from_text(text: &str) -> Option<Self> {
        let word = text.split_whitespace().next()?.to_lowercase();
        let word = word.split('@').next().unwrap_or(&word);

        match word {
            "/start" => Some(Self::Start),
            "/help" => Some(Self::Help),
            "/status" => Some(Self::Status),
            "/inter" => Some(Self::Inter),
            "/defaut" | "/défaut" => Some(Self::Defaut),
            "/activer" => Some(Self::Activer),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "/start",
            Self::Help => "/help",
            Self::Status => "/status",
            Self::Inter => "/inter",
            Self::Defaut => "/defaut",
            Self::Activer => "/activer",
        }
    }

    #[must_use]
    pub const fn help_text() -> &'static str {
        r"🤖 *COMMANDES :*
/status - Affiche l'état du Mode Intelligent et les échecs.
/inter - Analyse les déclencheurs de Dame et permet l'activation interactive de la stratégie.
/activer - Active le Mode Intelligent.
/defaut - Désactive le Mode Intelligent et réinitialise les échecs.
"
    }

    #[must_use]
    pub const fn welcome_text() -> &'static str {
        "Bot DAME PRÉDICTION démarré. Utilisez /status ou /help."
    }
}

/// Operator answer to the activation prompt, carried as callback data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PromptChoice {
    Activate,
    Deactivate,
}

impl PromptChoice {
    #[must_use]
    pub const fn callback_data(&self) -> &'static str {
        match self {
            Self::Activate => "activate_intelligent_mode",
            Self::Deactivate => "deactivate_intelligent_mode",
        }
    }

    #[must_use]
    pub fn from_callback_data(data: &str) -> Option<Self> {
        match data {
            "activate_intelligent_mode" => Some(Self::Activate),
            "deactivate_intelligent_mode" => Some(Self::Deactivate),
            _ => None,
        }
    }

    #[must_use]
    pub fn keyboard() -> InlineKeyboardMarkup {
        InlineKeyboardMarkup::new([[
            InlineKeyboardButton::callback(
                "✅ OUI (Activer Mode Intelligent)",
                Self::Activate.callback_data(),
            ),
            InlineKeyboardButton::callback(
                "❌ NON (Rester en veille)",
                Self::Deactivate.callback_data(),
            ),
        ]])
    }

    #[must_use]
    pub const fn confirmation_text(&self) -> &'static str {
        match self {
            Self::Activate => {
                "✅ *Mode Intelligent ACTIVÉ !* La stratégie (K/J/A/JJ) est maintenant appliquée pour les prédictions automatiques (N+2 ou N+3)."
            }
            Self::Deactivate => {
                "❌ *Mode Intelligent DÉSACTIVÉ.* Les prédictions restent en mode Veille."
            }
        }
    }
}

pub const PROMPT_QUESTION: &str =
    "*Voulez-vous activer le Mode Intelligent (Stratégie K/J/A/JJ) ?*";

pub const DISABLED_TEXT: &str =
    "✅ *Mode Intelligent DÉSACTIVÉ.* Les échecs sont réinitialisés, les prédictions sont en Veille.";

pub const ENABLED_TEXT: &str =
    "✅ *Mode Intelligent ACTIVÉ.* Les prédictions automatiques reprennent.";

/// Status message for `/status`.
#[must_use]
pub fn status_text(status: &PredictorStatus) -> String {
    let mode = match status.mode {
        Mode::Active => "🟢 ACTIF (Règles appliquées)",
        Mode::Dormant => "🔴 INACTIF (Veille)",
    };
    let last = status.last_prediction.as_deref().unwrap_or("Aucune");
    let last_at = status
        .last_prediction_at
        .map_or_else(|| "-".to_string(), |t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string());

    format!(
        "📊 *Statut du Predictor :*\n\
         *Mode Intelligent :* {mode}\n\
         *Échecs consécutifs :* `{}/{}`\n\
         Dernière prédiction Dame (Q) : `{last}` ({last_at})\n\
         Prédictions en attente : {}\n\
         Historique : {} tirages",
        status.consecutive_failures,
        status.max_failures,
        status.pending_predictions,
        status.history_size,
    )
}
