//! Configuration file and environment overrides for the dame bot.

mod schema;

pub use schema::{CONFIG_DIR, CONFIG_FILE, Config, ENV_OVERRIDES, TelegramConfig};
