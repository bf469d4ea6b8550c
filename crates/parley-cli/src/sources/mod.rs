//! Chat export adapters.

pub mod telegram;

pub use telegram::{load_export, TelegramImport, TelegramOptions};
