pub mod analyze;
pub mod participants;

use std::path::Path;

use anyhow::Result;

use crate::config::ParleyConfig;
use crate::sources::{load_export, TelegramImport, TelegramOptions};
use crate::ui;

/// Load an export with a spinner, honouring the `[telegram]` config.
pub(crate) fn load(path: &Path, config: &ParleyConfig) -> Result<TelegramImport> {
    let spinner = ui::spinner(&format!("Reading {}", path.display()));
    let result = load_export(
        path,
        TelegramOptions {
            text_mentions: config.telegram.text_mentions,
        },
    );
    spinner.finish_and_clear();
    result
}
