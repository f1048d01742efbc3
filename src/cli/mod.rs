//! User-facing commands. Each renders through a [`DisplayContext`].

pub mod alerts;
pub mod convert;
pub mod history;
pub mod predict;
pub mod rates;
pub mod setup;
pub mod shell;
pub mod ui;

use crate::core::i18n::{Language, Strings};

/// Presentation settings handed to every command.
#[derive(Debug, Clone, Copy)]
pub struct DisplayContext {
    pub language: Language,
    /// Whether the keyed provider was requested for this run.
    pub keyed_requested: bool,
}

impl DisplayContext {
    pub fn new(language: Language, keyed_requested: bool) -> Self {
        Self {
            language,
            keyed_requested,
        }
    }

    pub fn strings(&self) -> &'static Strings {
        self.language.strings()
    }
}
