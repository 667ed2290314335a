use std::{collections::HashSet, fs, path::Path};

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("monobank account '{0}' is mapped more than once")]
    DuplicateAccount(String),

    #[error("category shortcut '{0}' has an empty YNAB category id")]
    EmptyCategory(String),
}

/// Static routing data shared read-only by every handler.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Mappings {
    #[serde(default)]
    pub accounts: Vec<AccountMapping>,
    #[serde(default)]
    pub categories: Vec<CategoryShortcut>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountMapping {
    pub mono_account: String,
    pub ynab_account: String,
    #[serde(default)]
    pub telegram_chat_id: Option<i64>,
}

/// A category offered as a one-tap button under statement messages.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryShortcut {
    pub label: String,
    pub ynab_category: String,
}

impl Mappings {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&raw)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, SettingsError> {
        let mappings: Mappings = serde_yaml::from_str(raw)?;
        mappings.validate()?;
        Ok(mappings)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        let mut seen = HashSet::new();
        for account in &self.accounts {
            if !seen.insert(account.mono_account.as_str()) {
                return Err(SettingsError::DuplicateAccount(account.mono_account.clone()));
            }
        }

        if let Some(shortcut) = self.categories.iter().find(|c| c.ynab_category.is_empty()) {
            return Err(SettingsError::EmptyCategory(shortcut.label.clone()));
        }

        Ok(())
    }

    pub fn account(&self, mono_account: &str) -> Option<&AccountMapping> {
        self.accounts.iter().find(|a| a.mono_account == mono_account)
    }

    pub fn chats_for(&self, mono_account: &str) -> Vec<i64> {
        self.account(mono_account)
            .and_then(|a| a.telegram_chat_id)
            .into_iter()
            .collect()
    }

    pub fn is_known_chat(&self, chat_id: i64) -> bool {
        self.accounts
            .iter()
            .any(|a| a.telegram_chat_id == Some(chat_id))
    }

    /// Every configured chat, deduplicated, in configuration order.
    pub fn all_chats(&self) -> Vec<i64> {
        let mut seen = HashSet::new();
        self.accounts
            .iter()
            .filter_map(|a| a.telegram_chat_id)
            .filter(|id| seen.insert(*id))
            .collect()
    }

    pub fn category(&self, index: usize) -> Option<&CategoryShortcut> {
        self.categories.get(index)
    }
}
