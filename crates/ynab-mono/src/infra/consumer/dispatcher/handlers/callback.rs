use crate::{domain::models::TransactionUpdate, infra::settings::Mappings};

const SEPARATOR: char = '|';

/// Action attached to an inline button. Kept short: Telegram caps callback
/// data at 64 bytes, so categories travel as shortcut indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackAction {
    Unapprove,
    Uncategorize,
    Category(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackData {
    pub transaction_id: String,
    pub action: CallbackAction,
}

impl CallbackData {
    pub fn new(transaction_id: &str, action: CallbackAction) -> Self {
        Self {
            transaction_id: transaction_id.to_string(),
            action,
        }
    }

    pub fn encode(&self) -> String {
        match self.action {
            CallbackAction::Unapprove => format!("u{SEPARATOR}{}", self.transaction_id),
            CallbackAction::Uncategorize => format!("n{SEPARATOR}{}", self.transaction_id),
            CallbackAction::Category(index) => {
                format!("c{SEPARATOR}{}{SEPARATOR}{index}", self.transaction_id)
            }
        }
    }

    pub fn decode(raw: &str) -> Option<Self> {
        let mut parts = raw.split(SEPARATOR);
        let tag = parts.next()?;
        let transaction_id = parts.next().filter(|id| !id.is_empty())?.to_string();

        let action = match (tag, parts.next()) {
            ("u", None) => CallbackAction::Unapprove,
            ("n", None) => CallbackAction::Uncategorize,
            ("c", Some(index)) => CallbackAction::Category(index.parse().ok()?),
            _ => return None,
        };

        if parts.next().is_some() {
            return None;
        }

        Some(Self {
            transaction_id,
            action,
        })
    }

    /// Resolves the action against the configured category shortcuts.
    pub fn into_update(self, mappings: &Mappings) -> Option<TransactionUpdate> {
        let transaction_id = self.transaction_id;
        let update = match self.action {
            CallbackAction::Unapprove => TransactionUpdate::Unapprove { transaction_id },
            CallbackAction::Uncategorize => TransactionUpdate::Uncategorize { transaction_id },
            CallbackAction::Category(index) => TransactionUpdate::Categorize {
                transaction_id,
                category_id: mappings.category(index)?.ynab_category.clone(),
            },
        };
        Some(update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::settings::CategoryShortcut;

    const TX: &str = "5b1c2f4e-0a9d-4e7b-9f3a-2c8d7e6f5a4b";

    #[test]
    fn test_encoded_data_fits_telegram_limit() {
        let data = CallbackData::new(TX, CallbackAction::Category(99)).encode();
        assert!(data.len() <= 64, "{} bytes", data.len());
    }

    #[test]
    fn test_decode_each_action() {
        for action in [
            CallbackAction::Unapprove,
            CallbackAction::Uncategorize,
            CallbackAction::Category(3),
        ] {
            let encoded = CallbackData::new(TX, action).encode();
            assert_eq!(
                CallbackData::decode(&encoded),
                Some(CallbackData::new(TX, action))
            );
        }
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert_eq!(CallbackData::decode(""), None);
        assert_eq!(CallbackData::decode("u|"), None);
        assert_eq!(CallbackData::decode("x|tx"), None);
        assert_eq!(CallbackData::decode("c|tx"), None);
        assert_eq!(CallbackData::decode("c|tx|abc"), None);
        assert_eq!(CallbackData::decode("u|tx|1"), None);
        assert_eq!(CallbackData::decode("c|tx|1|2"), None);
    }

    #[test]
    fn test_category_resolved_through_mappings() {
        let mappings = Mappings {
            accounts: vec![],
            categories: vec![CategoryShortcut {
                label: "Food".into(),
                ynab_category: "cat-food".into(),
            }],
        };

        let update = CallbackData::new("tx", CallbackAction::Category(0)).into_update(&mappings);
        assert_eq!(
            update,
            Some(TransactionUpdate::Categorize {
                transaction_id: "tx".into(),
                category_id: "cat-food".into(),
            })
        );

        let missing = CallbackData::new("tx", CallbackAction::Category(1)).into_update(&mappings);
        assert_eq!(missing, None);
    }
}
