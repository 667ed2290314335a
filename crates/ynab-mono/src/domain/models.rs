use std::fmt;

/// ISO 4217 numeric currency code as reported by the bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Currency(pub u16);

impl Currency {
    pub const UAH: Currency = Currency(980);
    pub const USD: Currency = Currency(840);
    pub const EUR: Currency = Currency(978);
    pub const PLN: Currency = Currency(985);
    pub const GBP: Currency = Currency(826);

    pub fn alpha_code(&self) -> Option<&'static str> {
        match *self {
            Currency::UAH => Some("UAH"),
            Currency::USD => Some("USD"),
            Currency::EUR => Some("EUR"),
            Currency::PLN => Some("PLN"),
            Currency::GBP => Some("GBP"),
            _ => None,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.alpha_code() {
            Some(code) => f.write_str(code),
            None => write!(f, "#{}", self.0),
        }
    }
}

/// A bank account movement delivered by the webhook. Amounts are in minor
/// units (1/100) of the account currency.
#[derive(Debug, Clone)]
pub struct Statement {
    pub account: String,
    pub id: String,
    pub time: i64,
    pub description: String,
    pub mcc: u16,
    pub amount: i64,
    pub operation_amount: i64,
    pub currency: Currency,
    pub balance: i64,
    pub comment: Option<String>,
    pub hold: bool,
}

/// Request to record a statement in the ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub account_id: String,
    pub date: chrono::NaiveDate,
    /// YNAB milliunits.
    pub amount: i64,
    pub currency: Currency,
    pub payee_name: String,
    pub memo: Option<String>,
    pub import_id: String,
}

/// Ledger-side view of a recorded transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionDetail {
    pub id: String,
    pub date: String,
    /// YNAB milliunits.
    pub amount: i64,
    pub account_name: String,
    pub payee_name: Option<String>,
    pub category_id: Option<String>,
    pub category_name: Option<String>,
    pub memo: Option<String>,
    pub approved: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionUpdate {
    Unapprove { transaction_id: String },
    Uncategorize { transaction_id: String },
    Categorize {
        transaction_id: String,
        category_id: String,
    },
}

impl TransactionUpdate {
    pub fn transaction_id(&self) -> &str {
        match self {
            TransactionUpdate::Unapprove { transaction_id }
            | TransactionUpdate::Uncategorize { transaction_id }
            | TransactionUpdate::Categorize { transaction_id, .. } => transaction_id,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CallbackQuery {
    pub id: String,
    pub from: String,
    pub chat_id: Option<i64>,
    pub message_id: Option<i64>,
    pub data: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineButton {
    pub text: String,
    pub data: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineKeyboard {
    pub rows: Vec<Vec<InlineButton>>,
}

impl InlineKeyboard {
    pub fn row(mut self, buttons: Vec<InlineButton>) -> Self {
        if !buttons.is_empty() {
            self.rows.push(buttons);
        }
        self
    }
}

/// Formats minor units as a decimal amount, e.g. `-9500` -> `-95.00`.
pub fn format_minor_units(amount: i64) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    let abs = amount.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

/// Formats YNAB milliunits, e.g. `-95000` -> `-95.00`.
pub fn format_milliunits(amount: i64) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    let abs = amount.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 1000, (abs % 1000) / 10)
}
