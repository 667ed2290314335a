use std::fmt::Write;

use crate::{
    domain::models::{
        InlineButton, InlineKeyboard, Statement, TransactionDetail, format_milliunits,
        format_minor_units,
    },
    infra::{
        consumer::dispatcher::handlers::callback::{CallbackAction, CallbackData},
        settings::Mappings,
    },
};

const CATEGORY_BUTTONS_PER_ROW: usize = 3;

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn statement_message(statement: &Statement, transaction: &TransactionDetail) -> String {
    let mut text = String::new();
    let _ = writeln!(text, "<b>{}</b>", escape_html(&statement.description));
    let _ = write!(
        text,
        "{} {}",
        format_minor_units(statement.operation_amount),
        statement.currency
    );
    if statement.hold {
        text.push_str(" (hold)");
    }
    let _ = writeln!(text, "\nMCC {}", statement.mcc);
    let _ = writeln!(text, "Balance: {}", format_minor_units(statement.balance));
    if let Some(comment) = statement.comment.as_deref().filter(|c| !c.is_empty()) {
        let _ = writeln!(text, "<i>{}</i>", escape_html(comment));
    }
    text.push('\n');
    text.push_str(&transaction_summary(transaction));
    text
}

/// Used when the originating statement is no longer known.
pub fn transaction_message(transaction: &TransactionDetail) -> String {
    let mut text = String::new();
    if let Some(payee) = &transaction.payee_name {
        let _ = writeln!(text, "<b>{}</b>", escape_html(payee));
    }
    text.push_str(&transaction_summary(transaction));
    text
}

fn transaction_summary(transaction: &TransactionDetail) -> String {
    let category = transaction
        .category_name
        .as_deref()
        .map(escape_html)
        .unwrap_or_else(|| "Uncategorized".to_string());
    let approval = if transaction.approved {
        "approved"
    } else {
        "not approved"
    };

    format!(
        "{} in <b>{}</b> on {}\nCategory: {}\nStatus: {}\n<code>{}</code>",
        format_milliunits(transaction.amount),
        escape_html(&transaction.account_name),
        transaction.date,
        category,
        approval,
        transaction.id,
    )
}

pub fn transaction_keyboard(transaction_id: &str, mappings: &Mappings) -> InlineKeyboard {
    let button = |text: &str, action| InlineButton {
        text: text.to_string(),
        data: CallbackData::new(transaction_id, action).encode(),
    };

    let mut keyboard = InlineKeyboard::default().row(vec![
        button("Unapprove", CallbackAction::Unapprove),
        button("Uncategorize", CallbackAction::Uncategorize),
    ]);

    let categories: Vec<InlineButton> = mappings
        .categories
        .iter()
        .enumerate()
        .map(|(index, shortcut)| button(&shortcut.label, CallbackAction::Category(index)))
        .collect();
    for row in categories.chunks(CATEGORY_BUTTONS_PER_ROW) {
        keyboard = keyboard.row(row.to_vec());
    }

    keyboard
}
