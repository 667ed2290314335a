//! End-to-end flows through the bus with the real handlers and mocked
//! ledger and chat collaborators.

use std::sync::Arc;

use crate::{
    domain::{
        events::{MonoEvent, TelegramEvent},
        models::{CallbackQuery, Currency, Statement, TransactionUpdate},
    },
    infra::{
        consumer::dispatcher::{
            EventDispatcher,
            handlers::{
                ErrorHandler, TelegramHandler, YnabHandler,
                test_support::{MockLedger, RecordingSender},
            },
        },
        settings::Mappings,
    },
};

const CHAT: i64 = 100;

const SETTINGS: &str = r#"
accounts:
  - mono_account: mono-card
    ynab_account: ynab-card
    telegram_chat_id: 100
categories:
  - label: Groceries
    ynab_category: cat-groceries
"#;

struct Harness {
    ledger: Arc<MockLedger>,
    sender: Arc<RecordingSender>,
    dispatcher: EventDispatcher,
}

impl Harness {
    fn new() -> Self {
        let mappings = Arc::new(Mappings::from_yaml(SETTINGS).unwrap());
        let ledger = Arc::new(MockLedger::default());
        let sender = Arc::new(RecordingSender::default());

        let dispatcher = EventDispatcher::builder()
            .handler(YnabHandler::new(ledger.clone(), mappings.clone()))
            .handler(TelegramHandler::new(sender.clone(), mappings.clone()))
            .fallback(ErrorHandler::new(mappings))
            .build();

        Self {
            ledger,
            sender,
            dispatcher,
        }
    }
}

fn statement(account: &str) -> Statement {
    Statement {
        account: account.to_string(),
        id: "st-1".into(),
        time: 1_700_000_000,
        description: "Coffee".into(),
        mcc: 5814,
        amount: -9500,
        operation_amount: -9500,
        currency: Currency::UAH,
        balance: 1_000_000,
        comment: None,
        hold: false,
    }
}

fn callback(chat_id: i64, data: &str) -> TelegramEvent {
    TelegramEvent::CallbackQueryReceived(CallbackQuery {
        id: "cb-1".into(),
        from: "ann".into(),
        chat_id: Some(chat_id),
        message_id: Some(42),
        data: Some(data.to_string()),
    })
}

#[tokio::test]
async fn test_mapped_statement_is_recorded_and_announced() {
    let h = Harness::new();

    let outcome = h
        .dispatcher
        .request(|reply| {
            MonoEvent::WebhookQueried {
                statement: statement("mono-card"),
                reply,
            }
            .into()
        })
        .await;

    assert!(outcome.claimed);
    let detail = outcome.value.expect("transaction detail");
    assert_eq!(detail.id, "tx-1");
    assert_eq!(detail.amount, -95000);

    let created = h.ledger.created.lock();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].account_id, "ynab-card");

    let sent = h.sender.sent.lock();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].chat_id, CHAT);
    assert!(sent[0].text.contains("<b>Coffee</b>"));
    let keyboard = sent[0].keyboard.as_ref().expect("keyboard");
    assert_eq!(keyboard.rows[0][0].data, "u|tx-1");
    assert_eq!(keyboard.rows[1][0].data, "c|tx-1|0");
}

#[tokio::test]
async fn test_unmapped_statement_falls_back_to_diagnostic() {
    let h = Harness::new();

    let outcome = h
        .dispatcher
        .request(|reply| {
            MonoEvent::WebhookQueried {
                statement: statement("mono-unknown"),
                reply,
            }
            .into()
        })
        .await;

    assert!(!outcome.claimed);
    assert!(outcome.value.is_none());
    assert!(h.ledger.created.lock().is_empty());

    let sent = h.sender.sent.lock();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].chat_id, CHAT);
    assert!(sent[0].text.contains("<code>mono-unknown</code> has no YNAB mapping"));
    assert!(sent[0].keyboard.is_none());
}

#[tokio::test]
async fn test_category_button_updates_ledger_and_edits_message() {
    let h = Harness::new();
    h.dispatcher
        .request(|reply| {
            MonoEvent::WebhookQueried {
                statement: statement("mono-card"),
                reply,
            }
            .into()
        })
        .await;

    let outcome = h.dispatcher.submit(callback(CHAT, "c|tx-1|0").into()).await;

    assert!(outcome.claimed);
    assert_eq!(
        *h.ledger.updates.lock(),
        vec![TransactionUpdate::Categorize {
            transaction_id: "tx-1".into(),
            category_id: "cat-groceries".into(),
        }]
    );

    let edited = h.sender.edited.lock();
    assert_eq!(edited.len(), 1);
    let (chat_id, message_id, text) = &edited[0];
    assert_eq!((*chat_id, *message_id), (CHAT, 42));
    assert!(text.contains("MCC 5814"), "statement context kept: {text}");
    assert!(text.contains("Category: Category cat-groceries"));

    assert_eq!(
        *h.sender.answers.lock(),
        vec![("cb-1".to_string(), "Done".to_string())]
    );
}

#[tokio::test]
async fn test_callback_without_cached_statement_still_edits() {
    let h = Harness::new();

    let outcome = h.dispatcher.submit(callback(CHAT, "u|tx-old").into()).await;

    assert!(outcome.claimed);
    let edited = h.sender.edited.lock();
    assert_eq!(edited.len(), 1);
    assert!(edited[0].2.contains("Status: not approved"));
}

#[tokio::test]
async fn test_ledger_failure_is_reported_not_propagated() {
    let h = Harness::new();
    h.ledger.fail();

    let outcome = h
        .dispatcher
        .request(|reply| {
            MonoEvent::WebhookQueried {
                statement: statement("mono-card"),
                reply,
            }
            .into()
        })
        .await;

    assert!(!outcome.claimed);
    assert!(outcome.value.is_none());

    let sent = h.sender.sent.lock();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].text.contains("Internal error"));
    assert!(sent[0].text.contains("ledger down"));
}

#[tokio::test]
async fn test_failed_update_answers_callback() {
    let h = Harness::new();
    h.ledger.fail();

    let outcome = h.dispatcher.submit(callback(CHAT, "n|tx-1").into()).await;

    assert!(outcome.claimed);
    assert!(h.sender.edited.lock().is_empty());
    assert!(h.sender.sent.lock().is_empty());
    assert_eq!(
        *h.sender.answers.lock(),
        vec![(
            "cb-1".to_string(),
            "Failed to update the transaction".to_string()
        )]
    );
}

#[tokio::test]
async fn test_unrecognized_callback_data_is_answered() {
    let h = Harness::new();

    let outcome = h.dispatcher.submit(callback(CHAT, "c|tx-1|7").into()).await;

    assert!(outcome.claimed);
    assert!(h.ledger.updates.lock().is_empty());
    assert_eq!(h.sender.answers.lock()[0].1, "Unrecognized action");
}

#[tokio::test]
async fn test_callback_from_unknown_chat_is_ignored() {
    let h = Harness::new();

    let outcome = h.dispatcher.submit(callback(999, "u|tx-1").into()).await;

    assert!(!outcome.claimed);
    assert!(h.ledger.updates.lock().is_empty());
    assert!(h.sender.answers.lock().is_empty());
    assert!(h.sender.sent.lock().is_empty());
}

#[tokio::test]
async fn test_chat_send_failure_does_not_unclaim_statement() {
    let h = Harness::new();
    h.sender.fail();

    let outcome = h
        .dispatcher
        .request(|reply| {
            MonoEvent::WebhookQueried {
                statement: statement("mono-card"),
                reply,
            }
            .into()
        })
        .await;

    assert!(outcome.claimed);
    assert!(outcome.value.is_some());
}

#[tokio::test]
async fn test_unclaimed_chat_message_is_not_re_reported() {
    let h = Harness::new();
    h.sender.fail();

    let outcome = h
        .dispatcher
        .submit(
            TelegramEvent::SendStatementMessage {
                statement: statement("mono-unknown"),
                transaction: super::test_support::detail("tx-9", 0),
            }
            .into(),
        )
        .await;

    assert!(!outcome.claimed);
    assert!(h.sender.sent.lock().is_empty());
}
