mod core;
mod domain;
mod infra;

use std::{path::Path, sync::Arc, time::Duration};

use anyhow::Context;
use tracing::info;
use ynab_mono_sdk::{TelegramClient, YnabClient};

use crate::{
    core::App,
    infra::{
        Config, FetcherSet, LogGuard, Mappings, MonoWebhookListener, TelegramPoller,
        UnixSignalHandler,
        config::{
            TELEGRAM_BOT_TOKEN, YNAB_BUDGET_ID, YNAB_MONO_MAX_DEPTH, YNAB_MONO_SETTINGS,
            YNAB_MONO_SHUTDOWN_TIMEOUT_SECS, YNAB_MONO_SUBMIT_TIMEOUT_SECS, YNAB_TOKEN,
        },
        consumer::{
            Consumer, DEFAULT_MAX_DEPTH, ErrorHandler, EventDispatcher, TelegramHandler,
            YnabHandler,
        },
    },
};

const CONFIG_PATH: &str = "./config";
const DEFAULT_SETTINGS_PATH: &str = "./settings.yml";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_config()?;

    let log_guard = LogGuard::init()?;
    let config = Config::new();

    let settings_path = config
        .optional(YNAB_MONO_SETTINGS)
        .unwrap_or(DEFAULT_SETTINGS_PATH);
    let mappings = Arc::new(
        Mappings::load(settings_path)
            .with_context(|| format!("failed to load settings from {settings_path}"))?,
    );
    info!(
        "loaded {} account mapping(s) from {}",
        mappings.accounts.len(),
        settings_path
    );

    let ynab = YnabClient::new(
        config.require(YNAB_TOKEN)?.to_string(),
        config.require(YNAB_BUDGET_ID)?.to_string(),
    );
    let telegram = TelegramClient::new(config.require(TELEGRAM_BOT_TOKEN)?.to_string());

    let dispatcher = EventDispatcher::builder()
        .handler(YnabHandler::new(Arc::new(ynab), mappings.clone()))
        .handler(TelegramHandler::new(
            Arc::new(telegram.clone()),
            mappings.clone(),
        ))
        .fallback(ErrorHandler::new(mappings))
        .max_depth(
            config
                .parse::<usize>(YNAB_MONO_MAX_DEPTH)?
                .unwrap_or(DEFAULT_MAX_DEPTH),
        )
        .build();

    let mut consumer = Consumer::new(dispatcher);
    if let Some(secs) = config.parse::<u64>(YNAB_MONO_SUBMIT_TIMEOUT_SECS)? {
        consumer = consumer.with_submit_timeout(Duration::from_secs(secs));
    }

    let fetcher = FetcherSet::new()
        .with(MonoWebhookListener::bind(&config).await?)
        .with(TelegramPoller::new(telegram));
    info!("starting {} event source(s)", fetcher.len());

    let mut app = App::new(UnixSignalHandler::new(), fetcher, consumer).with_log_guard(log_guard);
    if let Some(secs) = config.parse::<u64>(YNAB_MONO_SHUTDOWN_TIMEOUT_SECS)? {
        app = app.with_shutdown_timeout(Duration::from_secs(secs));
    }

    app.run().await
}

fn load_config() -> anyhow::Result<()> {
    if Path::new(CONFIG_PATH).exists() {
        dotenv::from_path(CONFIG_PATH)?;
    }
    Ok(())
}
