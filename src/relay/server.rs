use super::config::RelayArgs;
use super::handlers::{cron, health, sync, webhook};
use super::messenger::{MaxMessenger, Messenger};
use super::reminder::run_sweep;
use super::store::{MemoryUserStore, UserStore};
use crate::ticker::sweep_interval;
use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use chrono::Local;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

#[derive(Clone)]
pub struct RelayState {
    pub store: Arc<dyn UserStore>,
    pub messenger: Arc<dyn Messenger>,
    pub webapp_url: String,
    /// Minimum gap between reminders to one user
    pub cooldown: chrono::Duration,
}

pub fn router(state: RelayState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/webhook", post(webhook))
        .route("/api/sync", post(sync))
        .route("/api/cron", post(cron))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the relay until Ctrl-C
pub async fn serve(args: RelayArgs) -> Result<()> {
    if args.bot_token.is_none() {
        warn!("MAX_BOT_TOKEN not set, outgoing messages will be skipped");
    }

    let messenger = MaxMessenger::new(&args.api_url, args.bot_token.clone()).context("Failed to build messenger client")?;
    let state = RelayState {
        store: Arc::new(MemoryUserStore::new()),
        messenger: Arc::new(messenger),
        webapp_url: args.webapp_url.clone(),
        cooldown: chrono::Duration::hours(args.reminder_cooldown_hours),
    };

    let sweeper = tokio::spawn(reminder_loop(state.clone(), sweep_interval(args.reminder_interval_secs)));

    let addr: SocketAddr = args
        .listen
        .parse()
        .with_context(|| format!("Invalid listen address: {}", args.listen))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("relay listening on http://{}", addr);

    axum::serve(listener, router(state)).with_graceful_shutdown(shutdown_signal()).await?;

    sweeper.abort();
    Ok(())
}

async fn reminder_loop(state: RelayState, period: Duration) {
    let mut interval = tokio::time::interval(period);
    // The first tick completes immediately; sweeps start one period after startup
    interval.tick().await;

    loop {
        interval.tick().await;
        match run_sweep(
            state.store.as_ref(),
            state.messenger.as_ref(),
            &state.webapp_url,
            Local::now(),
            state.cooldown,
        )
        .await
        {
            Ok(0) => {}
            Ok(sent) => info!("Reminder sweep sent {} messages", sent),
            Err(e) => error!("Reminder sweep failed: {}", e),
        }
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown requested");
}
