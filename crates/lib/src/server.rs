//! HTTP server lifecycle: bind, serve, graceful shutdown.

use crate::answer::AnswerApi;
use crate::config::Config;
use crate::line::MessagingApi;
use crate::webhook::{self, AppState};
use anyhow::{Context, Result};
use std::sync::Arc;

/// Run the webhook server; binds to `config.server.bind:config.server.port`
/// and blocks until shutdown (SIGINT/SIGTERM).
///
/// Clients are passed in explicitly: production wires up the real HTTP
/// clients, tests pass fakes.
pub async fn run_server(
    config: Config,
    answer: Arc<dyn AnswerApi>,
    messaging: Arc<dyn MessagingApi>,
) -> Result<()> {
    if config.line.channel_secret.is_none() {
        log::warn!(
            "LINE_CHANNEL_SECRET not set: webhook signature verification is DISABLED (local development mode, do not run this in production)"
        );
    }
    if config.answer.has_credential() {
        log::info!("answer service credential found: direct query mode");
    } else {
        log::info!("no answer service credential: augmented query mode with persona instruction");
    }

    let bind_addr = format!("{}:{}", config.server.bind, config.server.port);
    let state = AppState {
        config: Arc::new(config),
        answer,
        messaging,
    };
    let app = webhook::router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {}", bind_addr))?;
    log::info!("askline listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("webhook server exited")?;
    log::info!("askline stopped");
    Ok(())
}

/// Future that completes when the process should shut down (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("shutdown signal received, draining connections");
}
