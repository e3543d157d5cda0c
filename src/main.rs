mod config;
mod constants;
mod error;
mod handlers;
mod models;
mod services;
mod utils;

use std::{any::Any, backtrace::Backtrace, time::Duration};

use axum::{
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use log::{error, info};
use tower_http::{
    catch_panic::CatchPanicLayer,
    compression::{
        predicate::{DefaultPredicate, NotForContentType, Predicate},
        CompressionLayer,
    },
};

use crate::config::Settings;
use crate::constants::*;
use crate::error::ChatError;
use crate::models::App;
use crate::services::GeminiBackend;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    install_panic_logger();

    let settings = Settings::from_env();

    info!("🚀 Gemini chat proxy starting...");
    info!("   Model: {}", settings.model);
    info!("   API base: {}", settings.api_base);
    info!(
        "   {}: {}",
        API_KEY_ENV,
        if settings.has_credential() { "Set" } else { "Not set (chat requests will fail)" }
    );
    info!("   Upstream Timeout: {}s", settings.timeout_secs);

    let http = reqwest::Client::builder()
        .pool_max_idle_per_host(1024)
        .tcp_keepalive(Some(Duration::from_secs(60)))
        .connect_timeout(Duration::from_secs(10))
        .timeout(Duration::from_secs(settings.timeout_secs))
        .build()?;

    let backend = GeminiBackend::new(http, settings.api_base.clone());
    let port = settings.port;
    let router = build_router(App::new(settings, backend));

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    info!("   Listening on: 0.0.0.0:{}", port);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 Shut down cleanly");
    Ok(())
}

fn build_router(app: App) -> Router {
    // The streamed text body must reach the client chunk by chunk
    let compress_when = DefaultPredicate::new().and(NotForContentType::new("text/plain"));

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/chat", post(handlers::chat))
        .layer(axum::extract::DefaultBodyLimit::max(MAX_BODY_SIZE))
        .layer(CompressionLayer::new().compress_when(compress_when))
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(app)
}

/// Logs every panic where it happens, with a backtrace when `RUST_BACKTRACE` enables one.
/// `handle_panic` runs after unwinding, so the panic site is only visible from here.
fn install_panic_logger() {
    std::panic::set_hook(Box::new(|info| {
        let location = info.location().map(|l| l.to_string());
        let trace = Backtrace::capture();
        let message = panic_message(info.payload());
        error!("{}", panic_report(&message, location.as_deref(), &trace));
    }));
}

fn panic_report(message: &str, location: Option<&str>, trace: &Backtrace) -> String {
    format!(
        "💥 Panic at {}: {}\n{}",
        location.unwrap_or("unknown location"),
        message,
        trace
    )
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown panic message".to_string()
    }
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let message = panic_message(&*err);
    error!("💥 Unhandled Chat API error: {}", message);
    ChatError::Unhandled(message).into_response()
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("🛑 Shutdown signal received");
}
