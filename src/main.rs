mod chart;
mod config;
mod display;
mod errors;
mod form;
mod pricing;
mod request;
mod server;
mod session;
mod state;

use crate::chart::svg::SvgChartEngine;
use crate::form::view::FormView;
use crate::pricing::client::PricingClient;
use crate::session::Session;
use crate::state::{AppState, SessionCommand};
use std::time::Duration;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("fx_pricer_client starting");

    let cfg = match config::AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("config error: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(
        pricing_service = %cfg.pricing_service_url,
        timeout_secs = cfg.request_timeout_secs,
        "pricing service configured"
    );

    // UI actions queue here while a submission is in flight
    let (session_tx, session_rx) = mpsc::channel::<SessionCommand>(64);

    let app_state = AppState::new(cfg.clone(), session_tx);

    let client = PricingClient::new(
        &cfg.pricing_service_url,
        Duration::from_secs(cfg.request_timeout_secs),
    );
    let engine = SvgChartEngine::new(cfg.chart_width, cfg.chart_height);

    // ── Session task (sole owner of the view, charts and client) ──
    let session = Session::new(FormView::with_defaults(), engine, client, app_state.clone());
    tokio::spawn(async move {
        session::run_session(session, session_rx).await;
    });

    // ── Axum HTTP + WS server ──
    let app = axum::Router::new()
        .route("/api/view", axum::routing::get(server::routes::get_view))
        .route("/api/form/options", axum::routing::get(server::routes::get_options))
        .route("/api/form/field", axum::routing::post(server::routes::post_field))
        .route("/api/form/selection", axum::routing::post(server::routes::post_selection))
        .route("/api/calculate", axum::routing::post(server::routes::post_calculate))
        .route("/api/charts/{slot}", axum::routing::get(server::routes::get_chart))
        .route("/api/charts/{slot}/tooltip", axum::routing::get(server::routes::get_tooltip))
        .route("/api/counters", axum::routing::get(server::routes::get_counters))
        .route("/ws", axum::routing::get(server::ws::ws_handler))
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        .with_state(app_state.clone());

    let addr = format!("0.0.0.0:{}", cfg.server_port);
    tracing::info!("server listening on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("bind error: {e}");
            std::process::exit(1);
        });

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("server error: {e}");
    }
}
