use crate::chart::ChartSlot;
use crate::form::{Field, InstrumentType, StrikeMode};
use crate::session::dispatch;
use crate::state::{AppState, UiAction, ViewSnapshot};
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use std::sync::Arc;

#[derive(serde::Deserialize)]
pub struct FieldUpdate {
    pub field: Field,
    pub value: String,
}

#[derive(serde::Deserialize)]
pub struct SelectionUpdate {
    pub instrument: Option<InstrumentType>,
    pub strike_mode: Option<StrikeMode>,
}

#[derive(serde::Deserialize)]
pub struct TooltipQuery {
    pub dataset: usize,
    pub index: usize,
}

fn not_found(msg: &str) -> Response {
    (StatusCode::NOT_FOUND, Json(serde_json::json!({ "error": msg }))).into_response()
}

fn snapshot_or_error(result: crate::errors::ClientResult<ViewSnapshot>) -> Response {
    match result {
        Ok(snapshot) => Json(snapshot).into_response(),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}

/// GET /api/view -- current view (from watch channel, no lock)
pub async fn get_view(State(state): State<Arc<AppState>>) -> Json<ViewSnapshot> {
    let snapshot = state.snapshot_rx.borrow().clone();
    Json(snapshot)
}

/// GET /api/form/options -- selector choices in display order
pub async fn get_options() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "instrument": InstrumentType::ALL,
        "strike_mode": StrikeMode::ALL,
    }))
}

/// POST /api/form/field -- text typed into an input
pub async fn post_field(
    State(state): State<Arc<AppState>>,
    Json(update): Json<FieldUpdate>,
) -> Response {
    let action = UiAction::SetField {
        field: update.field,
        value: update.value,
    };
    snapshot_or_error(dispatch(&state, action).await)
}

/// POST /api/form/selection -- either selector changed
pub async fn post_selection(
    State(state): State<Arc<AppState>>,
    Json(update): Json<SelectionUpdate>,
) -> Response {
    let mut result = Ok(state.snapshot_rx.borrow().clone());
    if let Some(instrument) = update.instrument {
        result = dispatch(&state, UiAction::SelectInstrument(instrument)).await;
    }
    if let Some(strike_mode) = update.strike_mode {
        if result.is_ok() {
            result = dispatch(&state, UiAction::SelectStrikeMode(strike_mode)).await;
        }
    }
    snapshot_or_error(result)
}

/// POST /api/calculate -- submit; replies once the submission has finished
pub async fn post_calculate(State(state): State<Arc<AppState>>) -> Response {
    snapshot_or_error(dispatch(&state, UiAction::Calculate).await)
}

/// GET /api/charts/{slot} -- rendered SVG for a chart slot
pub async fn get_chart(
    State(state): State<Arc<AppState>>,
    Path(slot): Path<String>,
) -> Response {
    let Some(slot) = ChartSlot::from_name(&slot) else {
        return not_found("unknown chart slot");
    };
    let snapshot = state.snapshot_rx.borrow().clone();
    match snapshot.chart(slot) {
        Some(chart) => (
            [(header::CONTENT_TYPE, "image/svg+xml")],
            chart.svg.clone(),
        )
            .into_response(),
        None => not_found("chart not rendered"),
    }
}

/// GET /api/charts/{slot}/tooltip?dataset=&index= -- hover text for one point
pub async fn get_tooltip(
    State(state): State<Arc<AppState>>,
    Path(slot): Path<String>,
    Query(q): Query<TooltipQuery>,
) -> Response {
    let Some(slot) = ChartSlot::from_name(&slot) else {
        return not_found("unknown chart slot");
    };
    let snapshot = state.snapshot_rx.borrow().clone();
    match snapshot.chart(slot).and_then(|c| c.tooltip(q.dataset, q.index)) {
        Some(text) => Json(serde_json::json!({ "slot": slot, "text": text })).into_response(),
        None => not_found("no such point"),
    }
}

/// GET /api/counters -- session counters (lock-free reads)
pub async fn get_counters(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    use portable_atomic::Ordering::Relaxed;
    Json(serde_json::json!({
        "pricing_service": state.config.pricing_service_url,
        "submissions": state.counters.submissions.load(Relaxed),
        "priced": state.counters.priced.load(Relaxed),
        "rejected": state.counters.rejected.load(Relaxed),
        "transport_failures": state.counters.transport_failures.load(Relaxed),
        "faults": state.counters.faults.load(Relaxed),
        "charts_rendered": state.counters.charts_rendered.load(Relaxed),
        "ws_messages_sent": state.counters.ws_messages_sent.load(Relaxed),
    }))
}
