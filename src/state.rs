use crate::chart::ChartSlot;
use crate::config::AppConfig;
use crate::form::view::FormView;
use crate::form::{Field, InstrumentType, StrikeMode};
use portable_atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use uuid::Uuid;

// ── Messages INTO the session (bounded channel) ──

#[derive(Debug, Clone)]
pub enum UiAction {
    SetField { field: Field, value: String },
    SelectInstrument(InstrumentType),
    SelectStrikeMode(StrikeMode),
    /// Submit control clicked.
    Calculate,
    Shutdown,
}

#[derive(Debug)]
pub struct SessionCommand {
    pub action: UiAction,
    /// Receives the view once the action has been fully handled.
    pub reply: Option<oneshot::Sender<ViewSnapshot>>,
}

// ── Messages OUT of the session ──

#[derive(Debug, Clone, serde::Serialize)]
#[serde(tag = "type")]
pub enum WsMessage {
    #[serde(rename = "view_update")]
    ViewUpdate { form: Box<FormView> },

    #[serde(rename = "alert")]
    Alert { message: String, timestamp: String },

    #[serde(rename = "chart_rendered")]
    ChartRendered {
        slot: ChartSlot,
        handle_id: Uuid,
        timestamp: String,
    },

    #[serde(rename = "chart_cleared")]
    ChartCleared { slot: ChartSlot, timestamp: String },
}

// ── View snapshot for the server (sent via watch channel) ──

#[derive(Debug, Clone, serde::Serialize)]
pub struct ChartView {
    pub slot: ChartSlot,
    pub handle_id: Uuid,
    pub rendered_at: String,
    #[serde(skip)]
    pub svg: String,
    #[serde(skip)]
    pub tooltips: Vec<Vec<String>>,
}

impl ChartView {
    pub fn tooltip(&self, dataset: usize, index: usize) -> Option<&str> {
        self.tooltips.get(dataset)?.get(index).map(String::as_str)
    }
}

#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct ViewSnapshot {
    pub form: FormView,
    pub vol_chart: Option<ChartView>,
    pub payoff_chart: Option<ChartView>,
}

impl ViewSnapshot {
    pub fn chart(&self, slot: ChartSlot) -> Option<&ChartView> {
        match slot {
            ChartSlot::Vol => self.vol_chart.as_ref(),
            ChartSlot::Payoff => self.payoff_chart.as_ref(),
        }
    }
}

// ── Session counters (lock-free) ──

pub struct SessionCounters {
    pub submissions: AtomicU64,
    pub priced: AtomicU64,
    pub rejected: AtomicU64,
    pub transport_failures: AtomicU64,
    pub faults: AtomicU64,
    pub charts_rendered: AtomicU64,
    pub ws_messages_sent: AtomicU64,
}

impl SessionCounters {
    pub fn new() -> Self {
        Self {
            submissions: AtomicU64::new(0),
            priced: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            transport_failures: AtomicU64::new(0),
            faults: AtomicU64::new(0),
            charts_rendered: AtomicU64::new(0),
            ws_messages_sent: AtomicU64::new(0),
        }
    }
}

// ── Application shared state (channels, not locks) ──

pub struct AppState {
    pub config: AppConfig,

    // Session -> Server: latest view (watch = single producer, multi consumer)
    pub snapshot_tx: watch::Sender<ViewSnapshot>,
    pub snapshot_rx: watch::Receiver<ViewSnapshot>,

    // Session -> Server: event stream (broadcast for WS clients)
    pub ws_tx: broadcast::Sender<WsMessage>,

    // Server -> Session: bounded command channel
    pub session_tx: mpsc::Sender<SessionCommand>,

    pub counters: SessionCounters,
}

impl AppState {
    pub fn new(config: AppConfig, session_tx: mpsc::Sender<SessionCommand>) -> Arc<Self> {
        let (ws_tx, _) = broadcast::channel(256);
        let (snapshot_tx, snapshot_rx) = watch::channel(ViewSnapshot::default());

        Arc::new(Self {
            config,
            snapshot_tx,
            snapshot_rx,
            ws_tx,
            session_tx,
            counters: SessionCounters::new(),
        })
    }

    #[inline]
    pub fn broadcast(&self, msg: WsMessage) {
        self.counters.ws_messages_sent.fetch_add(1, Ordering::Relaxed);
        let _ = self.ws_tx.send(msg);
    }
}
