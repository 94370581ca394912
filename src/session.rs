use crate::chart::{ChartEngine, ChartRenderer, ChartSlot};
use crate::display::format_result;
use crate::errors::{ClientError, ClientResult};
use crate::form::view::FormView;
use crate::pricing::client::PricingClient;
use crate::pricing::types::{PricingOutcome, PricingResult};
use crate::request::build_request;
use crate::state::{AppState, ChartView, SessionCommand, UiAction, ViewSnapshot, WsMessage};
use portable_atomic::Ordering;
use std::sync::Arc;
use tokio::sync::mpsc;

pub const TRANSPORT_ALERT: &str = "An unexpected error occurred.";

/// One user session: the page, its charts and the pricing client.
/// Owned by a single task; the network call is the only await point.
pub struct Session<E: ChartEngine> {
    view: FormView,
    charts: ChartRenderer<E>,
    client: PricingClient,
    state: Arc<AppState>,
}

impl<E: ChartEngine> Session<E> {
    pub fn new(view: FormView, engine: E, client: PricingClient, state: Arc<AppState>) -> Self {
        let mut session = Self {
            view,
            charts: ChartRenderer::new(engine),
            client,
            state,
        };
        session.view.refresh_layout();
        session.publish();
        session
    }

    #[cfg(test)]
    pub fn view(&self) -> &FormView {
        &self.view
    }

    #[cfg(test)]
    pub fn charts(&self) -> &ChartRenderer<E> {
        &self.charts
    }

    /// Apply one UI action. Errors returned here are faults, not user-facing failures.
    pub async fn handle(&mut self, action: UiAction) -> ClientResult<()> {
        match action {
            UiAction::SetField { field, value } => {
                self.view.set_value(field, value);
            }
            UiAction::SelectInstrument(instrument) => {
                self.view.select_instrument(instrument);
            }
            UiAction::SelectStrikeMode(strike_mode) => {
                self.view.select_strike_mode(strike_mode);
            }
            UiAction::Calculate => {
                let result = self.calculate().await;
                self.publish();
                return result;
            }
            UiAction::Shutdown => return Ok(()),
        }
        self.publish();
        Ok(())
    }

    async fn calculate(&mut self) -> ClientResult<()> {
        if !self.view.trigger_enabled {
            tracing::debug!("calculate ignored, submission in flight");
            return Ok(());
        }

        let request = build_request(&self.view)?;

        self.view.begin_submission();
        self.publish();
        self.state.counters.submissions.fetch_add(1, Ordering::Relaxed);
        tracing::info!(
            instrument = %self.view.selection.instrument,
            strike_mode = %self.view.selection.strike_mode,
            strike = request.get("strike").unwrap_or_default(),
            fields = request.len(),
            "submitting pricing request"
        );

        let outcome = self.client.calculate(&request).await;

        // ready again on every path
        self.view.end_submission();

        match outcome {
            Ok(PricingOutcome::Priced(result)) => {
                self.state.counters.priced.fetch_add(1, Ordering::Relaxed);
                self.render(&result)
            }
            Ok(PricingOutcome::Rejected { message }) => {
                self.state.counters.rejected.fetch_add(1, Ordering::Relaxed);
                tracing::info!(message = %message, "pricing rejected by service");
                self.alert(format!("Error: {message}"));
                Ok(())
            }
            Err(e) if e.is_transport() => {
                self.state.counters.transport_failures.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(error = %e, url = self.client.base_url(), "pricing request failed");
                self.alert(TRANSPORT_ALERT);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    fn render(&mut self, result: &PricingResult) -> ClientResult<()> {
        let shown = format_result(result);
        tracing::info!(
            price = %shown.price,
            vol = %shown.vol,
            strike = %shown.strike_used,
            model_vega = %shown.model_vega.to_text(),
            "priced"
        );
        self.view.show_result(shown);

        let Some(plot) = &result.plot_data else {
            return Ok(());
        };
        self.charts.render(plot)?;

        let timestamp = chrono::Utc::now().to_rfc3339();
        for slot in ChartSlot::ALL {
            match self.charts.handle(slot) {
                Some(handle) => {
                    self.state.counters.charts_rendered.fetch_add(1, Ordering::Relaxed);
                    self.state.broadcast(WsMessage::ChartRendered {
                        slot,
                        handle_id: handle.id(),
                        timestamp: timestamp.clone(),
                    });
                }
                None => self.state.broadcast(WsMessage::ChartCleared {
                    slot,
                    timestamp: timestamp.clone(),
                }),
            }
        }
        Ok(())
    }

    fn alert(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.view.alert(message.clone());
        self.state.broadcast(WsMessage::Alert {
            message,
            timestamp: chrono::Utc::now().to_rfc3339(),
        });
    }

    fn chart_view(&self, slot: ChartSlot) -> Option<ChartView> {
        let handle = self.charts.handle(slot)?;
        let spec = self.charts.spec(slot)?;
        let tooltips: Vec<Vec<String>> = spec
            .datasets
            .iter()
            .enumerate()
            .map(|(d, ds)| {
                (0..ds.points.len())
                    .filter_map(|i| self.charts.tooltip(slot, d, i))
                    .collect::<Vec<_>>()
            })
            .collect();

        Some(ChartView {
            slot,
            handle_id: handle.id(),
            rendered_at: chrono::Utc::now().to_rfc3339(),
            svg: self.charts.output(slot).unwrap_or_default().to_string(),
            tooltips,
        })
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        ViewSnapshot {
            form: self.view.clone(),
            vol_chart: self.chart_view(ChartSlot::Vol),
            payoff_chart: self.chart_view(ChartSlot::Payoff),
        }
    }

    /// Push the current view to the server (watch) and WS clients (broadcast).
    fn publish(&self) {
        let snapshot = self.snapshot();
        self.state.broadcast(WsMessage::ViewUpdate {
            form: Box::new(snapshot.form.clone()),
        });
        let _ = self.state.snapshot_tx.send(snapshot);
    }
}

/// Session loop. Commands are handled strictly in order.
pub async fn run_session<E: ChartEngine>(
    mut session: Session<E>,
    mut rx: mpsc::Receiver<SessionCommand>,
) {
    tracing::info!("session task started");

    while let Some(SessionCommand { action, reply }) = rx.recv().await {
        let shutdown = matches!(action, UiAction::Shutdown);

        if let Err(e) = session.handle(action).await {
            session.state.counters.faults.fetch_add(1, Ordering::Relaxed);
            tracing::error!(error = %e, "session fault");
        }

        if let Some(reply) = reply {
            let _ = reply.send(session.snapshot());
        }

        if shutdown {
            tracing::info!("shutdown command received");
            break;
        }
    }

    tracing::info!("session task shutting down");
}

/// Send an action to the session and wait until it has been handled.
pub async fn dispatch(state: &AppState, action: UiAction) -> ClientResult<ViewSnapshot> {
    let (reply_tx, reply_rx) = tokio::sync::oneshot::channel();
    state
        .session_tx
        .send(SessionCommand {
            action,
            reply: Some(reply_tx),
        })
        .await
        .map_err(|_| ClientError::ChannelClosed("session command channel".into()))?;

    reply_rx
        .await
        .map_err(|_| ClientError::ChannelClosed("session reply dropped".into()))
}
