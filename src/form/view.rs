use super::{update_visibility, Field, FormSelection, InstrumentType, StrikeMode};
use crate::display::ResultDisplay;
use crate::errors::{ClientError, ClientResult};
use serde::Serialize;
use std::collections::BTreeMap;

const MAX_ALERTS: usize = 32;

/// In-memory page: input values, derived layout, in-flight affordances,
/// result panel and the alert log. Owned by the session task only.
#[derive(Debug, Clone, Serialize)]
pub struct FormView {
    values: BTreeMap<Field, String>,
    pub selection: FormSelection,
    pub strike_label: &'static str,
    pub strike_step: f64,
    pub strike2_visible: bool,
    pub trigger_enabled: bool,
    pub loading_visible: bool,
    pub results_visible: bool,
    pub result: ResultDisplay,
    pub alerts: Vec<String>,
}

impl FormView {
    /// Form with every input present and prefilled.
    pub fn with_defaults() -> Self {
        let values = Field::ALL
            .iter()
            .map(|f| (*f, f.default_value().to_string()))
            .collect();
        Self::from_values(values)
    }

    /// Form with only the given inputs. Used when the markup omits fields.
    pub fn from_values(values: BTreeMap<Field, String>) -> Self {
        let mut view = Self {
            values,
            selection: FormSelection::default(),
            strike_label: "",
            strike_step: 0.0,
            strike2_visible: false,
            trigger_enabled: true,
            loading_visible: false,
            results_visible: false,
            result: ResultDisplay::default(),
            alerts: Vec::new(),
        };
        view.refresh_layout();
        view
    }

    pub fn value(&self, field: Field) -> ClientResult<&str> {
        self.values
            .get(&field)
            .map(String::as_str)
            .ok_or(ClientError::MissingField(field.key()))
    }

    pub fn set_value(&mut self, field: Field, value: impl Into<String>) {
        self.values.insert(field, value.into());
    }

    pub fn select_instrument(&mut self, instrument: InstrumentType) {
        self.selection.instrument = instrument;
        self.refresh_layout();
    }

    pub fn select_strike_mode(&mut self, strike_mode: StrikeMode) {
        self.selection.strike_mode = strike_mode;
        self.refresh_layout();
    }

    /// Re-derive the strike inputs from the current selection.
    pub fn refresh_layout(&mut self) {
        let current = self
            .values
            .get(&Field::Strike)
            .map(String::as_str)
            .unwrap_or("");
        let layout = update_visibility(self.selection, current);

        self.strike_label = layout.strike_label;
        self.strike_step = layout.strike_step;
        self.strike2_visible = layout.strike2_visible;
        if let Some(corrected) = layout.corrected_strike {
            tracing::debug!(from = current, to = %corrected, "strike reset for delta mode");
            self.values.insert(Field::Strike, corrected);
        }
    }

    // ── Submission affordances ──

    pub fn begin_submission(&mut self) {
        self.trigger_enabled = false;
        self.loading_visible = true;
        self.results_visible = false;
    }

    pub fn end_submission(&mut self) {
        self.trigger_enabled = true;
        self.loading_visible = false;
    }

    pub fn show_result(&mut self, display: ResultDisplay) {
        self.result = display;
        self.results_visible = true;
    }

    pub fn alert(&mut self, message: impl Into<String>) {
        if self.alerts.len() >= MAX_ALERTS {
            self.alerts.remove(0);
        }
        self.alerts.push(message.into());
    }

    #[cfg(test)]
    pub fn last_alert(&self) -> Option<&str> {
        self.alerts.last().map(String::as_str)
    }
}

impl Default for FormView {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_layout_applied() {
        let view = FormView::with_defaults();
        assert_eq!(view.strike_label, "Strike Price");
        assert!(!view.strike2_visible);
        assert!(view.trigger_enabled);
        assert!(!view.results_visible);
    }

    #[test]
    fn test_switch_to_delta_resets_price_strike() {
        let mut view = FormView::with_defaults();
        view.set_value(Field::Strike, "2.5");
        view.select_strike_mode(StrikeMode::Delta);
        assert_eq!(view.value(Field::Strike).unwrap(), "0.25");
        assert_eq!(view.strike_step, 0.01);

        // switching back keeps the delta text
        view.select_strike_mode(StrikeMode::Price);
        assert_eq!(view.value(Field::Strike).unwrap(), "0.25");
    }

    #[test]
    fn test_multi_leg_shows_second_strike() {
        let mut view = FormView::with_defaults();
        view.select_instrument(InstrumentType::RiskReversal);
        assert!(view.strike2_visible);
        assert_eq!(view.strike_label, "Put Strike (Low)");

        view.select_strike_mode(StrikeMode::Delta);
        assert!(!view.strike2_visible);
        assert_eq!(view.strike_label, "Delta (e.g. 0.25)");
    }

    #[test]
    fn test_missing_field() {
        let view = FormView::from_values(BTreeMap::new());
        assert!(matches!(view.value(Field::Atm), Err(ClientError::MissingField("atm"))));
    }

    #[test]
    fn test_submission_affordances() {
        let mut view = FormView::with_defaults();
        view.show_result(ResultDisplay::default());
        view.begin_submission();
        assert!(!view.trigger_enabled);
        assert!(view.loading_visible);
        assert!(!view.results_visible);

        view.end_submission();
        assert!(view.trigger_enabled);
        assert!(!view.loading_visible);
    }

    #[test]
    fn test_alert_log_bounded() {
        let mut view = FormView::with_defaults();
        for i in 0..(MAX_ALERTS + 5) {
            view.alert(format!("alert {i}"));
        }
        assert_eq!(view.alerts.len(), MAX_ALERTS);
        assert_eq!(view.last_alert(), Some("alert 36"));
    }
}
