use crate::pricing::types::PricingResult;
use serde::Serialize;

pub const PLACEHOLDER: &str = "--";

/// Display strings for the result panel. Pure output of `format_result`;
/// writing them into the view is `FormView::show_result`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultDisplay {
    pub price: String,
    pub vol: String,
    pub atm_strike: String,
    pub vega: String,
    pub model_vega: ModelVegaDisplay,
    pub strike_used: String,
}

impl Default for ResultDisplay {
    fn default() -> Self {
        Self {
            price: PLACEHOLDER.into(),
            vol: PLACEHOLDER.into(),
            atm_strike: PLACEHOLDER.into(),
            vega: PLACEHOLDER.into(),
            model_vega: ModelVegaDisplay::Placeholder,
            strike_used: PLACEHOLDER.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelVegaDisplay {
    Placeholder,
    /// Two-column grid, filled row by row.
    Grid { rows: Vec<Vec<String>> },
}

impl ModelVegaDisplay {
    pub const COLUMNS: usize = 2;

    pub fn to_text(&self) -> String {
        match self {
            Self::Placeholder => PLACEHOLDER.to_string(),
            Self::Grid { rows } => rows
                .iter()
                .map(|row| row.join("    "))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

pub fn format_result(result: &PricingResult) -> ResultDisplay {
    let model_vega = match &result.model_vega {
        Some(entries) => {
            let cells: Vec<String> = entries
                .iter()
                .map(|(label, value)| format!("{label}: {value:.4}"))
                .collect();
            ModelVegaDisplay::Grid {
                rows: cells
                    .chunks(ModelVegaDisplay::COLUMNS)
                    .map(|row| row.to_vec())
                    .collect(),
            }
        }
        None => ModelVegaDisplay::Placeholder,
    };

    let mut strike_used = format!("{:.6}", result.strike_used);
    if let Some(strike_2) = result.strike_2_used {
        strike_used.push_str(&format!(" / {strike_2:.6}"));
    }

    ResultDisplay {
        price: format!("{:.6}", result.price),
        vol: format!("{:.4}%", result.vol * 100.0),
        atm_strike: format!("{:.6}", result.atm_strike),
        vega: result
            .vega
            .map(|v| format!("{v:.4}"))
            .unwrap_or_else(|| PLACEHOLDER.to_string()),
        model_vega,
        strike_used,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn base_result() -> PricingResult {
        PricingResult {
            price: 1.23456789,
            vol: 0.1234,
            atm_strike: 100.123456,
            vega: None,
            model_vega: None,
            strike_used: 100.123456,
            strike_2_used: None,
            plot_data: None,
        }
    }

    #[test]
    fn test_scalar_formatting() {
        let display = format_result(&base_result());
        assert_eq!(display.price, "1.234568");
        assert_eq!(display.vol, "12.3400%");
        assert_eq!(display.atm_strike, "100.123456");
        assert_eq!(display.strike_used, "100.123456");
        assert_eq!(display.vega, "--");
        assert_eq!(display.model_vega, ModelVegaDisplay::Placeholder);
    }

    #[test]
    fn test_two_strikes() {
        let mut result = base_result();
        result.strike_used = 0.98;
        result.strike_2_used = Some(1.12);
        let display = format_result(&result);
        assert_eq!(display.strike_used, "0.980000 / 1.120000");
    }

    #[test]
    fn test_vega_and_model_vega_grid() {
        let mut result = base_result();
        result.vega = Some(0.003921);
        let mut mv = BTreeMap::new();
        mv.insert("atm".to_string(), 0.41);
        mv.insert("rr25".to_string(), -0.02);
        mv.insert("st25".to_string(), 0.1234567);
        result.model_vega = Some(mv);

        let display = format_result(&result);
        assert_eq!(display.vega, "0.0039");
        assert_eq!(
            display.model_vega,
            ModelVegaDisplay::Grid {
                rows: vec![
                    vec!["atm: 0.4100".to_string(), "rr25: -0.0200".to_string()],
                    vec!["st25: 0.1235".to_string()],
                ]
            }
        );
        assert_eq!(display.model_vega.to_text(), "atm: 0.4100    rr25: -0.0200\nst25: 0.1235");
    }

    #[test]
    fn test_defaults_are_placeholders() {
        let display = ResultDisplay::default();
        assert_eq!(display.price, PLACEHOLDER);
        assert_eq!(display.model_vega.to_text(), PLACEHOLDER);
    }
}
