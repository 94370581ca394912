use crate::errors::{ClientError, ClientResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ── Wire format ──

/// Body of `POST /calculate`, both on success and on domain failure.
/// Keys the client does not consume (`forward`, success `message`) are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct CalculateResponse {
    pub success: Option<bool>,
    pub message: Option<String>,
    pub price: Option<f64>,
    pub vol: Option<f64>,
    pub atm_strike: Option<f64>,
    pub vega: Option<f64>,
    pub model_vega: Option<BTreeMap<String, f64>>,
    pub strike_used: Option<f64>,
    pub strike_2_used: Option<f64>,
    pub plot_data: Option<PlotData>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotData {
    pub curve_x: Vec<f64>,
    pub curve_y: Vec<f64>,
    pub points_x: Vec<f64>,
    pub points_y: Vec<f64>,
    pub point_labels: Vec<String>,
    pub payoff_x: Vec<f64>,
    pub payoff_y: Option<Vec<f64>>,
}

impl PlotData {
    /// Check the pairwise length invariants before anything is drawn.
    pub fn validate(&self) -> ClientResult<()> {
        if self.curve_x.len() != self.curve_y.len() {
            return Err(ClientError::PlotShape(format!(
                "curve_x has {} values, curve_y has {}",
                self.curve_x.len(),
                self.curve_y.len()
            )));
        }
        if self.points_x.len() != self.points_y.len()
            || self.points_x.len() != self.point_labels.len()
        {
            return Err(ClientError::PlotShape(format!(
                "points_x/points_y/point_labels lengths {}/{}/{}",
                self.points_x.len(),
                self.points_y.len(),
                self.point_labels.len()
            )));
        }
        if let Some(payoff_y) = &self.payoff_y {
            if payoff_y.len() != self.payoff_x.len() {
                return Err(ClientError::PlotShape(format!(
                    "payoff_x has {} values, payoff_y has {}",
                    self.payoff_x.len(),
                    payoff_y.len()
                )));
            }
        }
        Ok(())
    }
}

// ── Domain view of a response ──

#[derive(Debug, Clone, PartialEq)]
pub struct PricingResult {
    pub price: f64,
    /// Decimal, not percent.
    pub vol: f64,
    pub atm_strike: f64,
    pub vega: Option<f64>,
    pub model_vega: Option<BTreeMap<String, f64>>,
    pub strike_used: f64,
    pub strike_2_used: Option<f64>,
    pub plot_data: Option<PlotData>,
}

/// A parsed response. Transport and parse failures are `ClientError`s instead.
#[derive(Debug, Clone, PartialEq)]
pub enum PricingOutcome {
    Priced(Box<PricingResult>),
    /// The service understood the request but could not price it.
    Rejected { message: String },
}

impl CalculateResponse {
    pub fn into_outcome(self) -> ClientResult<PricingOutcome> {
        if self.success != Some(true) {
            return Ok(PricingOutcome::Rejected {
                message: self.message.unwrap_or_else(|| "unknown error".to_string()),
            });
        }

        Ok(PricingOutcome::Priced(Box::new(PricingResult {
            price: required(self.price, "price")?,
            vol: required(self.vol, "vol")?,
            atm_strike: required(self.atm_strike, "atm_strike")?,
            vega: self.vega,
            model_vega: self.model_vega,
            strike_used: required(self.strike_used, "strike_used")?,
            strike_2_used: self.strike_2_used,
            plot_data: self.plot_data,
        })))
    }
}

#[inline]
fn required(value: Option<f64>, key: &str) -> ClientResult<f64> {
    value.ok_or_else(|| ClientError::Parse(format!("successful response without {key}")))
}
