pub mod view;

use serde::{Deserialize, Serialize};

// ── Selectors ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstrumentType {
    Call,
    Put,
    Strangle,
    RiskReversal,
}

impl InstrumentType {
    pub const ALL: [InstrumentType; 4] = [
        InstrumentType::Call,
        InstrumentType::Put,
        InstrumentType::Strangle,
        InstrumentType::RiskReversal,
    ];

    /// Strangles and risk reversals carry a put leg and a call leg.
    #[inline]
    pub fn is_multi_leg(&self) -> bool {
        matches!(self, InstrumentType::Strangle | InstrumentType::RiskReversal)
    }

    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Call => "call",
            Self::Put => "put",
            Self::Strangle => "strangle",
            Self::RiskReversal => "risk_reversal",
        }
    }
}

impl std::fmt::Display for InstrumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrikeMode {
    /// Strike entered as an absolute price level.
    Price,
    /// Strike entered as a delta in (0, 1].
    Delta,
}

impl StrikeMode {
    pub const ALL: [StrikeMode; 2] = [StrikeMode::Price, StrikeMode::Delta];

    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Price => "price",
            Self::Delta => "delta",
        }
    }
}

impl std::fmt::Display for StrikeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSelection {
    pub instrument: InstrumentType,
    pub strike_mode: StrikeMode,
}

impl Default for FormSelection {
    fn default() -> Self {
        Self {
            instrument: InstrumentType::Call,
            strike_mode: StrikeMode::Price,
        }
    }
}

// ── Text inputs ──

/// Every free-text input on the form. The two selectors live in `FormSelection`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Field {
    #[serde(rename = "spot_ref")]
    SpotRef,
    #[serde(rename = "rd")]
    Rd,
    #[serde(rename = "forward")]
    Forward,
    #[serde(rename = "T")]
    Maturity,
    #[serde(rename = "atm")]
    Atm,
    #[serde(rename = "rr25")]
    Rr25,
    #[serde(rename = "st25")]
    St25,
    #[serde(rename = "rr10")]
    Rr10,
    #[serde(rename = "st10")]
    St10,
    #[serde(rename = "strike")]
    Strike,
    #[serde(rename = "strike_2")]
    Strike2,
}

impl Field {
    pub const ALL: [Field; 11] = [
        Field::SpotRef,
        Field::Rd,
        Field::Forward,
        Field::Maturity,
        Field::Atm,
        Field::Rr25,
        Field::St25,
        Field::Rr10,
        Field::St10,
        Field::Strike,
        Field::Strike2,
    ];

    /// Wire key used by the pricing service.
    #[inline]
    pub fn key(&self) -> &'static str {
        match self {
            Self::SpotRef => "spot_ref",
            Self::Rd => "rd",
            Self::Forward => "forward",
            Self::Maturity => "T",
            Self::Atm => "atm",
            Self::Rr25 => "rr25",
            Self::St25 => "st25",
            Self::Rr10 => "rr10",
            Self::St10 => "st10",
            Self::Strike => "strike",
            Self::Strike2 => "strike_2",
        }
    }

    /// Initial text shown in the input.
    pub fn default_value(&self) -> &'static str {
        match self {
            Self::SpotRef => "1.0",
            Self::Rd => "0.05",
            Self::Forward => "1.051",
            Self::Maturity => "1.0",
            Self::Atm => "0.10",
            Self::Rr25 => "0.01",
            Self::St25 => "0.002",
            Self::Rr10 => "0.015",
            Self::St10 => "0.005",
            Self::Strike => "1.0",
            Self::Strike2 => "1.05",
        }
    }
}

// ── Layout derivation ──

pub const DELTA_STEP: f64 = 0.01;
pub const PRICE_STEP: f64 = 0.0001;
pub const DEFAULT_DELTA: &str = "0.25";

/// What the strike inputs should look like for a given selection.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldLayout {
    pub strike_label: &'static str,
    pub strike_step: f64,
    pub strike2_visible: bool,
    /// Replacement for the strike text, when the current one is invalid for the mode.
    pub corrected_strike: Option<String>,
}

/// Numeric value of the longest decimal prefix of `text`, after leading
/// whitespace. `"2.5abc"` reads as 2.5; `"abc"` and `"inf"` read as nothing.
/// The spelled-out `Infinity` literal is accepted.
fn leading_number(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    if text[end..].starts_with("Infinity") {
        let sign = if text.starts_with('-') { -1.0 } else { 1.0 };
        return Some(sign * f64::INFINITY);
    }

    let int_end = digits_from(end);
    let mut mantissa_digits = int_end - end;
    end = int_end;
    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        mantissa_digits += frac_end - end - 1;
        end = frac_end;
    }
    if mantissa_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }

    text[..end].parse::<f64>().ok()
}

/// Derive the strike inputs from the selector pair.
/// Pure and idempotent: safe to call on every selector change.
pub fn update_visibility(selection: FormSelection, current_strike: &str) -> FieldLayout {
    let multi_leg = selection.instrument.is_multi_leg();

    match selection.strike_mode {
        StrikeMode::Delta => {
            // A delta above 1 is left over from price mode
            let corrected_strike = leading_number(current_strike)
                .filter(|v| *v > 1.0)
                .map(|_| DEFAULT_DELTA.to_string());

            FieldLayout {
                strike_label: if multi_leg {
                    "Delta (e.g. 0.25)"
                } else {
                    "Strike Delta (e.g. 0.25)"
                },
                strike_step: DELTA_STEP,
                // symmetric legs share one delta
                strike2_visible: false,
                corrected_strike,
            }
        }
        StrikeMode::Price => FieldLayout {
            strike_label: if multi_leg { "Put Strike (Low)" } else { "Strike Price" },
            strike_step: PRICE_STEP,
            strike2_visible: multi_leg,
            corrected_strike: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sel(instrument: InstrumentType, strike_mode: StrikeMode) -> FormSelection {
        FormSelection { instrument, strike_mode }
    }

    #[test]
    fn test_layout_table_is_exhaustive() {
        for instrument in InstrumentType::ALL {
            for mode in StrikeMode::ALL {
                let layout = update_visibility(sel(instrument, mode), "0.5");
                let multi = instrument.is_multi_leg();
                match mode {
                    StrikeMode::Delta => {
                        assert_eq!(layout.strike_step, DELTA_STEP);
                        assert!(!layout.strike2_visible, "{instrument}/{mode}");
                        let expected = if multi { "Delta (e.g. 0.25)" } else { "Strike Delta (e.g. 0.25)" };
                        assert_eq!(layout.strike_label, expected);
                    }
                    StrikeMode::Price => {
                        assert_eq!(layout.strike_step, PRICE_STEP);
                        assert_eq!(layout.strike2_visible, multi, "{instrument}/{mode}");
                        let expected = if multi { "Put Strike (Low)" } else { "Strike Price" };
                        assert_eq!(layout.strike_label, expected);
                    }
                }
                assert_eq!(layout.corrected_strike, None);
            }
        }
    }

    #[test]
    fn test_idempotent() {
        for instrument in InstrumentType::ALL {
            for mode in StrikeMode::ALL {
                let a = update_visibility(sel(instrument, mode), "2.5");
                let b = update_visibility(sel(instrument, mode), "2.5");
                assert_eq!(a, b);
            }
        }
    }

    #[test]
    fn test_delta_clamp() {
        let layout = update_visibility(sel(InstrumentType::Call, StrikeMode::Delta), "2.5");
        assert_eq!(layout.corrected_strike.as_deref(), Some("0.25"));

        let layout = update_visibility(sel(InstrumentType::Call, StrikeMode::Delta), "0.5");
        assert_eq!(layout.corrected_strike, None);

        // exactly 1 is a valid delta
        let layout = update_visibility(sel(InstrumentType::Strangle, StrikeMode::Delta), "1");
        assert_eq!(layout.corrected_strike, None);
    }

    #[test]
    fn test_price_mode_never_corrects() {
        let layout = update_visibility(sel(InstrumentType::Put, StrikeMode::Price), "250.0");
        assert_eq!(layout.corrected_strike, None);
    }

    #[test]
    fn test_non_numeric_strike_left_alone() {
        let layout = update_visibility(sel(InstrumentType::Call, StrikeMode::Delta), "abc");
        assert_eq!(layout.corrected_strike, None);
    }

    #[test]
    fn test_clamp_reads_leading_number() {
        let delta = sel(InstrumentType::Call, StrikeMode::Delta);
        assert_eq!(update_visibility(delta, "2.5abc").corrected_strike.as_deref(), Some("0.25"));
        assert_eq!(update_visibility(delta, "  1.5e1x").corrected_strike.as_deref(), Some("0.25"));
        assert_eq!(update_visibility(delta, "Infinity").corrected_strike.as_deref(), Some("0.25"));
        assert_eq!(update_visibility(delta, "inf").corrected_strike, None);
        assert_eq!(update_visibility(delta, "1e").corrected_strike, None);
        assert_eq!(update_visibility(delta, ".5").corrected_strike, None);
        assert_eq!(update_visibility(delta, "-").corrected_strike, None);
    }

    #[test]
    fn test_leading_number() {
        assert_eq!(leading_number("2.5abc"), Some(2.5));
        assert_eq!(leading_number("-3."), Some(-3.0));
        assert_eq!(leading_number("+.25 "), Some(0.25));
        assert_eq!(leading_number("4e-1z"), Some(0.4));
        assert_eq!(leading_number("-Infinity"), Some(f64::NEG_INFINITY));
        assert_eq!(leading_number("."), None);
        assert_eq!(leading_number(""), None);
        assert_eq!(leading_number("NaN"), None);
    }

    #[test]
    fn test_strangle_absolute() {
        let layout = update_visibility(sel(InstrumentType::Strangle, StrikeMode::Price), "1.0");
        assert!(layout.strike2_visible);
        assert_eq!(layout.strike_label, "Put Strike (Low)");
    }

    #[test]
    fn test_field_keys_match_serde() {
        for field in Field::ALL {
            let json = serde_json::to_string(&field).unwrap();
            assert_eq!(json, format!("\"{}\"", field.key()));
        }
    }
}
