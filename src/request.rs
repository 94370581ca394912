use crate::errors::ClientResult;
use crate::form::view::FormView;
use crate::form::Field;
use serde::Serialize;
use std::collections::BTreeMap;

pub const STRIKE_TYPE_KEY: &str = "strike_type";
pub const TYPE_KEY: &str = "type";

/// Flat field -> text mapping sent to the pricing service.
/// Values go out exactly as typed; the service parses and validates them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricingRequest(BTreeMap<&'static str, String>);

impl PricingRequest {
    #[inline]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[cfg(test)]
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.keys().copied()
    }
}

/// Snapshot every declared input plus both selectors.
/// The second strike is read even when hidden.
pub fn build_request(view: &FormView) -> ClientResult<PricingRequest> {
    let mut fields = BTreeMap::new();
    for field in Field::ALL {
        fields.insert(field.key(), view.value(field)?.to_string());
    }
    fields.insert(STRIKE_TYPE_KEY, view.selection.strike_mode.as_str().to_string());
    fields.insert(TYPE_KEY, view.selection.instrument.as_str().to_string());
    Ok(PricingRequest(fields))
}
