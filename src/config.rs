use crate::errors::{ClientError, ClientResult};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub pricing_service_url: String,
    pub request_timeout_secs: u64,
    pub server_port: u16,
    pub chart_width: u32,
    pub chart_height: u32,
}

impl AppConfig {
    pub fn from_env() -> ClientResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> ClientResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let request_timeout_secs =
            parse_var::<u64>("REQUEST_TIMEOUT_SECS", &var_or("REQUEST_TIMEOUT_SECS", "10"))?;
        let server_port = parse_var::<u16>("SERVER_PORT", &var_or("SERVER_PORT", "3002"))?;
        let chart_width = parse_var::<u32>("CHART_WIDTH", &var_or("CHART_WIDTH", "960"))?;
        let chart_height = parse_var::<u32>("CHART_HEIGHT", &var_or("CHART_HEIGHT", "480"))?;

        if request_timeout_secs == 0 {
            return Err(ClientError::Config("REQUEST_TIMEOUT_SECS must be > 0".into()));
        }

        Ok(Self {
            pricing_service_url: var_or("PRICING_SERVICE_URL", "http://127.0.0.1:5001"),
            request_timeout_secs,
            server_port,
            chart_width,
            chart_height,
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            pricing_service_url: "http://127.0.0.1:5001".into(),
            request_timeout_secs: 10,
            server_port: 3002,
            chart_width: 960,
            chart_height: 480,
        }
    }
}

fn parse_var<T>(key: &str, raw: &str) -> ClientResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ClientError::Config(format!("{key}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let cfg = AppConfig::from_lookup(lookup(&[])).unwrap();
        let def = AppConfig::default();
        assert_eq!(cfg.pricing_service_url, def.pricing_service_url);
        assert_eq!(cfg.request_timeout_secs, 10);
        assert_eq!(cfg.server_port, 3002);
        assert_eq!((cfg.chart_width, cfg.chart_height), (960, 480));
    }

    #[test]
    fn test_overrides() {
        let cfg = AppConfig::from_lookup(lookup(&[
            ("PRICING_SERVICE_URL", "http://pricer:8080"),
            ("REQUEST_TIMEOUT_SECS", "3"),
            ("SERVER_PORT", " 4000 "),
        ]))
        .unwrap();
        assert_eq!(cfg.pricing_service_url, "http://pricer:8080");
        assert_eq!(cfg.request_timeout_secs, 3);
        assert_eq!(cfg.server_port, 4000);
    }

    #[test]
    fn test_rejects_bad_values() {
        let err = AppConfig::from_lookup(lookup(&[("SERVER_PORT", "abc")])).unwrap_err();
        assert!(matches!(err, ClientError::Config(ref m) if m.starts_with("SERVER_PORT")));

        let err = AppConfig::from_lookup(lookup(&[("REQUEST_TIMEOUT_SECS", "0")])).unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }
}
