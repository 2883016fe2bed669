use anyhow::Context;

pub const DEFAULT_BIND: &str = "127.0.0.1:8080";
pub const DEFAULT_API_KEY: &str = "dev-key";
pub const DEFAULT_CLIENT_SEED: &str = "default-client-seed";
pub const DEFAULT_HISTORY: usize = 1000;
pub const DEFAULT_HOUSE_EDGE: f64 = 0.01;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: String,
    pub api_key: String,
    /// First round counter of every server seed.
    pub start_nonce: u64,
    pub client_seed: String,
    /// Rounds kept in the in-memory log.
    pub history: usize,
    /// Fraction kept by the house on dice bets, in `[0, 1)`.
    pub house_edge: f64,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let start_nonce = match get("FAIRDRAW_START_NONCE") {
            Some(v) => v
                .parse()
                .with_context(|| format!("FAIRDRAW_START_NONCE is not a round counter: {v:?}"))?,
            None => 1,
        };
        let history = match get("FAIRDRAW_HISTORY") {
            Some(v) => v
                .parse()
                .with_context(|| format!("FAIRDRAW_HISTORY is not a count: {v:?}"))?,
            None => DEFAULT_HISTORY,
        };
        let house_edge = match get("FAIRDRAW_HOUSE_EDGE") {
            Some(v) => v
                .parse()
                .with_context(|| format!("FAIRDRAW_HOUSE_EDGE is not a number: {v:?}"))?,
            None => DEFAULT_HOUSE_EDGE,
        };
        if !(0.0..1.0).contains(&house_edge) {
            anyhow::bail!("FAIRDRAW_HOUSE_EDGE must be in [0, 1), got {house_edge}");
        }
        Ok(Self {
            bind: get("BIND").unwrap_or_else(|| DEFAULT_BIND.to_string()),
            api_key: get("API_KEY").unwrap_or_else(|| DEFAULT_API_KEY.into()),
            start_nonce,
            client_seed: get("FAIRDRAW_CLIENT_SEED").unwrap_or_else(|| DEFAULT_CLIENT_SEED.into()),
            history,
            house_edge,
        })
    }
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
    fn defaults() {
        let cfg = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg.bind, DEFAULT_BIND);
        assert_eq!(cfg.api_key, DEFAULT_API_KEY);
        assert_eq!(cfg.start_nonce, 1);
        assert_eq!(cfg.client_seed, DEFAULT_CLIENT_SEED);
        assert_eq!(cfg.history, DEFAULT_HISTORY);
        assert_eq!(cfg.house_edge, DEFAULT_HOUSE_EDGE);
    }

    #[test]
    fn overrides_and_bad_numbers() {
        let cfg = ServerConfig::from_lookup(lookup(&[
            ("BIND", "0.0.0.0:9000"),
            ("FAIRDRAW_START_NONCE", "0"),
            ("FAIRDRAW_HISTORY", "10"),
            ("FAIRDRAW_HOUSE_EDGE", "0.03"),
        ]))
        .unwrap();
        assert_eq!(cfg.bind, "0.0.0.0:9000");
        assert_eq!(cfg.start_nonce, 0);
        assert_eq!(cfg.history, 10);
        assert_eq!(cfg.house_edge, 0.03);

        assert!(ServerConfig::from_lookup(lookup(&[("FAIRDRAW_START_NONCE", "-1")])).is_err());
        assert!(ServerConfig::from_lookup(lookup(&[("FAIRDRAW_HISTORY", "lots")])).is_err());
        for edge in ["1", "-0.1", "NaN", "x"] {
            assert!(ServerConfig::from_lookup(lookup(&[("FAIRDRAW_HOUSE_EDGE", edge)])).is_err());
        }
    }
}
