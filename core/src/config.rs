//! Driver configuration.
//!
//! Loaded from a JSON file in production; tests use
//! `DriverConfig::default_test()`. The generator list name falls back to
//! `$EVG_GENERATOR_LIST`, then to "Default".

use crate::generator_list::{self, DEFAULT_LIST};
use serde::{Deserialize, Serialize};

/// Knots per interaction spline built by `create_splines`.
pub const SPLINE_KNOTS: usize = 40;

/// Floor applied to generator Emin when building splines and ranges (GeV).
pub const MIN_SPLINE_ENERGY: f64 = 0.01;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DriverConfig {
    /// Event generator list; `None` defers to the environment.
    #[serde(default)]
    pub generator_list: Option<String>,
    /// Drop unphysical events and regenerate.
    #[serde(default = "default_true")]
    pub filter_unphysical: bool,
    #[serde(default = "default_spline_knots")]
    pub spline_knots: usize,
    #[serde(default)]
    pub seed: u64,
}

fn default_true() -> bool {
    true
}

fn default_spline_knots() -> usize {
    SPLINE_KNOTS
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            generator_list: None,
            filter_unphysical: true,
            spline_knots: SPLINE_KNOTS,
            seed: 0,
        }
    }
}

impl DriverConfig {
    /// Load from a JSON file.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        if config.spline_knots <= 2 {
            anyhow::bail!("{path}: spline_knots must be > 2, got {}", config.spline_knots);
        }
        Ok(config)
    }

    /// Defaults, with the generator list taken from the environment.
    pub fn from_env() -> Self {
        Self {
            generator_list: generator_list::list_name_from_env(),
            ..Self::default()
        }
    }

    /// Config with hardcoded defaults for use in tests: never reads
    /// the environment.
    pub fn default_test() -> Self {
        Self {
            generator_list: Some(DEFAULT_LIST.into()),
            filter_unphysical: true,
            spline_knots: SPLINE_KNOTS,
            seed: 0xC0FF_EE00_1234,
        }
    }

    pub fn with_generator_list(mut self, name: impl Into<String>) -> Self {
        self.generator_list = Some(name.into());
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// The list name to resolve: config, then environment, then "Default".
    pub fn resolved_list_name(&self) -> String {
        self.generator_list
            .clone()
            .or_else(generator_list::list_name_from_env)
            .unwrap_or_else(|| DEFAULT_LIST.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let cfg: DriverConfig = serde_json::from_str(r#"{ "seed": 9 }"#).unwrap();
        assert_eq!(cfg.seed, 9);
        assert!(cfg.filter_unphysical);
        assert_eq!(cfg.spline_knots, SPLINE_KNOTS);
        assert_eq!(cfg.generator_list, None);
    }

    #[test]
    fn explicit_list_wins() {
        let cfg = DriverConfig::default_test().with_generator_list("QEL");
        assert_eq!(cfg.resolved_list_name(), "QEL");
    }
}
