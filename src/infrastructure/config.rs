use config::builder::DefaultState;
use config::{ConfigBuilder, Environment, File};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

use crate::domain::reading::RangeSelection;

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    pub store: StoreSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreSettings {
    pub url: String,
    pub api_key: String,
    #[serde(default = "default_table")]
    pub table: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct MonitorConfig {
    #[serde(default)]
    pub monitor: MonitorSettings,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MonitorSettings {
    pub listen_addr: String,
    pub refresh_interval_secs: u64,
    pub default_range_hours: i64,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            refresh_interval_secs: 60,
            default_range_hours: 6,
        }
    }
}

impl MonitorSettings {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    /// The window shown until an operator picks one. It trails the clock.
    pub fn default_range(&self) -> RangeSelection {
        RangeSelection::Trailing(chrono::Duration::hours(self.default_range_hours))
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.refresh_interval_secs > 0,
            "monitor.refresh_interval_secs must be positive"
        );
        anyhow::ensure!(
            self.default_range_hours >= 0,
            "monitor.default_range_hours must not be negative"
        );
        anyhow::ensure!(
            chrono::Duration::try_hours(self.default_range_hours).is_some(),
            "monitor.default_range_hours is too large"
        );
        Ok(())
    }
}

fn default_table() -> String {
    "loop_fullness_logs".to_string()
}

/// Environment overrides, e.g. `LOOPS_STORE__API_KEY`.
fn environment() -> Environment {
    Environment::with_prefix("LOOPS")
        .prefix_separator("_")
        .separator("__")
}

fn build<T: DeserializeOwned>(builder: ConfigBuilder<DefaultState>) -> anyhow::Result<T> {
    let settings = builder.add_source(environment()).build()?;
    Ok(settings.try_deserialize()?)
}

pub fn load_store_config() -> anyhow::Result<StoreConfig> {
    build(config::Config::builder().add_source(File::with_name("config/store")))
}

pub fn load_monitor_config() -> anyhow::Result<MonitorConfig> {
    let config: MonitorConfig = build(
        config::Config::builder().add_source(File::with_name("config/monitor").required(false)),
    )?;
    config.monitor.validate()?;
    Ok(config)
}
