use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub influx: InfluxSettings,
    #[serde(default)]
    pub server: ServerSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InfluxSettings {
    #[serde(default = "default_url")]
    pub url: String,
    /// Never defaulted to a real credential
    #[serde(default)]
    pub token: String,
    #[serde(default = "default_org")]
    pub org: String,
    #[serde(default = "default_bucket")]
    pub bucket: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

fn default_url() -> String {
    "http://localhost:8086".to_string()
}

fn default_org() -> String {
    "portect".to_string()
}

fn default_bucket() -> String {
    "vessel_data".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

impl Default for InfluxSettings {
    fn default() -> Self {
        Self {
            url: default_url(),
            token: String::new(),
            org: default_org(),
            bucket: default_bucket(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

impl AppConfig {
    /// Load `config/vessel_telemetry` (optional) overlaid with `VESSEL__*` environment variables
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_builder(
            Config::builder()
                .add_source(File::with_name("config/vessel_telemetry").required(false))
                .add_source(
                    Environment::with_prefix("VESSEL")
                        .prefix_separator("__")
                        .separator("__")
                        .try_parsing(true),
                ),
        )
    }

    fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, ConfigError> {
        builder.build()?.try_deserialize()
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.influx.validate()?;
        if self.server.bind_addr.trim().is_empty() {
            anyhow::bail!("server.bind_addr cannot be empty");
        }
        Ok(())
    }
}

impl InfluxSettings {
    pub fn validate(&self) -> anyhow::Result<()> {
        for (name, value) in [("url", &self.url), ("org", &self.org), ("bucket", &self.bucket)] {
            if value.trim().is_empty() {
                anyhow::bail!("influx.{} cannot be empty", name);
            }
        }
        if self.timeout_secs == 0 {
            anyhow::bail!("influx.timeout_secs must be greater than zero");
        }
        if self.token.is_empty() {
            tracing::warn!("influx.token is empty; requests will be sent unauthenticated");
        }
        Ok(())
    }
}
