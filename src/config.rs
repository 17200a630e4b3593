use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main configuration structure for the portal engine
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PortalConfig {
    /// Document store namespacing
    pub store: StoreConfig,
    /// Payment workflow timings
    pub payment: PaymentConfig,
    /// Notification channel settings
    pub notifications: NotificationConfig,
    /// Observability settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    /// Application identifier used to namespace collection paths
    pub app_id: String,
    /// Collection segment holding activation/installation records
    pub activation_collection: String,
}

impl StoreConfig {
    /// Full collection path for activation records:
    /// `artifacts/{app_id}/public/data/{segment}`
    pub fn activation_path(&self) -> String {
        format!(
            "artifacts/{}/public/data/{}",
            self.app_id, self.activation_collection
        )
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PaymentConfig {
    /// Total simulated processing time before a payment settles
    pub processing_duration_ms: u64,
    /// Interval between progress messages while processing
    pub progress_interval_ms: u64,
}

impl PaymentConfig {
    pub fn processing_duration(&self) -> Duration {
        Duration::from_millis(self.processing_duration_ms)
    }

    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotificationConfig {
    /// How long a notification stays visible before auto-expiring
    pub display_duration_ms: u64,
}

impl NotificationConfig {
    pub fn display_duration(&self) -> Duration {
        Duration::from_millis(self.display_duration_ms)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Enable tracing output
    pub tracing_enabled: bool,
    /// Log level
    pub log_level: String,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig {
                app_id: "default-app-id".to_string(),
                activation_collection: "new_broadband_users".to_string(),
            },
            payment: PaymentConfig {
                processing_duration_ms: 3500,
                progress_interval_ms: 1000,
            },
            notifications: NotificationConfig {
                display_duration_ms: 4000,
            },
            observability: ObservabilityConfig {
                tracing_enabled: true,
                log_level: "info".to_string(),
            },
        }
    }
}

impl PortalConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration file (fouryou-portal.toml)
    /// 3. Environment variables (prefixed with FOURYOU_)
    pub fn load() -> Result<Self> {
        let defaults = Config::try_from(&PortalConfig::default())?;
        let mut builder = Config::builder().add_source(defaults);

        if Path::new("fouryou-portal.toml").exists() {
            builder = builder.add_source(File::with_name("fouryou-portal"));
        }

        builder = builder.add_source(
            Environment::with_prefix("FOURYOU")
                .separator("_")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}

/// Global configuration instance
static CONFIG: std::sync::LazyLock<Result<PortalConfig, anyhow::Error>> =
    std::sync::LazyLock::new(|| {
        let _ = PortalConfig::load_env_file();
        PortalConfig::load()
    });

/// Get the global configuration
pub fn config() -> Result<&'static PortalConfig> {
    CONFIG
        .as_ref()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))
}

/// Initialize configuration (called at startup)
pub fn init_config() -> Result<()> {
    let _config = config()?;
    tracing::info!("Configuration loaded successfully");
    Ok(())
}
