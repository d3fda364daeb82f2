use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub gateway: GatewayConfig,
    pub engine: EngineConfig,
    pub reconciler: ReconcilerConfig,
    /// Optional YAML file of accounts and rates loaded at startup
    pub seed_file: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_dir: "logs".to_string(),
            log_file: "fundrail.log".to_string(),
            use_json: false,
            rotation: "daily".to_string(),
            gateway: GatewayConfig::default(),
            engine: EngineConfig::default(),
            reconciler: ReconcilerConfig::default(),
            seed_file: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct EngineConfig {
    /// How long a transfer waits for an account lock before giving up
    pub lock_wait_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { lock_wait_ms: 5000 }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ReconcilerConfig {
    pub enabled: bool,
    pub sweep_interval_secs: u64,
    pub stale_after_secs: u64,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sweep_interval_secs: 30,
            stale_after_secs: 60,
        }
    }
}

impl AppConfig {
    /// Load `config/{env}.yaml`. A missing file falls back to defaults so the
    /// binary runs out of the box; a malformed file is a hard error.
    pub fn load(env: &str) -> Self {
        let config_path = format!("config/{}.yaml", env);
        match fs::read_to_string(&config_path) {
            Ok(content) => serde_yaml::from_str(&content)
                .unwrap_or_else(|e| panic!("Failed to parse {}: {}", config_path, e)),
            Err(_) => {
                eprintln!("⚠️  Config file {} not found, using defaults", config_path);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.gateway.port, 8080);
        assert_eq!(config.engine.lock_wait_ms, 5000);
        assert!(config.reconciler.enabled);
        assert_eq!(config.seed_file, None);
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let config: AppConfig = serde_yaml::from_str(
            "log_level: debug\ngateway:\n  port: 9090\nreconciler:\n  enabled: false\n",
        )
        .unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.gateway.port, 9090);
        // Unset fields keep their defaults.
        assert_eq!(config.gateway.host, "0.0.0.0");
        assert!(!config.reconciler.enabled);
        assert_eq!(config.reconciler.sweep_interval_secs, 30);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let config = AppConfig::load("no_such_env");
        assert_eq!(config.gateway.port, 8080);
    }
}
