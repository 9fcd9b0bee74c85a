//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::Path;

use crate::config::schema::{Environment, GatewayConfig, LogFormat};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {value:?}")]
    InvalidEnv { key: &'static str, value: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: GatewayConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Build the runtime configuration: optional file, then `.env` and process
/// environment overrides, then validation.
pub fn load_runtime_config(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => GatewayConfig::default(),
    };

    // Missing .env is the normal case outside local development.
    let _ = dotenvy::dotenv();
    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Overlay environment variables onto `config`.
///
/// `lookup` abstracts the environment so tests never touch process state.
pub fn apply_env_overrides<F>(config: &mut GatewayConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(url) = get("SUPABASE_URL") {
        config.upstream.url = url.trim().to_string();
    }
    if let Some(key) = get("SUPABASE_ANON_KEY") {
        config.upstream.anon_key = key.trim().to_string();
    }
    if let Some(value) = get("UPSTREAM_TIMEOUT_SECS") {
        let secs = value.trim().parse::<u64>().map_err(|_| ConfigError::InvalidEnv {
            key: "UPSTREAM_TIMEOUT_SECS",
            value: value.clone(),
        })?;
        config.upstream.timeout_secs = (secs > 0).then_some(secs);
    }

    let host = get("HOST");
    let port = get("PORT");
    if host.is_some() || port.is_some() {
        let (default_host, default_port) = config
            .listener
            .bind_address
            .rsplit_once(':')
            .map(|(h, p)| (h.to_string(), p.to_string()))
            .unwrap_or_else(|| ("0.0.0.0".to_string(), "3000".to_string()));
        let port = match port {
            Some(p) => {
                p.trim().parse::<u16>().map_err(|_| ConfigError::InvalidEnv {
                    key: "PORT",
                    value: p.clone(),
                })?;
                p.trim().to_string()
            }
            None => default_port,
        };
        let host = host.map(|h| h.trim().to_string()).unwrap_or(default_host);
        config.listener.bind_address = format!("{}:{}", host, port);
    }

    if let Some(origins) = get("FRONTEND_URL") {
        config.cors.frontend_origins = origins
            .split(',')
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();
    }

    if let Some(env) = get("APP_ENV") {
        config.environment = Environment::parse(&env).ok_or(ConfigError::InvalidEnv {
            key: "APP_ENV",
            value: env.clone(),
        })?;
    }

    if let Some(format) = get("LOG_FORMAT") {
        config.observability.log_format = Some(match format.trim().to_ascii_lowercase().as_str() {
            "json" => LogFormat::Json,
            "pretty" | "text" => LogFormat::Pretty,
            _ => {
                return Err(ConfigError::InvalidEnv {
                    key: "LOG_FORMAT",
                    value: format,
                })
            }
        });
    }
    if let Some(level) = get("LOG_LEVEL") {
        config.observability.log_level = level.trim().to_string();
    }
    if let Some(enabled) = get("METRICS_ENABLED") {
        config.observability.metrics_enabled = matches!(
            enabled.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        );
    }
    if let Some(addr) = get("METRICS_ADDRESS") {
        config.observability.metrics_address = addr.trim().to_string();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_env_overrides_apply() {
        let vars = env(&[
            ("SUPABASE_URL", "https://project.supabase.co"),
            ("SUPABASE_ANON_KEY", "anon-key"),
            ("PORT", "8080"),
            ("FRONTEND_URL", "https://a.example, https://b.example"),
            ("APP_ENV", "production"),
        ]);
        let mut config = GatewayConfig::default();
        apply_env_overrides(&mut config, |k| vars.get(k).cloned()).unwrap();

        assert_eq!(config.upstream.url, "https://project.supabase.co");
        assert_eq!(config.upstream.anon_key, "anon-key");
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(
            config.cors.frontend_origins,
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
        assert_eq!(config.environment, Environment::Production);
    }

    #[test]
    fn test_blank_values_are_ignored() {
        let vars = env(&[("SUPABASE_URL", "   "), ("HOST", "")]);
        let mut config = GatewayConfig::default();
        apply_env_overrides(&mut config, |k| vars.get(k).cloned()).unwrap();
        assert!(config.upstream.url.is_empty());
        assert_eq!(config.listener.bind_address, "0.0.0.0:3000");
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let vars = env(&[("PORT", "eighty")]);
        let mut config = GatewayConfig::default();
        let err = apply_env_overrides(&mut config, |k| vars.get(k).cloned()).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_zero_timeout_disables_it() {
        let vars = env(&[("UPSTREAM_TIMEOUT_SECS", "0")]);
        let mut config = GatewayConfig::default();
        config.upstream.timeout_secs = Some(10);
        apply_env_overrides(&mut config, |k| vars.get(k).cloned()).unwrap();
        assert_eq!(config.upstream.timeout_secs, None);
    }

    #[test]
    fn test_unknown_environment_is_rejected() {
        let vars = env(&[("APP_ENV", "staging")]);
        let mut config = GatewayConfig::default();
        assert!(matches!(
            apply_env_overrides(&mut config, |k| vars.get(k).cloned()),
            Err(ConfigError::InvalidEnv { key: "APP_ENV", .. })
        ));
    }

    #[test]
    fn test_load_config_reports_missing_upstream() {
        let dir = std::env::temp_dir().join(format!("campus-gateway-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("gateway.toml");
        fs::write(&path, "[listener]\nbind_address = \"127.0.0.1:3000\"\n").unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref errors) if errors.len() == 2));

        fs::remove_file(&path).ok();
    }
}
