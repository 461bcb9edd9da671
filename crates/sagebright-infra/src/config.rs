//! Configuration loader for Sagebright.
//!
//! Reads `config.toml` from the data directory and deserializes it into
//! [`SagebrightConfig`]. Falls back to defaults when the file is missing
//! or malformed, and clamps the inactivity thresholds so a bad file can
//! never disable the hard-logout timer.

use std::path::Path;

use sagebright_types::config::SagebrightConfig;

/// Minimum gap between the warning and the hard logout, in seconds.
const MIN_LOGOUT_GAP_SECS: u64 = 30;

/// Load configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns [`SagebrightConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
/// - If the file exists and parses successfully, returns the parsed config
///   with inactivity thresholds clamped.
pub async fn load_config(data_dir: &Path) -> SagebrightConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return SagebrightConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return SagebrightConfig::default();
        }
    };

    match toml::from_str::<SagebrightConfig>(&content) {
        Ok(config) => clamp_inactivity(config),
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            SagebrightConfig::default()
        }
    }
}

/// Ensure the logout threshold stays after the warning threshold.
fn clamp_inactivity(mut config: SagebrightConfig) -> SagebrightConfig {
    let floor = config.inactivity.warn_after_secs + MIN_LOGOUT_GAP_SECS;
    if config.inactivity.logout_after_secs < floor {
        tracing::warn!(
            warn_after_secs = config.inactivity.warn_after_secs,
            logout_after_secs = config.inactivity.logout_after_secs,
            clamped_to = floor,
            "Inactivity logout threshold too close to warning; clamping"
        );
        config.inactivity.logout_after_secs = floor;
    }
    config
}
