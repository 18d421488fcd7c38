use anyhow::{Context, Result, bail};
use std::fs;
use std::path::Path;

use crate::types::CheckConfig;

/// Table under `[package.metadata]` holding the self-check configuration.
pub const METADATA_KEY: &str = "sanitizer-demos";

/// Load the self-check configuration.
/// An explicit config file wins; otherwise `[package.metadata.sanitizer-demos]`
/// in the project's Cargo.toml; otherwise defaults.
pub fn load_config(project_path: &Path, config_override: Option<&Path>) -> Result<CheckConfig> {
    if let Some(config_path) = config_override {
        let content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
        let parsed: toml::Value = content
            .parse()
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;
        tracing::debug!(path = %config_path.display(), "using config override");
        return config_from_toml_value(&parsed)
            .with_context(|| format!("Invalid config file: {}", config_path.display()));
    }

    let cargo_toml_path = project_path.join("Cargo.toml");
    if cargo_toml_path.exists() {
        let content = fs::read_to_string(&cargo_toml_path)
            .with_context(|| format!("Failed to read {}", cargo_toml_path.display()))?;
        let parsed: toml::Value = content
            .parse()
            .with_context(|| format!("Failed to parse {}", cargo_toml_path.display()))?;

        if let Some(metadata) = parsed
            .get("package")
            .and_then(|p| p.get("metadata"))
            .and_then(|m| m.get(METADATA_KEY))
        {
            return config_from_toml_value(metadata).with_context(|| {
                format!(
                    "Invalid [package.metadata.{}] in {}",
                    METADATA_KEY,
                    cargo_toml_path.display()
                )
            });
        }
    }

    Ok(CheckConfig::default())
}

/// Parse a CheckConfig from a TOML value. Unknown keys are ignored.
fn config_from_toml_value(value: &toml::Value) -> Result<CheckConfig> {
    let mut config = CheckConfig::default();

    if let Some(v) = value.get("disabled-checks") {
        config.disabled_checks = string_array(v, "disabled-checks")?;
    }
    if let Some(v) = value.get("exclude") {
        config.exclude = string_array(v, "exclude")?;
    }
    if let Some(v) = value.get("strict") {
        match v.as_bool() {
            Some(strict) => config.strict = strict,
            None => bail!("`strict` must be a boolean"),
        }
    }

    Ok(config)
}

fn string_array(value: &toml::Value, key: &str) -> Result<Vec<String>> {
    let Some(items) = value.as_array() else {
        bail!("`{}` must be an array of strings", key);
    };
    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .with_context(|| format!("`{}` must only contain strings", key))
        })
        .collect()
}
