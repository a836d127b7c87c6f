mod init;
mod schema;
mod validation;

pub use init::{write_starter_scenario, STARTER_SCENARIO};
pub use schema::Scenario;
pub use validation::validate_scenario;

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// Get the config directory path (~/.config/resettle-rank/)
pub fn get_config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join("resettle-rank"))
}

/// Get the default scenario file path (~/.config/resettle-rank/scenario.yaml)
pub fn get_scenario_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join("scenario.yaml"))
}

/// Ensure the config directory exists
pub fn ensure_config_dir() -> Result<()> {
    let config_dir = get_config_dir()?;
    if !config_dir.exists() {
        fs::create_dir_all(&config_dir).with_context(|| {
            format!("Failed to create config directory at {}", config_dir.display())
        })?;
    }
    Ok(())
}

/// Load a scenario from a YAML file
///
/// # Arguments
///
/// * `path` - Optional path to the scenario. If None, uses the default path
///   (~/.config/resettle-rank/scenario.yaml)
///
/// # Errors
///
/// Returns an error if:
/// - The scenario file does not exist
/// - The scenario file cannot be read
/// - The YAML cannot be parsed
pub fn load_scenario(path: Option<PathBuf>) -> Result<Scenario> {
    let scenario_path = match path {
        Some(p) => p,
        None => get_scenario_path()?,
    };

    if !scenario_path.exists() {
        anyhow::bail!(
            "Scenario file not found at {}. Run `resettle-rank init` to create one",
            scenario_path.display()
        );
    }

    let content = fs::read_to_string(&scenario_path)
        .with_context(|| format!("Failed to read scenario file at {}", scenario_path.display()))?;

    parse_scenario(&content).with_context(|| {
        format!(
            "Failed to parse scenario: invalid YAML in {}",
            scenario_path.display()
        )
    })
}

/// Parse scenario YAML text.
pub fn parse_scenario(content: &str) -> Result<Scenario> {
    let scenario: Scenario = serde_saphyr::from_str(content)?;
    Ok(scenario)
}
