//! Layered configuration loading
//!
//! Precedence, lowest to highest:
//! - Built-in defaults
//! - Optional YAML or JSON file (format picked by extension)
//! - `RCM_*` environment variables
//! - Command-line flags

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use denial_analytics::PipelineConfig;
use std::path::Path;

pub const ENV_SEED: &str = "RCM_SEED";
pub const ENV_TOTAL_CLAIMS: &str = "RCM_TOTAL_CLAIMS";
pub const ENV_NO_RESPONSE_RATE: &str = "RCM_NO_RESPONSE_RATE";
pub const ENV_START_DATE: &str = "RCM_START_DATE";
pub const ENV_END_DATE: &str = "RCM_END_DATE";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Yaml,
    Json,
}

impl FileFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("yaml") | Some("yml") => Ok(FileFormat::Yaml),
            Some("json") => Ok(FileFormat::Json),
            _ => bail!(
                "Unsupported config file {}: expected a .yaml, .yml or .json extension",
                path.display()
            ),
        }
    }
}

/// Parse a configuration document. Missing fields keep their defaults.
pub fn parse_config(contents: &str, format: FileFormat) -> Result<PipelineConfig> {
    let config = match format {
        FileFormat::Yaml => serde_yaml::from_str(contents).context("Invalid YAML configuration")?,
        FileFormat::Json => serde_json::from_str(contents).context("Invalid JSON configuration")?,
    };
    Ok(config)
}

pub fn load_config_file(path: &Path) -> Result<PipelineConfig> {
    let format = FileFormat::from_path(path)?;
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    parse_config(&contents, format)
        .with_context(|| format!("Failed to load config file {}", path.display()))
}

fn parse_var<T>(name: &str, raw: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim()
        .parse()
        .with_context(|| format!("Invalid value for {}: '{}'", name, raw))
}

/// Apply `RCM_*` overrides. `lookup` is `std::env::var(..).ok()` in the binary.
pub fn apply_env_overrides<F>(config: &mut PipelineConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let simulation = &mut config.simulation;
    if let Some(raw) = lookup(ENV_SEED) {
        simulation.seed = parse_var(ENV_SEED, &raw)?;
    }
    if let Some(raw) = lookup(ENV_TOTAL_CLAIMS) {
        simulation.total_claims = parse_var(ENV_TOTAL_CLAIMS, &raw)?;
    }
    if let Some(raw) = lookup(ENV_NO_RESPONSE_RATE) {
        simulation.target_no_response_rate = parse_var(ENV_NO_RESPONSE_RATE, &raw)?;
    }
    if let Some(raw) = lookup(ENV_START_DATE) {
        simulation.start_date = parse_var::<NaiveDate>(ENV_START_DATE, &raw)?;
    }
    if let Some(raw) = lookup(ENV_END_DATE) {
        simulation.end_date = parse_var::<NaiveDate>(ENV_END_DATE, &raw)?;
    }
    Ok(())
}

/// Values given on the command line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlagOverrides {
    pub seed: Option<u64>,
    pub total_claims: Option<u32>,
}

impl FlagOverrides {
    pub fn apply(&self, config: &mut PipelineConfig) {
        if let Some(seed) = self.seed {
            config.simulation.seed = seed;
        }
        if let Some(total_claims) = self.total_claims {
            config.simulation.total_claims = total_claims;
        }
    }
}

/// Resolve every layer and validate the result
pub fn resolve_config<F>(
    path: Option<&Path>,
    lookup: F,
    flags: FlagOverrides,
) -> Result<PipelineConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => load_config_file(path)?,
        None => PipelineConfig::default(),
    };
    apply_env_overrides(&mut config, lookup)?;
    flags.apply(&mut config);
    config.validate().context("Configuration is invalid")?;
    Ok(config)
}

/// Default configuration rendered for `default-config`
pub fn render_default_config(format: FileFormat) -> Result<String> {
    let config = PipelineConfig::default();
    let rendered = match format {
        FileFormat::Yaml => serde_yaml::to_string(&config)?,
        FileFormat::Json => serde_json::to_string_pretty(&config)?,
    };
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(FileFormat::from_path(Path::new("run.yaml")).unwrap(), FileFormat::Yaml);
        assert_eq!(FileFormat::from_path(Path::new("run.YML")).unwrap(), FileFormat::Yaml);
        assert_eq!(FileFormat::from_path(Path::new("run.json")).unwrap(), FileFormat::Json);
        assert!(FileFormat::from_path(Path::new("run.toml")).is_err());
        assert!(FileFormat::from_path(Path::new("run")).is_err());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
simulation:
  totalClaims: 1200
  targetNoResponseRate: 0.2
analytics:
  riskPrediction:
    strategy: exactReuse
"#;
        let config = parse_config(yaml, FileFormat::Yaml).unwrap();
        assert_eq!(config.simulation.total_claims, 1200);
        assert_eq!(config.simulation.target_no_response_rate, 0.2);
        assert_eq!(config.simulation.seed, 42);
        assert_eq!(
            config.analytics.risk_prediction,
            denial_analytics::PredictionStrategy::ExactReuse
        );
        assert_eq!(config.analytics.automation.workflows.len(), 4);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = PipelineConfig::default();
        apply_env_overrides(
            &mut config,
            env(&[
                (ENV_SEED, "7"),
                (ENV_TOTAL_CLAIMS, " 250 "),
                (ENV_START_DATE, "2023-01-01"),
            ]),
        )
        .unwrap();
        assert_eq!(config.simulation.seed, 7);
        assert_eq!(config.simulation.total_claims, 250);
        assert_eq!(config.simulation.start_date.to_string(), "2023-01-01");
        assert_eq!(config.simulation.end_date.to_string(), "2024-12-31");
    }

    #[test]
    fn test_bad_env_value_is_error() {
        let mut config = PipelineConfig::default();
        let err = apply_env_overrides(&mut config, env(&[(ENV_TOTAL_CLAIMS, "many")])).unwrap_err();
        assert!(err.to_string().contains(ENV_TOTAL_CLAIMS));
    }

    #[test]
    fn test_flags_beat_env() {
        let config = resolve_config(
            None,
            env(&[(ENV_SEED, "7"), (ENV_TOTAL_CLAIMS, "250")]),
            FlagOverrides {
                seed: Some(99),
                total_claims: None,
            },
        )
        .unwrap();
        assert_eq!(config.simulation.seed, 99);
        assert_eq!(config.simulation.total_claims, 250);
    }

    #[test]
    fn test_resolve_validates() {
        let result = resolve_config(
            None,
            env(&[]),
            FlagOverrides {
                seed: None,
                total_claims: Some(0),
            },
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_default_config_round_trips_through_yaml() {
        let yaml = render_default_config(FileFormat::Yaml).unwrap();
        assert!(yaml.contains("totalClaims: 6685"));
        let parsed = parse_config(&yaml, FileFormat::Yaml).unwrap();
        assert_eq!(parsed, PipelineConfig::default());
    }

    #[test]
    fn test_load_config_file_from_disk() {
        let path = std::env::temp_dir().join(format!("rcm-denials-settings-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"simulation": {"seed": 5}}"#).unwrap();
        let config = load_config_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(config.simulation.seed, 5);
    }
}
