use super::expand_tilde;
use super::types::*;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation failed:\n{}", .0.join("\n"))]
    ValidationList(Vec<String>),
}

/// Load a config file, or fall back to the built-in defaults when no path is
/// given. The built-in company profile is complete, so the tool runs without
/// any config file at all.
pub fn load_config_or_default(path: Option<&Path>) -> Result<Config, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => {
            let config = Config::default();
            validate_config(&config)?;
            Ok(config)
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let mut file = File::open(path).map_err(|e| {
        ConfigError::Io(std::io::Error::new(
            e.kind(),
            format!("failed to open config file '{}': {}", path.display(), e),
        ))
    })?;

    let mut yaml_string = String::new();
    file.read_to_string(&mut yaml_string).map_err(|e| {
        ConfigError::Io(std::io::Error::new(
            e.kind(),
            format!("failed to read config file '{}': {}", path.display(), e),
        ))
    })?;

    let mut config: Config = serde_yaml::from_str(&yaml_string).map_err(|e| {
        ConfigError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("in file '{}': {}", path.display(), e),
        ))
    })?;

    expand_paths(&mut config);
    validate_config(&config)?;

    Ok(config)
}

fn expand_paths(config: &mut Config) {
    config.output.durable_dir = expand_tilde(&config.output.durable_dir);
    config.output.scratch_dir = expand_tilde(&config.output.scratch_dir);
}

fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    validate_company(&config.company, &mut errors);

    for (category, profile) in &config.volumes {
        validate_volume_profile(category, profile, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationList(errors))
    }
}

fn validate_company(company: &CompanyConfig, errors: &mut Vec<String>) {
    if company.users.is_empty() {
        errors.push("company.users must contain at least one user".to_string());
    }
    if company.domain.is_empty() {
        errors.push("company.domain cannot be empty".to_string());
    }
    if company.products.is_empty() {
        errors.push("company.products must contain at least one product".to_string());
    }

    let octets: Vec<&str> = company.internal_net.split('.').collect();
    let valid_prefix = octets.len() == 2 && octets.iter().all(|o| o.parse::<u8>().is_ok());
    if !valid_prefix {
        errors.push(format!(
            "company.internal_net must be two dotted octets (e.g. '10.20'), got '{}'",
            company.internal_net
        ));
    }
}

fn validate_volume_profile(category: &str, profile: &VolumeProfileConfig, errors: &mut Vec<String>) {
    let prefix = format!("volumes.{}", category);

    if profile.hourly_weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
        errors.push(format!("{}: hourly_weights must be non-negative and finite", prefix));
    }
    if profile.hourly_weights.iter().sum::<f64>() <= 0.0 {
        errors.push(format!("{}: hourly_weights must not all be zero", prefix));
    }
    if !(0.0..=1.0).contains(&profile.noise_amplitude) {
        errors.push(format!(
            "{}: noise_amplitude must be in [0.0, 1.0], got {}",
            prefix, profile.noise_amplitude
        ));
    }
    for (name, value) in [
        ("weekend_multiplier", profile.weekend_multiplier),
        ("monday_multiplier", profile.monday_multiplier),
        ("base_count", profile.base_count),
    ] {
        if !value.is_finite() || value < 0.0 {
            errors.push(format!("{}: {} must be non-negative and finite", prefix, name));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        assert!(load_config_or_default(None).is_ok());
    }

    #[test]
    fn test_validation_aggregates_errors() {
        let mut config = Config::default();
        config.company.users.clear();
        config.company.internal_net = "not-a-prefix".to_string();
        config
            .volumes
            .get_mut("firewall")
            .unwrap()
            .noise_amplitude = 2.5;

        let result = validate_config(&config);
        match result {
            Err(ConfigError::ValidationList(errors)) => {
                assert_eq!(errors.len(), 3, "{errors:?}");
                assert!(errors.iter().any(|e| e.contains("company.users")));
                assert!(errors.iter().any(|e| e.contains("internal_net")));
                assert!(errors.iter().any(|e| e.contains("noise_amplitude")));
            }
            other => panic!("expected ValidationList, got {other:?}"),
        }
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yml");
        let yaml = serde_yaml::to_string(&Config::default()).unwrap();
        std::fs::write(&path, yaml).unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.company.name, "Coppermine Dynamics");
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config(Path::new("/nonexistent/logforge.yml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
