use crate::config::types::Config;
use std::fs;
use std::path::PathBuf;

/// `config init`: write the built-in defaults as a starting point, either to
/// stdout or to the user config location.
pub fn init(stdout: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config_content = serde_yaml::to_string(&Config::default())?;

    if stdout {
        print!("{}", config_content);
        return Ok(());
    }

    let config_path = if let Some(home_dir) = dirs::home_dir() {
        home_dir.join(".config/logforge/config.yml")
    } else {
        PathBuf::from("/etc/logforge/config.yml")
    };

    if config_path.exists() {
        eprintln!("Error: Config file already exists at {}", config_path.display());
        eprintln!("Remove it first or use --stdout to print the config");
        std::process::exit(1);
    }

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&config_path, config_content)?;

    println!("Config file written to {}", config_path.display());
    Ok(())
}

/// `config validate`: load a config and report aggregated validation errors.
pub fn validate(config_path: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let path = config_path.ok_or("No config file found. Use --config to specify a path.")?;

    println!("Validating config file: {}", path.display());

    match crate::config::load_config(&path) {
        Ok(_) => {
            println!("✓ Config is valid");
            Ok(())
        }
        Err(e) => {
            eprintln!("✗ Config validation failed:\n{}", e);
            std::process::exit(1);
        }
    }
}
