pub mod init;
mod schema;
pub mod settings;

pub use schema::{Config, StoreConfig, ThemeMode, DEFAULT_BRANCH, DEFAULT_PATH, DEFAULT_REPO};

use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Get the config directory path (~/.config/coasterbook/)
pub fn get_config_dir() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".config").join("coasterbook")
}

/// Get the default config file path (~/.config/coasterbook/config.yaml)
pub fn get_config_path() -> PathBuf {
    get_config_dir().join("config.yaml")
}

/// Load configuration from a YAML file
///
/// # Arguments
///
/// * `path` - Optional path to config file. If None, uses default path (~/.config/coasterbook/config.yaml)
///
/// # Errors
///
/// Returns an error if:
/// - The config file does not exist
/// - The config file cannot be read
/// - The YAML cannot be parsed
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let config_path = path.unwrap_or_else(get_config_path);

    if !config_path.exists() {
        anyhow::bail!(
            "Config file not found at {}. Run `coasterbook init` to create one.",
            config_path.display()
        );
    }

    let config_content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;

    let config: Config = serde_saphyr::from_str(&config_content).with_context(|| {
        format!(
            "Failed to parse config: invalid YAML in {}",
            config_path.display()
        )
    })?;

    Ok(config)
}

/// Like [`load_config`], but a missing file yields the default config.
/// A file that exists and fails to parse is still an error.
pub fn load_config_or_default(path: Option<PathBuf>) -> Result<Config> {
    let config_path = path.unwrap_or_else(get_config_path);
    if !config_path.exists() {
        log::debug!("no config at {}, using defaults", config_path.display());
        return Ok(Config::default());
    }
    load_config(Some(config_path))
}

/// Write configuration atomically: readers see either the old file or the
/// new one, never a partial write.
pub fn save_config(path: &Path, config: &Config) -> Result<()> {
    let yaml = serde_saphyr::to_string(config)
        .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open {} for writing", path.display()))?;
    file.write_all(yaml.as_bytes())
        .context("Failed to write config")?;
    file.commit()
        .with_context(|| format!("Failed to save config to {}", path.display()))?;

    log::debug!("config written to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(Some(dir.path().join("nope.yaml"))).unwrap_err();
        assert!(err.to_string().contains("coasterbook init"));
    }

    #[test]
    fn test_invalid_yaml_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "store: [unclosed").unwrap();
        assert!(load_config(Some(path)).is_err());
    }

    #[test]
    fn test_or_default_only_covers_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = load_config_or_default(Some(dir.path().join("nope.yaml"))).unwrap();
        assert_eq!(missing, Config::default());

        let path = dir.path().join("config.yaml");
        fs::write(&path, "scoring:\n  pivot_fraction: [oops\n").unwrap();
        assert!(load_config_or_default(Some(path)).is_err());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");
        let mut config = Config::default();
        config.store.owner = "alice".into();
        config.theme = ThemeMode::Dark;

        save_config(&path, &config).unwrap();
        let loaded = load_config(Some(path)).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_save_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        let mut config = Config::default();
        config.store.owner = "alice".into();
        save_config(&path, &config).unwrap();

        config.store.owner = "bob".into();
        save_config(&path, &config).unwrap();
        assert_eq!(load_config(Some(path)).unwrap().store.owner, "bob");
    }

    #[test]
    fn test_config_path_under_coasterbook() {
        let path = get_config_path();
        assert!(path.ends_with(".config/coasterbook/config.yaml"));
    }
}
