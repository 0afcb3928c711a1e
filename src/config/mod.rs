use crate::models::{InstallerRulesConfig, Settings};
use anyhow::{Context, Result, anyhow};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

/// Prefix for environment variables that override Settings.yaml (e.g. `MODROUTE_DEBUG_MODE`)
pub const ENV_PREFIX: &str = "MODROUTE";

/// Configuration manager for loading and saving YAML configuration files.
///
/// Manages two configuration files:
/// - Settings (`Settings.yaml`): profile and log locations, debug flags
/// - Installers (`Installers.yaml`): rule-driven installers keyed by id
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: Utf8PathBuf,
    settings_path: Utf8PathBuf,
    installers_path: Utf8PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager with the specified configuration directory.
    ///
    /// # Arguments
    /// * `config_dir` - Directory containing configuration files
    ///
    /// # Returns
    /// A new ConfigManager instance
    pub fn new<P: AsRef<Utf8Path>>(config_dir: P) -> Result<Self> {
        let config_dir = config_dir.as_ref().to_path_buf();

        // Create config directory if it doesn't exist
        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {}", config_dir))?;
        }

        Ok(Self {
            settings_path: config_dir.join("Settings.yaml"),
            installers_path: config_dir.join("Installers.yaml"),
            config_dir,
        })
    }

    /// Load settings, layering `MODROUTE_*` environment variables over Settings.yaml.
    ///
    /// A missing file is not an error; every field has a default.
    pub fn load_settings(&self) -> Result<Settings> {
        let settings: Settings = config::Config::builder()
            .add_source(
                config::File::new(self.settings_path.as_str(), config::FileFormat::Yaml)
                    .required(false),
            )
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .with_context(|| format!("Failed to read settings: {}", self.settings_path))?
            .try_deserialize()
            .with_context(|| format!("Failed to parse settings: {}", self.settings_path))?;

        tracing::debug!("Loaded settings: {:?}", settings);
        Ok(settings)
    }

    /// Save the settings file.
    pub fn save_settings(&self, settings: &Settings) -> Result<()> {
        let yaml_string =
            serde_yaml_ng::to_string(settings).context("Failed to serialize settings to YAML")?;

        fs::write(&self.settings_path, yaml_string)
            .with_context(|| format!("Failed to write settings: {}", self.settings_path))?;

        tracing::info!("Saved settings to {}", self.settings_path);
        Ok(())
    }

    /// Load the installer rules file.
    ///
    /// # Returns
    /// The loaded rules, or the built-in `shimloader-plugin` set if the file doesn't exist.
    /// Rules that fail validation are rejected.
    pub fn load_installer_rules(&self) -> Result<InstallerRulesConfig> {
        if !self.installers_path.exists() {
            tracing::warn!(
                "Installer rules not found at {}, using defaults",
                self.installers_path
            );
            return Ok(InstallerRulesConfig::default());
        }

        let file_contents = fs::read_to_string(&self.installers_path)
            .with_context(|| format!("Failed to read installer rules: {}", self.installers_path))?;

        let rules: InstallerRulesConfig = serde_yaml_ng::from_str(&file_contents)
            .with_context(|| format!("Failed to parse installer rules: {}", self.installers_path))?;

        rules.validate().map_err(|(id, e)| {
            anyhow!("Invalid installer '{}' in {}: {}", id, self.installers_path, e)
        })?;

        tracing::info!(
            "Loaded {} installer(s) from {}",
            rules.installers.len(),
            self.installers_path
        );
        Ok(rules)
    }

    /// Save the installer rules file.
    pub fn save_installer_rules(&self, rules: &InstallerRulesConfig) -> Result<()> {
        let yaml_string = serde_yaml_ng::to_string(rules)
            .context("Failed to serialize installer rules to YAML")?;

        fs::write(&self.installers_path, yaml_string)
            .with_context(|| format!("Failed to write installer rules: {}", self.installers_path))?;

        tracing::info!("Saved installer rules to {}", self.installers_path);
        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }
}
