use camino::Utf8PathBuf;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::rules::{RoutingRule, RuleError, TrackingMethod, validate_rules};

/// Id of the built-in rule set for UE4SS shimloader plugin packages
pub const SHIMLOADER_PLUGIN_INSTALLER: &str = "shimloader-plugin";

/// Application settings from Settings.yaml, overridable via `MODROUTE_*` variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_profiles_dir")]
    pub profiles_dir: Utf8PathBuf,

    #[serde(default = "default_log_dir")]
    pub log_dir: Utf8PathBuf,

    #[serde(default = "default_log_prefix")]
    pub log_prefix: String,

    #[serde(default)]
    pub debug_mode: bool,

    #[serde(default)]
    pub console_logging: bool,

    /// Write the log file as JSON lines
    #[serde(default)]
    pub json_logs: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            profiles_dir: default_profiles_dir(),
            log_dir: default_log_dir(),
            log_prefix: default_log_prefix(),
            debug_mode: false,
            console_logging: false,
            json_logs: false,
        }
    }
}

fn default_profiles_dir() -> Utf8PathBuf {
    Utf8PathBuf::from("profiles")
}

fn default_log_dir() -> Utf8PathBuf {
    Utf8PathBuf::from("logs")
}

fn default_log_prefix() -> String {
    "modroute".to_string()
}

/// One declarative installer: which package files are ignored and where the rest go.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleInstallerConfig {
    /// Package-relative paths that are never installed
    #[serde(default)]
    pub relative_file_exclusions: Vec<String>,

    pub rules: Vec<RoutingRule>,
}

impl RuleInstallerConfig {
    /// Rule set for plugins loaded by unreal-shimloader.
    pub fn shimloader_plugin() -> Self {
        Self {
            relative_file_exclusions: ["manifest.json", "README.md", "icon.png", "LICENCE"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            rules: vec![
                RoutingRule::new("shimloader/mod", &[".lua"], TrackingMethod::SubdirTracked)
                    .with_sub_routes(vec![RoutingRule::new(
                        "dll",
                        &[".dll"],
                        TrackingMethod::SubdirTracked,
                    )]),
                RoutingRule::new("shimloader/pak", &[".pak"], TrackingMethod::SubdirTracked),
                RoutingRule::new("shimloader/cfg", &[".cfg"], TrackingMethod::None),
            ],
        }
    }

    pub fn validate(&self) -> Result<(), RuleError> {
        validate_rules(&self.rules)
    }

    /// Whether a package-relative path is on the exclusion list. Case-insensitive.
    pub fn is_excluded(&self, relative: &str) -> bool {
        self.relative_file_exclusions
            .iter()
            .any(|e| e.eq_ignore_ascii_case(relative))
    }
}

/// Contents of Installers.yaml: every rule-driven installer by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallerRulesConfig {
    #[serde(default)]
    pub installers: IndexMap<String, RuleInstallerConfig>,
}

impl Default for InstallerRulesConfig {
    fn default() -> Self {
        let mut installers = IndexMap::new();
        installers.insert(
            SHIMLOADER_PLUGIN_INSTALLER.to_string(),
            RuleInstallerConfig::shimloader_plugin(),
        );
        Self { installers }
    }
}

impl InstallerRulesConfig {
    pub fn get(&self, id: &str) -> Option<&RuleInstallerConfig> {
        self.installers.get(id)
    }

    /// Validate every installer, naming the first one that fails.
    pub fn validate(&self) -> Result<(), (String, RuleError)> {
        for (id, installer) in &self.installers {
            installer.validate().map_err(|e| (id.clone(), e))?;
        }
        Ok(())
    }
}
