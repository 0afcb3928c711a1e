use indexmap::IndexMap;
use std::sync::Arc;

use super::{InstallError, PackageInstaller, RuleInstaller, ShimloaderInstaller};
use crate::models::InstallerRulesConfig;
use crate::services::fs_provider::FsProvider;
use crate::services::state_file::StateFileWriter;

/// Installers available for lookup by id.
#[derive(Default)]
pub struct InstallerRegistry {
    installers: IndexMap<String, Arc<dyn PackageInstaller>>,
}

impl InstallerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The shimloader bootstrap installer plus one [`RuleInstaller`] per configured rule set.
    pub fn from_config(rules: &InstallerRulesConfig, fs: Arc<dyn FsProvider>, state: StateFileWriter) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(ShimloaderInstaller::new(fs.clone(), state)));

        for (id, config) in &rules.installers {
            registry.register(Arc::new(RuleInstaller::new(
                id.clone(),
                Arc::new(config.clone()),
                fs.clone(),
                state,
            )));
        }

        tracing::debug!("Registered installers: {:?}", registry.ids().collect::<Vec<_>>());
        registry
    }

    /// Add an installer, replacing any existing one with the same id.
    pub fn register(&mut self, installer: Arc<dyn PackageInstaller>) {
        let id = installer.id().to_string();
        if self.installers.insert(id.clone(), installer).is_some() {
            tracing::warn!("Installer {} registered twice, keeping the latest", id);
        }
    }

    pub fn get(&self, id: &str) -> Result<Arc<dyn PackageInstaller>, InstallError> {
        self.installers
            .get(id)
            .cloned()
            .ok_or_else(|| InstallError::UnknownInstaller(id.to_string()))
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.installers.keys().map(String::as_str)
    }
}
