// Install coordination module
//
// This module provides the InstallCoordinator which serializes installs per profile
// and emits change events for interested listeners.

use crate::metrics::Metrics;
use crate::models::{ModIdentity, Profile};
use crate::services::installers::{InstallArgs, InstallError, InstallOutcome, InstallerRegistry};
use crate::services::uninstall::{UninstallOutcome, Uninstaller};
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;
use tokio::sync::{Mutex as AsyncMutex, broadcast};

/// Events emitted as installs and uninstalls progress
///
/// These let a frontend follow what is happening without polling the profile.
#[derive(Clone, Debug, PartialEq)]
pub enum InstallEvent {
    /// An install acquired its profile and is about to copy files
    InstallStarted {
        profile: String,
        mod_name: String,
        installer: String,
    },

    /// An install completed and its state entry was written
    InstallFinished {
        profile: String,
        mod_name: String,
        copied: usize,
        skipped: usize,
    },

    /// An install aborted; files copied before the failure stay on disk
    InstallFailed {
        profile: String,
        mod_name: String,
        error: String,
    },

    /// A mod's recorded files were removed from a profile
    Uninstalled {
        profile: String,
        mod_name: String,
        removed_files: usize,
        removed_directories: usize,
    },
}

/// Runs installs and uninstalls one at a time per profile
///
/// Every install is a read-modify-write of the profile's state file with no merge
/// protocol, so two installs into the same profile must never overlap. Each
/// profile root gets its own async mutex; installs into different profiles run
/// independently. The blocking filesystem work runs on tokio's blocking pool.
///
/// # Usage
///
/// - [`install()`](Self::install) to install a package with a registered installer
/// - [`uninstall()`](Self::uninstall) to reverse a mod's recorded state
/// - [`subscribe()`](Self::subscribe) for listening to [`InstallEvent`]s
pub struct InstallCoordinator {
    registry: Arc<InstallerRegistry>,
    uninstaller: Arc<Uninstaller>,

    /// One lock per profile root, created on first use
    profile_locks: Mutex<HashMap<Utf8PathBuf, Arc<AsyncMutex<()>>>>,

    /// Broadcast channel for install events
    event_tx: broadcast::Sender<InstallEvent>,

    metrics: Arc<Metrics>,
}

impl InstallCoordinator {
    /// Create a coordinator with a broadcast buffer of 100 events
    pub fn new(registry: Arc<InstallerRegistry>, uninstaller: Uninstaller) -> Self {
        let (event_tx, _) = broadcast::channel(100);
        Self {
            registry,
            uninstaller: Arc::new(uninstaller),
            profile_locks: Mutex::new(HashMap::new()),
            event_tx,
            metrics: Arc::new(Metrics::new()),
        }
    }

    /// Share an existing metrics instance
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn registry(&self) -> &InstallerRegistry {
        &self.registry
    }

    /// Subscribe to install events
    ///
    /// Returns a receiver that will get notified of all future events.
    pub fn subscribe(&self) -> broadcast::Receiver<InstallEvent> {
        self.event_tx.subscribe()
    }

    /// Install `package_path` into `profile` with the installer registered as `installer_id`.
    ///
    /// Waits for any other install or uninstall on the same profile to finish first.
    pub async fn install(
        &self,
        installer_id: &str,
        mod_identity: ModIdentity,
        package_path: Utf8PathBuf,
        profile: Profile,
    ) -> Result<InstallOutcome, InstallError> {
        let installer = self.registry.get(installer_id)?;

        let lock = self.profile_lock(profile.path_of_profile());
        let _guard = lock.lock().await;

        self.emit(InstallEvent::InstallStarted {
            profile: profile.name().to_string(),
            mod_name: mod_identity.full_name.clone(),
            installer: installer_id.to_string(),
        });

        let start = Instant::now();
        let task = {
            let mod_identity = mod_identity.clone();
            let profile = profile.clone();
            tokio::task::spawn_blocking(move || {
                installer.install(&InstallArgs {
                    mod_identity: &mod_identity,
                    package_path: &package_path,
                    profile: &profile,
                })
            })
        };

        let result = match task.await {
            Ok(result) => result,
            Err(e) => Err(InstallError::TaskAborted(e.to_string())),
        };

        match &result {
            Ok(outcome) => {
                self.metrics.record_install_completed(start.elapsed());
                self.metrics.record_files_copied(outcome.copied);
                self.metrics.record_files_skipped(outcome.skipped.len());
                tracing::info!(
                    "Installed {} into {} in {:.2}s ({} copied, {} skipped)",
                    mod_identity,
                    profile.name(),
                    start.elapsed().as_secs_f32(),
                    outcome.copied,
                    outcome.skipped.len()
                );
                self.emit(InstallEvent::InstallFinished {
                    profile: profile.name().to_string(),
                    mod_name: mod_identity.full_name.clone(),
                    copied: outcome.copied,
                    skipped: outcome.skipped.len(),
                });
            }
            Err(e) => {
                self.metrics.record_install_failed();
                tracing::error!("Install of {} into {} failed: {}", mod_identity, profile.name(), e);
                self.emit(InstallEvent::InstallFailed {
                    profile: profile.name().to_string(),
                    mod_name: mod_identity.full_name.clone(),
                    error: e.to_string(),
                });
            }
        }

        result
    }

    /// Remove everything `mod_identity` recorded in `profile`.
    pub async fn uninstall(&self, mod_identity: ModIdentity, profile: Profile) -> Result<UninstallOutcome, InstallError> {
        let lock = self.profile_lock(profile.path_of_profile());
        let _guard = lock.lock().await;

        let uninstaller = self.uninstaller.clone();
        let task = {
            let mod_identity = mod_identity.clone();
            let profile = profile.clone();
            tokio::task::spawn_blocking(move || uninstaller.uninstall(&mod_identity, &profile))
        };

        let outcome = match task.await {
            Ok(result) => result?,
            Err(e) => return Err(InstallError::TaskAborted(e.to_string())),
        };

        self.metrics.record_uninstall();
        self.emit(InstallEvent::Uninstalled {
            profile: profile.name().to_string(),
            mod_name: mod_identity.full_name,
            removed_files: outcome.removed_files,
            removed_directories: outcome.removed_directories,
        });

        Ok(outcome)
    }

    fn profile_lock(&self, root: &Utf8Path) -> Arc<AsyncMutex<()>> {
        let mut locks = self
            .profile_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        locks.entry(root.to_path_buf()).or_default().clone()
    }

    fn emit(&self, event: InstallEvent) {
        // No subscribers is fine
        if self.event_tx.send(event).is_ok() {
            self.metrics.record_event_broadcast();
        }
    }
}
