use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use std::sync::Arc;

use super::fs_provider::FsProvider;
use super::installers::InstallError;
use super::state_file::StateFileWriter;
use crate::models::{ModIdentity, ModStateEntry, Profile};

/// Result of removing a mod from a profile
#[derive(Debug, Clone, Default)]
pub struct UninstallOutcome {
    pub removed_files: usize,
    pub removed_directories: usize,

    /// The state entry that was reversed, `None` if the mod had no entry
    pub entry: Option<ModStateEntry>,
}

/// Reverses what an install recorded in the state file.
///
/// Only recorded relocations and tracked subdirectories are removed. Files placed
/// by `NONE`-tracked rules were never recorded and are left alone. The state entry
/// is dropped only after every removal succeeded, so a failed uninstall can be
/// retried.
pub struct Uninstaller {
    fs: Arc<dyn FsProvider>,
    state: StateFileWriter,
}

impl Uninstaller {
    pub fn new(fs: Arc<dyn FsProvider>, state: StateFileWriter) -> Self {
        Self { fs, state }
    }

    pub fn uninstall(&self, identity: &ModIdentity, profile: &Profile) -> Result<UninstallOutcome, InstallError> {
        let Some(entry) = self.state.entries(identity, profile)? else {
            tracing::info!("{} has no state entry in profile {}", identity.full_name, profile.name());
            return Ok(UninstallOutcome::default());
        };

        let mut outcome = UninstallOutcome::default();

        for record in &entry.relocations {
            let Some(path) = resolve_in_profile(profile, &record.destination) else {
                continue;
            };
            if self.fs.exists(&path) {
                self.fs
                    .remove_file(&path)
                    .map_err(|e| InstallError::fs(&path, e))?;
                outcome.removed_files += 1;
            }
        }

        for dir in &entry.tracked_directories {
            let Some(path) = resolve_in_profile(profile, dir) else {
                continue;
            };
            if self.fs.exists(&path) {
                self.fs
                    .remove_dir_all(&path)
                    .map_err(|e| InstallError::fs(&path, e))?;
                outcome.removed_directories += 1;
            }
        }

        outcome.entry = self.state.remove(identity, profile)?;

        tracing::info!(
            "Uninstalled {} from profile {}: {} files, {} directories",
            identity.full_name,
            profile.name(),
            outcome.removed_files,
            outcome.removed_directories
        );

        Ok(outcome)
    }
}

/// Absolute path for a recorded destination, refusing anything that escapes the profile.
fn resolve_in_profile(profile: &Profile, relative: &Utf8Path) -> Option<Utf8PathBuf> {
    let escapes = relative
        .components()
        .any(|c| !matches!(c, Utf8Component::Normal(_) | Utf8Component::CurDir));

    if escapes || relative.as_str().is_empty() {
        tracing::warn!("Ignoring state record outside the profile: {}", relative);
        return None;
    }

    Some(profile.path_of_profile().join(relative))
}
