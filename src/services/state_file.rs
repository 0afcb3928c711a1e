use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexSet;
use std::fs;
use std::io;
use thiserror::Error;

use crate::models::{ModIdentity, ModStateEntry, Profile, ProfileState, RelocationSet};

/// Errors reading or writing a profile's installation state
#[derive(Error, Debug)]
pub enum StateFileError {
    #[error("I/O error on state file {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse state file {path}: {source}")]
    Parse {
        path: Utf8PathBuf,
        #[source]
        source: serde_yaml_ng::Error,
    },

    #[error("Failed to serialize installation state: {0}")]
    Serialize(#[source] serde_yaml_ng::Error),
}

/// Reads and updates `_state/installation_state.yml` for a profile.
///
/// Every operation is a full read-modify-write of the file. Callers serialize
/// access per profile (see [`crate::state::InstallCoordinator`]); two concurrent
/// writers would lose one another's entries.
#[derive(Debug, Clone, Copy, Default)]
pub struct StateFileWriter;

impl StateFileWriter {
    pub fn new() -> Self {
        Self
    }

    /// Load the profile state, or an empty state if the file does not exist yet.
    pub fn load(&self, profile: &Profile) -> Result<ProfileState, StateFileError> {
        let path = profile.state_file_path();
        if !path.exists() {
            return Ok(ProfileState::default());
        }

        let contents = fs::read_to_string(&path).map_err(|source| StateFileError::Io {
            path: path.clone(),
            source,
        })?;

        // An empty file is a valid, empty state
        if contents.trim().is_empty() {
            return Ok(ProfileState::default());
        }

        serde_yaml_ng::from_str(&contents).map_err(|source| StateFileError::Parse { path, source })
    }

    /// Record what `identity` placed into the profile.
    ///
    /// Replaces any entry previously written for the same mod full name, so an
    /// update never leaves the old version's files on the books.
    pub fn append(
        &self,
        identity: &ModIdentity,
        installer: &str,
        relocations: &RelocationSet,
        tracked_directories: &IndexSet<Utf8PathBuf>,
        profile: &Profile,
    ) -> Result<(), StateFileError> {
        let mut state = self.load(profile)?;
        let entry = ModStateEntry::new(identity, installer, relocations, tracked_directories);

        if let Some(previous) = state.upsert(entry) {
            tracing::info!(
                "Replacing state entry for {} (was version {})",
                identity.full_name,
                previous.version
            );
        }

        self.save(profile, &state)?;

        tracing::debug!(
            "Recorded {} relocations and {} tracked directories for {} in {}",
            relocations.len(),
            tracked_directories.len(),
            identity,
            profile.state_file_path()
        );
        Ok(())
    }

    /// Entry recorded for the mod, if any.
    pub fn entries(&self, identity: &ModIdentity, profile: &Profile) -> Result<Option<ModStateEntry>, StateFileError> {
        Ok(self.load(profile)?.entry(identity).cloned())
    }

    /// Drop the mod's entry and return it. The file is left untouched if there was none.
    pub fn remove(&self, identity: &ModIdentity, profile: &Profile) -> Result<Option<ModStateEntry>, StateFileError> {
        let mut state = self.load(profile)?;
        let removed = state.remove(identity);

        if removed.is_some() {
            self.save(profile, &state)?;
            tracing::info!("Removed state entry for {}", identity.full_name);
        }

        Ok(removed)
    }

    /// Write the whole state, replacing the file atomically.
    pub fn save(&self, profile: &Profile, state: &ProfileState) -> Result<(), StateFileError> {
        let dir = profile.state_dir();
        fs::create_dir_all(&dir).map_err(|source| StateFileError::Io {
            path: dir.clone(),
            source,
        })?;

        let yaml = serde_yaml_ng::to_string(state).map_err(StateFileError::Serialize)?;
        write_atomic(&profile.state_file_path(), &yaml)
    }
}

fn write_atomic(path: &Utf8Path, contents: &str) -> Result<(), StateFileError> {
    let tmp = path.with_extension("yml.tmp");

    fs::write(&tmp, contents).map_err(|source| StateFileError::Io {
        path: tmp.clone(),
        source,
    })?;

    fs::rename(&tmp, path).map_err(|source| StateFileError::Io {
        path: path.to_path_buf(),
        source,
    })
}
