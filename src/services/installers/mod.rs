//! Package installers.
//!
//! Every installer implements the [`PackageInstaller`] capability and is picked by
//! id from an [`InstallerRegistry`], so supporting a new loader means adding a rule
//! set to `Installers.yaml` or, for layouts rules can't express, one more
//! implementation.
//!
//! - [`ShimloaderInstaller`]: fixed-target copier for the unreal-shimloader/UE4SS bootstrap package
//! - [`RuleInstaller`]: routes every package file through a declarative rule tree
//!
//! Installs fail fast. The first missing source or I/O error aborts the install;
//! files already copied stay where they are and the state file is only written
//! once every copy succeeded. Before copying, every tracked directory and
//! relocation is checked against the other mods' state entries; a path already
//! owned by another mod fails the install with nothing copied.

pub mod registry;
pub mod rule_installer;
pub mod shimloader;

pub use registry::InstallerRegistry;
pub use rule_installer::RuleInstaller;
pub use shimloader::ShimloaderInstaller;

use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexSet;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

use super::fs_provider::FsProvider;
use super::state_file::StateFileError;
use crate::models::{ModIdentity, Profile, ProfileState, RelocationSet};

/// Errors that abort an install or uninstall
#[derive(Error, Debug)]
pub enum InstallError {
    #[error("Source file missing from package: {0}")]
    SourceMissing(Utf8PathBuf),

    #[error("Filesystem error at {path}: {source}")]
    FileSystem {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to update installation state: {0}")]
    StateWrite(#[from] StateFileError),

    #[error("Path is not valid UTF-8: {0:?}")]
    NonUtf8Path(PathBuf),

    #[error("{path} is already owned by {owner}")]
    OwnershipConflict { path: Utf8PathBuf, owner: String },

    #[error("No installer registered as {0:?}")]
    UnknownInstaller(String),

    #[error("Install task aborted: {0}")]
    TaskAborted(String),
}

impl InstallError {
    pub(crate) fn fs(path: &Utf8Path, source: io::Error) -> Self {
        InstallError::FileSystem {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Inputs of one install.
#[derive(Debug, Clone, Copy)]
pub struct InstallArgs<'a> {
    pub mod_identity: &'a ModIdentity,

    /// Root of the extracted package
    pub package_path: &'a Utf8Path,

    pub profile: &'a Profile,
}

/// Why a package file was not installed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Listed in the installer's relative file exclusions
    Excluded,
    /// No routing rule claims the file
    Unrouted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    /// Package-relative path
    pub path: Utf8PathBuf,
    pub reason: SkipReason,
}

/// What an install did.
#[derive(Debug, Clone, Default)]
pub struct InstallOutcome {
    /// Number of files copied into the profile
    pub copied: usize,

    /// Individually tracked copies, source to profile-relative destination
    pub relocations: RelocationSet,

    /// Profile-relative directories attributed to the mod
    pub tracked_directories: IndexSet<Utf8PathBuf>,

    /// Profile-relative destinations copied without a record
    pub untracked: Vec<Utf8PathBuf>,

    pub skipped: Vec<SkippedFile>,
}

impl InstallOutcome {
    pub fn was_skipped(&self, relative: &Utf8Path) -> bool {
        self.skipped.iter().any(|s| s.path == relative)
    }
}

/// Capability shared by every installer variant.
pub trait PackageInstaller: Send + Sync {
    /// Registry id, also stored in the state entry
    fn id(&self) -> &str;

    fn install(&self, args: &InstallArgs<'_>) -> Result<InstallOutcome, InstallError>;
}

/// Refuse an install whose tracked units overlap what another mod already owns.
///
/// Runs before anything is copied, so a conflicting install leaves the profile untouched.
pub(crate) fn ensure_unclaimed<'a>(
    state: &ProfileState,
    identity: &ModIdentity,
    paths: impl IntoIterator<Item = &'a Utf8Path>,
) -> Result<(), InstallError> {
    for path in paths {
        if let Some(owner) = state.owner_of(path, identity) {
            tracing::warn!("{} would take over {} from {}", identity.full_name, path, owner.mod_name);
            return Err(InstallError::OwnershipConflict {
                path: path.to_path_buf(),
                owner: owner.mod_name.clone(),
            });
        }
    }
    Ok(())
}

/// Copy `abs_src` to `dest_rel` under the profile, creating parent directories.
///
/// Returns the absolute destination.
pub(crate) fn place_file(
    fs: &dyn FsProvider,
    abs_src: &Utf8Path,
    profile: &Profile,
    dest_rel: &Utf8Path,
) -> Result<Utf8PathBuf, InstallError> {
    let abs_dest = profile.path_of_profile().join(dest_rel);

    if let Some(parent) = abs_dest.parent() {
        fs.mkdirs(parent).map_err(|e| InstallError::fs(parent, e))?;
    }

    fs.copy_file(abs_src, &abs_dest)
        .map_err(|e| InstallError::fs(&abs_dest, e))?;

    tracing::debug!("Copied {} -> {}", abs_src, dest_rel);
    Ok(abs_dest)
}
