use camino::{Utf8Path, Utf8PathBuf};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use super::ModIdentity;

/// One copy that happened during an install.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelocationRecord {
    /// Absolute path of the file inside the extracted package
    pub source: Utf8PathBuf,

    /// Destination relative to the profile root
    pub destination: Utf8PathBuf,
}

/// Relocations produced by a single install, keyed by source path.
///
/// A source maps to exactly one destination; inserting the same source again
/// replaces the earlier destination while keeping its original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelocationSet {
    entries: IndexMap<Utf8PathBuf, Utf8PathBuf>,
}

impl RelocationSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, source: impl Into<Utf8PathBuf>, destination: impl Into<Utf8PathBuf>) {
        self.entries.insert(source.into(), destination.into());
    }

    pub fn destination_of(&self, source: &Utf8Path) -> Option<&Utf8Path> {
        self.entries.get(source).map(Utf8PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Utf8Path, &Utf8Path)> {
        self.entries
            .iter()
            .map(|(src, dst)| (src.as_path(), dst.as_path()))
    }

    pub fn destinations(&self) -> impl Iterator<Item = &Utf8Path> {
        self.entries.values().map(Utf8PathBuf::as_path)
    }

    pub fn to_records(&self) -> Vec<RelocationRecord> {
        self.entries
            .iter()
            .map(|(source, destination)| RelocationRecord {
                source: source.clone(),
                destination: destination.clone(),
            })
            .collect()
    }
}

/// What a single mod placed into a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModStateEntry {
    pub mod_name: String,
    pub version: String,

    /// Id of the installer that produced this entry
    #[serde(default)]
    pub installer: String,

    #[serde(default)]
    pub relocations: Vec<RelocationRecord>,

    /// Profile-relative directories wholly owned by this mod
    #[serde(default)]
    pub tracked_directories: Vec<Utf8PathBuf>,
}

impl ModStateEntry {
    pub fn new(
        identity: &ModIdentity,
        installer: &str,
        relocations: &RelocationSet,
        tracked_directories: &IndexSet<Utf8PathBuf>,
    ) -> Self {
        Self {
            mod_name: identity.full_name.clone(),
            version: identity.version.clone(),
            installer: installer.to_string(),
            relocations: relocations.to_records(),
            tracked_directories: tracked_directories.iter().cloned().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.relocations.is_empty() && self.tracked_directories.is_empty()
    }

    /// Whether `path` (profile-relative) overlaps anything this entry owns.
    ///
    /// A path overlaps a tracked directory when either one contains the other,
    /// and a relocation when it is the relocated file or a directory above it.
    pub fn claims(&self, path: &Utf8Path) -> bool {
        self.tracked_directories
            .iter()
            .any(|dir| path.starts_with(dir) || dir.starts_with(path))
            || self
                .relocations
                .iter()
                .any(|r| r.destination.starts_with(path) || path.starts_with(&r.destination))
    }
}

/// Contents of a profile's `installation_state.yml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileState {
    #[serde(default)]
    pub mods: IndexMap<String, ModStateEntry>,
}

impl ProfileState {
    /// Insert or replace the entry for the mod's full name.
    pub fn upsert(&mut self, entry: ModStateEntry) -> Option<ModStateEntry> {
        self.mods.insert(entry.mod_name.clone(), entry)
    }

    pub fn entry(&self, identity: &ModIdentity) -> Option<&ModStateEntry> {
        self.mods.get(identity.state_key())
    }

    pub fn remove(&mut self, identity: &ModIdentity) -> Option<ModStateEntry> {
        self.mods.shift_remove(identity.state_key())
    }

    /// Entry of another mod that already owns `path`. The mod's own entry is ignored,
    /// so reinstalling over itself never conflicts.
    pub fn owner_of(&self, path: &Utf8Path, identity: &ModIdentity) -> Option<&ModStateEntry> {
        self.mods
            .iter()
            .filter(|(key, _)| key.as_str() != identity.state_key())
            .map(|(_, entry)| entry)
            .find(|entry| entry.claims(path))
    }
}
