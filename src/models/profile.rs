use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Directory holding profile-scoped bookkeeping
pub const STATE_DIR_NAME: &str = "_state";

/// File name of the persisted installation state inside [`STATE_DIR_NAME`]
pub const STATE_FILE_NAME: &str = "installation_state.yml";

/// A named, on-disk root for one isolated game installation's mod state.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Profile {
    name: String,
    root: Utf8PathBuf,
}

impl Profile {
    pub fn new(name: impl Into<String>, root: impl Into<Utf8PathBuf>) -> Self {
        Self {
            name: name.into(),
            root: root.into(),
        }
    }

    /// Profile named `name` living under the configured profiles directory.
    pub fn in_directory(profiles_dir: &Utf8Path, name: &str) -> Self {
        Self::new(name, profiles_dir.join(name))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Absolute root every relocation is resolved against.
    pub fn path_of_profile(&self) -> &Utf8Path {
        &self.root
    }

    pub fn state_dir(&self) -> Utf8PathBuf {
        self.root.join(STATE_DIR_NAME)
    }

    pub fn state_file_path(&self) -> Utf8PathBuf {
        self.state_dir().join(STATE_FILE_NAME)
    }
}

/// Identity of an installed mod.
///
/// State entries are keyed by `full_name` only, so installing another version of
/// the same package replaces whatever the previous version recorded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModIdentity {
    /// Package full name, e.g. `Author-ModName`
    pub full_name: String,
    pub version: String,
}

impl ModIdentity {
    pub fn new(full_name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            version: version.into(),
        }
    }

    pub fn state_key(&self) -> &str {
        &self.full_name
    }
}

impl fmt::Display for ModIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.full_name, self.version)
    }
}
