use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexSet;

use super::router::RoutedFile;
use crate::models::{RelocationSet, TrackingMethod};

/// Bookkeeping unit chosen for one placed file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackedUnit {
    /// Copied, not recorded
    Untracked,

    /// Recorded as a single relocation
    File {
        source: Utf8PathBuf,
        destination: Utf8PathBuf,
    },

    /// Attributed through its containing subdirectory (profile-relative)
    Subdirectory(Utf8PathBuf),
}

/// Decide how a routed file is recorded.
///
/// For [`TrackingMethod::SubdirTracked`] the first directory beneath the rule's
/// route owns the file. A file sitting directly in the route has no such
/// directory and is recorded on its own.
pub fn tracked_unit(source: &Utf8Path, routed: &RoutedFile) -> TrackedUnit {
    match routed.tracking_method {
        TrackingMethod::None => TrackedUnit::Untracked,
        TrackingMethod::SubdirTracked => {
            let mut parts = routed.remainder.components();
            match (parts.next(), parts.next()) {
                (Some(first), Some(_)) => TrackedUnit::Subdirectory(routed.route.join(first)),
                _ => TrackedUnit::File {
                    source: source.to_path_buf(),
                    destination: routed.destination(),
                },
            }
        }
    }
}

/// Accumulates the tracked units of one install.
///
/// Many files under the same subdirectory collapse into a single entry.
#[derive(Debug, Clone, Default)]
pub struct TrackingRecorder {
    relocations: RelocationSet,
    tracked_directories: IndexSet<Utf8PathBuf>,
    untracked: Vec<Utf8PathBuf>,
}

impl TrackingRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a file copied from `source` to its routed destination.
    pub fn record(&mut self, source: &Utf8Path, routed: &RoutedFile) -> TrackedUnit {
        let unit = tracked_unit(source, routed);

        match &unit {
            TrackedUnit::Untracked => self.untracked.push(routed.destination()),
            TrackedUnit::File {
                source,
                destination,
            } => self.relocations.insert(source.clone(), destination.clone()),
            TrackedUnit::Subdirectory(dir) => {
                if self.tracked_directories.insert(dir.clone()) {
                    tracing::debug!("Tracking subdirectory {}", dir);
                }
            }
        }

        unit
    }

    pub fn relocations(&self) -> &RelocationSet {
        &self.relocations
    }

    pub fn tracked_directories(&self) -> &IndexSet<Utf8PathBuf> {
        &self.tracked_directories
    }

    /// Destinations that were copied without a record
    pub fn untracked(&self) -> &[Utf8PathBuf] {
        &self.untracked
    }

    pub fn into_parts(self) -> (RelocationSet, IndexSet<Utf8PathBuf>, Vec<Utf8PathBuf>) {
        (self.relocations, self.tracked_directories, self.untracked)
    }
}
