use std::sync::Arc;

use super::{
    InstallArgs, InstallError, InstallOutcome, PackageInstaller, SkipReason, SkippedFile, ensure_unclaimed,
    place_file,
};
use crate::models::RuleInstallerConfig;
use crate::services::file_tree::PackageFileTree;
use crate::services::fs_provider::FsProvider;
use crate::services::router::{self, RouteDecision};
use crate::services::state_file::StateFileWriter;
use crate::services::tracking::TrackingRecorder;

/// Installer driven entirely by a [`RuleInstallerConfig`].
///
/// Each package file is checked against the exclusion list, routed through the
/// rule tree and handed to the tracking recorder. Nothing is copied until the
/// recorded units are known not to overlap another mod's entry.
/// Unrouted files are skipped, not treated as failures.
pub struct RuleInstaller {
    id: String,
    config: Arc<RuleInstallerConfig>,
    fs: Arc<dyn FsProvider>,
    state: StateFileWriter,
}

impl RuleInstaller {
    pub fn new(
        id: impl Into<String>,
        config: Arc<RuleInstallerConfig>,
        fs: Arc<dyn FsProvider>,
        state: StateFileWriter,
    ) -> Self {
        Self {
            id: id.into(),
            config,
            fs,
            state,
        }
    }

    pub fn config(&self) -> &RuleInstallerConfig {
        &self.config
    }
}

impl PackageInstaller for RuleInstaller {
    fn id(&self) -> &str {
        &self.id
    }

    fn install(&self, args: &InstallArgs<'_>) -> Result<InstallOutcome, InstallError> {
        let profile = args.profile;
        let tree = PackageFileTree::build_from_location(args.package_path)?;

        tracing::info!(
            "Installing {} into profile {} with {} ({} package files)",
            args.mod_identity,
            profile.name(),
            self.id,
            tree.len()
        );

        let mut recorder = TrackingRecorder::new();
        let mut skipped = Vec::new();
        let mut planned = Vec::new();

        for (abs_src, rel) in tree.relative_files() {
            if self.config.is_excluded(rel.as_str()) {
                tracing::debug!("Excluded {}", rel);
                skipped.push(SkippedFile {
                    path: rel.to_path_buf(),
                    reason: SkipReason::Excluded,
                });
                continue;
            }

            let routed = match router::route(rel, &self.config.rules) {
                RouteDecision::Routed(routed) => routed,
                RouteDecision::Unrouted => {
                    tracing::warn!("No rule for {}, skipping", rel);
                    skipped.push(SkippedFile {
                        path: rel.to_path_buf(),
                        reason: SkipReason::Unrouted,
                    });
                    continue;
                }
            };

            recorder.record(abs_src, &routed);
            planned.push((abs_src, routed.destination()));
        }

        let state = self.state.load(profile)?;
        ensure_unclaimed(
            &state,
            args.mod_identity,
            recorder
                .tracked_directories()
                .iter()
                .map(|d| d.as_path())
                .chain(recorder.relocations().destinations()),
        )?;

        for (abs_src, destination) in &planned {
            place_file(self.fs.as_ref(), abs_src, profile, destination)?;
        }
        let copied = planned.len();

        let (relocations, tracked_directories, untracked) = recorder.into_parts();

        self.state.append(
            args.mod_identity,
            &self.id,
            &relocations,
            &tracked_directories,
            profile,
        )?;

        if !skipped.is_empty() {
            tracing::info!("{} package files were not installed", skipped.len());
        }

        Ok(InstallOutcome {
            copied,
            relocations,
            tracked_directories,
            untracked,
            skipped,
        })
    }
}
