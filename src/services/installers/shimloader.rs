use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexSet;
use std::sync::Arc;

use super::{InstallArgs, InstallError, InstallOutcome, PackageInstaller, ensure_unclaimed, place_file};
use crate::models::RelocationSet;
use crate::services::file_tree::PackageFileTree;
use crate::services::fs_provider::FsProvider;
use crate::services::state_file::StateFileWriter;

/// Registry id of the shimloader bootstrap installer
pub const SHIMLOADER_INSTALLER: &str = "shimloader";

/// Loader files that must land at exact locations, `(package-relative, profile-relative)`
pub const FIXED_TARGETS: [(&str, &str); 3] = [
    ("dwmapi.dll", "dwmapi.dll"),
    ("UE4SS/ue4ss.dll", "ue4ss.dll"),
    ("UE4SS/UE4SS-settings.ini", "UE4SS-settings.ini"),
];

/// Package directory whose contents are mirrored into [`MODS_DEST_DIR`]
pub const MODS_SOURCE_DIR: &str = "UE4SS/Mods";
pub const MODS_DEST_DIR: &str = "shimloader/mod";

/// Must exist after install; the loader refuses to start without it
pub const CONFIG_DIR: &str = "shimloader/cfg";

/// Installs the unreal-shimloader package itself.
///
/// The bootstrap layout doesn't fit the rule router: three files go to fixed
/// locations and the bundled UE4SS mods are mirrored under `shimloader/mod`.
pub struct ShimloaderInstaller {
    fs: Arc<dyn FsProvider>,
    state: StateFileWriter,
}

impl ShimloaderInstaller {
    pub fn new(fs: Arc<dyn FsProvider>, state: StateFileWriter) -> Self {
        Self { fs, state }
    }

    /// Every copy this package needs, fixed targets first.
    pub fn plan_targets(&self, package_path: &Utf8Path) -> Result<Vec<(Utf8PathBuf, Utf8PathBuf)>, InstallError> {
        let mut targets: Vec<(Utf8PathBuf, Utf8PathBuf)> = FIXED_TARGETS
            .iter()
            .map(|(src, dst)| (Utf8PathBuf::from(*src), Utf8PathBuf::from(*dst)))
            .collect();

        let mods_tree = PackageFileTree::build_from_location(&package_path.join(MODS_SOURCE_DIR))?;

        for (_, rel) in mods_tree.relative_files() {
            targets.push((
                Utf8Path::new(MODS_SOURCE_DIR).join(rel),
                Utf8Path::new(MODS_DEST_DIR).join(rel),
            ));
        }

        Ok(targets)
    }
}

impl PackageInstaller for ShimloaderInstaller {
    fn id(&self) -> &str {
        SHIMLOADER_INSTALLER
    }

    fn install(&self, args: &InstallArgs<'_>) -> Result<InstallOutcome, InstallError> {
        let profile = args.profile;
        let targets = self.plan_targets(args.package_path)?;

        tracing::info!(
            "Installing {} into profile {} ({} targets)",
            args.mod_identity,
            profile.name(),
            targets.len()
        );

        let state = self.state.load(profile)?;
        ensure_unclaimed(&state, args.mod_identity, targets.iter().map(|(_, dst)| dst.as_path()))?;

        let mut relocations = RelocationSet::new();

        for (rel_src, rel_dst) in &targets {
            let abs_src = args.package_path.join(rel_src);
            if !self.fs.exists(&abs_src) {
                return Err(InstallError::SourceMissing(abs_src));
            }

            place_file(self.fs.as_ref(), &abs_src, profile, rel_dst)?;
            relocations.insert(abs_src, rel_dst.clone());
        }

        let config_dir = profile.path_of_profile().join(CONFIG_DIR);
        if !self.fs.exists(&config_dir) {
            self.fs
                .mkdirs(&config_dir)
                .map_err(|e| InstallError::fs(&config_dir, e))?;
        }

        let tracked_directories = IndexSet::new();
        self.state.append(
            args.mod_identity,
            self.id(),
            &relocations,
            &tracked_directories,
            profile,
        )?;

        Ok(InstallOutcome {
            copied: relocations.len(),
            relocations,
            tracked_directories,
            untracked: Vec::new(),
            skipped: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ModIdentity, Profile};
    use crate::services::fs_provider::{LocalFs, MockFsProvider};
    use std::fs;
    use std::io;
    use tempfile::TempDir;

    fn write(path: &Utf8Path, contents: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn create_package(root: &Utf8Path) {
        write(&root.join("dwmapi.dll"), "dwmapi");
        write(&root.join("UE4SS/ue4ss.dll"), "ue4ss");
        write(&root.join("UE4SS/UE4SS-settings.ini"), "[General]");
        write(&root.join("UE4SS/Mods/X/a.lua"), "print('a')");
    }

    fn scratch() -> (TempDir, Utf8PathBuf, Profile) {
        let temp_dir = TempDir::new().unwrap();
        let root = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        let package = root.join("package");
        let profile = Profile::new("Default", root.join("profile"));
        (temp_dir, package, profile)
    }

    #[test]
    fn test_plan_targets_lists_fixed_then_mods() {
        let (_temp_dir, package, _profile) = scratch();
        create_package(&package);

        let installer = ShimloaderInstaller::new(Arc::new(LocalFs), StateFileWriter::new());
        let targets = installer.plan_targets(&package).unwrap();

        assert_eq!(targets.len(), 4);
        assert_eq!(targets[0].1, "dwmapi.dll");
        assert_eq!(targets[3], ("UE4SS/Mods/X/a.lua".into(), "shimloader/mod/X/a.lua".into()));
    }

    #[test]
    fn test_missing_mods_directory_fails_before_copying() {
        let (_temp_dir, package, profile) = scratch();
        write(&package.join("dwmapi.dll"), "dwmapi");

        let mut mock = MockFsProvider::new();
        mock.expect_copy_file().never();

        let installer = ShimloaderInstaller::new(Arc::new(mock), StateFileWriter::new());
        let identity = ModIdentity::new("Thunderstore-unreal_shimloader", "1.0.0");
        let args = InstallArgs {
            mod_identity: &identity,
            package_path: &package,
            profile: &profile,
        };

        let err = installer.install(&args).unwrap_err();
        assert!(matches!(err, InstallError::FileSystem { .. }));
    }

    #[test]
    fn test_missing_fixed_source_is_source_missing() {
        let (_temp_dir, package, profile) = scratch();
        create_package(&package);
        fs::remove_file(package.join("UE4SS/ue4ss.dll")).unwrap();

        let installer = ShimloaderInstaller::new(Arc::new(LocalFs), StateFileWriter::new());
        let identity = ModIdentity::new("Thunderstore-unreal_shimloader", "1.0.0");
        let args = InstallArgs {
            mod_identity: &identity,
            package_path: &package,
            profile: &profile,
        };

        match installer.install(&args) {
            Err(InstallError::SourceMissing(path)) => assert!(path.ends_with("UE4SS/ue4ss.dll")),
            other => panic!("expected SourceMissing, got {:?}", other),
        }

        // First target was copied, nothing recorded
        assert!(profile.path_of_profile().join("dwmapi.dll").exists());
        assert!(!profile.state_file_path().exists());
    }

    #[test]
    fn test_copy_failure_aborts_without_state_write() {
        let (_temp_dir, package, profile) = scratch();
        create_package(&package);

        let mut mock = MockFsProvider::new();
        mock.expect_exists().returning(|_| true);
        mock.expect_mkdirs().returning(|_| Ok(()));
        let mut calls = 0;
        mock.expect_copy_file().times(2).returning(move |_, _| {
            calls += 1;
            if calls == 2 {
                Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
            } else {
                Ok(())
            }
        });

        let installer = ShimloaderInstaller::new(Arc::new(mock), StateFileWriter::new());
        let identity = ModIdentity::new("Thunderstore-unreal_shimloader", "1.0.0");
        let args = InstallArgs {
            mod_identity: &identity,
            package_path: &package,
            profile: &profile,
        };

        let err = installer.install(&args).unwrap_err();
        match err {
            InstallError::FileSystem { path, source } => {
                assert!(path.ends_with("ue4ss.dll"));
                assert_eq!(source.kind(), io::ErrorKind::PermissionDenied);
            }
            other => panic!("expected FileSystem error, got {:?}", other),
        }
        assert!(!profile.state_file_path().exists());
    }

    #[test]
    fn test_config_dir_created_only_when_absent() {
        let (_temp_dir, package, profile) = scratch();
        create_package(&package);

        let cfg = profile.path_of_profile().join(CONFIG_DIR);
        let mut mock = MockFsProvider::new();
        let cfg_for_exists = cfg.clone();
        mock.expect_exists()
            .returning(move |p| p != cfg_for_exists.as_path());
        mock.expect_mkdirs()
            .withf(|p| p.ends_with(CONFIG_DIR))
            .times(1)
            .returning(|_| Ok(()));
        mock.expect_mkdirs()
            .withf(|p| !p.ends_with(CONFIG_DIR))
            .returning(|_| Ok(()));
        mock.expect_copy_file().times(4).returning(|_, _| Ok(()));

        let installer = ShimloaderInstaller::new(Arc::new(mock), StateFileWriter::new());
        let identity = ModIdentity::new("Thunderstore-unreal_shimloader", "1.0.0");
        let args = InstallArgs {
            mod_identity: &identity,
            package_path: &package,
            profile: &profile,
        };

        let outcome = installer.install(&args).unwrap();
        assert_eq!(outcome.copied, 4);
    }
}
