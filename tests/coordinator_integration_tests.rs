//! Integration tests for InstallCoordinator with install events
//!
//! These tests verify that the InstallCoordinator correctly:
//! - Emits install events in order
//! - Reports failures as events and errors
//! - Serializes concurrent installs into one profile without losing state entries
//! - Reverses installs through uninstall

use camino::{Utf8Path, Utf8PathBuf};
use modroute::services::LocalFs;
use modroute::{
    InstallCoordinator, InstallError, InstallEvent, InstallerRegistry, InstallerRulesConfig,
    ModIdentity, Profile, StateFileWriter, Uninstaller,
};
use std::fs;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use tempfile::TempDir;
use tokio::time::{Duration, timeout};

fn scratch() -> (TempDir, Utf8PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let root = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    (temp_dir, root)
}

fn package_with(root: &Utf8Path, name: &str, files: &[&str]) -> Utf8PathBuf {
    let package = root.join(name);
    for file in files {
        let path = package.join(file);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, file.as_bytes()).unwrap();
    }
    package
}

fn coordinator() -> Arc<InstallCoordinator> {
    let fs_provider = Arc::new(LocalFs);
    let registry = InstallerRegistry::from_config(
        &InstallerRulesConfig::default(),
        fs_provider.clone(),
        StateFileWriter::new(),
    );
    Arc::new(InstallCoordinator::new(
        Arc::new(registry),
        Uninstaller::new(fs_provider, StateFileWriter::new()),
    ))
}

async fn next_event(rx: &mut tokio::sync::broadcast::Receiver<InstallEvent>) -> InstallEvent {
    timeout(Duration::from_millis(500), rx.recv())
        .await
        .expect("Timeout waiting for event")
        .expect("Channel closed")
}

#[tokio::test]
async fn test_install_events_emitted() {
    let (_temp_dir, root) = scratch();
    let package = package_with(&root, "pkg", &["MyMod/main.lua", "README.md"]);
    let profile = Profile::new("Default", root.join("profile"));

    let coordinator = coordinator();
    let mut rx = coordinator.subscribe();

    coordinator
        .install(
            "shimloader-plugin",
            ModIdentity::new("Author-MyMod", "1.0.0"),
            package,
            profile,
        )
        .await
        .unwrap();

    let started = next_event(&mut rx).await;
    assert!(
        matches!(&started, InstallEvent::InstallStarted { installer, .. } if installer == "shimloader-plugin"),
        "Expected InstallStarted event, got: {:?}",
        started
    );

    let finished = next_event(&mut rx).await;
    assert_eq!(
        finished,
        InstallEvent::InstallFinished {
            profile: "Default".to_string(),
            mod_name: "Author-MyMod".to_string(),
            copied: 1,
            skipped: 1,
        }
    );
}

#[tokio::test]
async fn test_failed_install_emits_failure() {
    let (_temp_dir, root) = scratch();
    let profile = Profile::new("Default", root.join("profile"));

    let coordinator = coordinator();
    let mut rx = coordinator.subscribe();

    let result = coordinator
        .install(
            "shimloader-plugin",
            ModIdentity::new("Author-Missing", "1.0.0"),
            root.join("does-not-exist"),
            profile,
        )
        .await;

    assert!(matches!(result, Err(InstallError::FileSystem { .. })));

    let _started = next_event(&mut rx).await;
    let failed = next_event(&mut rx).await;
    assert!(matches!(failed, InstallEvent::InstallFailed { .. }));
    assert_eq!(
        coordinator.metrics().installs_failed.load(Ordering::Relaxed),
        1
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_installs_keep_every_entry() {
    let (_temp_dir, root) = scratch();
    let profile = Profile::new("Default", root.join("profile"));
    let coordinator = coordinator();

    let mut handles = Vec::new();
    for i in 0..8 {
        let name = format!("Mod{}", i);
        let package = package_with(&root, &format!("pkg{}", i), &[&format!("{}/main.lua", name)]);
        let coordinator = coordinator.clone();
        let profile = profile.clone();
        handles.push(tokio::spawn(async move {
            coordinator
                .install(
                    "shimloader-plugin",
                    ModIdentity::new(format!("Author-{}", name), "1.0.0"),
                    package,
                    profile,
                )
                .await
        }));
    }

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let state = StateFileWriter::new().load(&profile).unwrap();
    assert_eq!(state.mods.len(), 8);
}

#[tokio::test]
async fn test_uninstall_reverses_install() {
    let (_temp_dir, root) = scratch();
    let package = package_with(&root, "pkg", &["MyMod/main.lua", "loose.pak"]);
    let profile = Profile::new("Default", root.join("profile"));
    let identity = ModIdentity::new("Author-MyMod", "1.0.0");

    let coordinator = coordinator();
    coordinator
        .install("shimloader-plugin", identity.clone(), package, profile.clone())
        .await
        .unwrap();

    let mut rx = coordinator.subscribe();
    let outcome = coordinator
        .uninstall(identity.clone(), profile.clone())
        .await
        .unwrap();

    assert_eq!(outcome.removed_files, 1);
    assert_eq!(outcome.removed_directories, 1);
    assert!(!profile.path_of_profile().join("shimloader/pak/loose.pak").exists());
    assert!(!profile.path_of_profile().join("shimloader/mod/MyMod").exists());

    let event = next_event(&mut rx).await;
    assert!(matches!(event, InstallEvent::Uninstalled { removed_files: 1, .. }));
    assert!(StateFileWriter::new()
        .entries(&identity, &profile)
        .unwrap()
        .is_none());
}
