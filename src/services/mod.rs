//! Services module - Pure logic for placing mod package files into profiles.
//!
//! The services are **framework-agnostic** and have no knowledge of any UI. All
//! disk access from installers goes through [`FsProvider`], which keeps them testable
//! with injected failures.
//!
//! # Components
//!
//! - [`PackageFileTree`]: read-only recursive listing of an extracted package
//! - [`router`]: decides, per package file, which [`RoutingRule`](crate::models::RoutingRule)
//!   owns it and where it lands under the profile root (or that nothing does)
//! - [`TrackingRecorder`]: turns each placed file into a bookkeeping unit:
//!   untracked, a flat relocation, or a tracked subdirectory
//! - [`StateFileWriter`]: persists what each mod placed into `_state/installation_state.yml`
//! - [`installers`]: the [`PackageInstaller`] capability, the shimloader fixed-target
//!   copier, the generic rule installer and the registry that selects between them
//! - [`Uninstaller`]: reverses a mod's recorded state entry
//!
//! # Install Flow
//!
//! 1. Enumerate the package with [`PackageFileTree::build_from_location`]
//! 2. Route each file (rule installers) or expand the fixed target list (shimloader)
//! 3. Refuse the install if a tracked unit overlaps another mod's state entry
//! 4. Ensure destination directories and copy bytes, aborting on the first failure
//! 5. Write the state entry for the mod in one go
//!
//! # Usage Example
//!
//! ```ignore
//! use modroute::services::{InstallArgs, InstallerRegistry, LocalFs, StateFileWriter};
//!
//! let registry = InstallerRegistry::from_config(&rules, Arc::new(LocalFs), StateFileWriter::new());
//! let installer = registry.get("shimloader-plugin")?;
//! let outcome = installer.install(&InstallArgs {
//!     mod_identity: &identity,
//!     package_path: &package_dir,
//!     profile: &profile,
//! })?;
//! ```

pub mod file_tree;
pub mod fs_provider;
pub mod installers;
pub mod router;
pub mod state_file;
pub mod tracking;
pub mod uninstall;

pub use file_tree::PackageFileTree;
pub use fs_provider::{FsProvider, LocalFs};
pub use installers::{
    InstallArgs, InstallError, InstallOutcome, InstallerRegistry, PackageInstaller, RuleInstaller,
    ShimloaderInstaller, SkipReason, SkippedFile,
};
pub use router::{MatchKind, RouteDecision, RoutedFile};
pub use state_file::{StateFileError, StateFileWriter};
pub use tracking::{TrackedUnit, TrackingRecorder};
pub use uninstall::{UninstallOutcome, Uninstaller};
