// modroute - Rule-driven placement and tracking of mod package files in profiles
//
// This is the library crate containing the routing engine, installers and the
// per-profile state file. Frontends drive it through InstallCoordinator.

pub mod config;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod state;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use metrics::Metrics;
pub use models::{
    InstallerRulesConfig, ModIdentity, ModStateEntry, Profile, ProfileState, RoutingRule,
    RuleInstallerConfig, Settings, TrackingMethod,
};
pub use services::{InstallError, InstallOutcome, InstallerRegistry, LocalFs, StateFileWriter, Uninstaller};
pub use state::{InstallCoordinator, InstallEvent};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
