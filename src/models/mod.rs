//! Data models for modroute.
//!
//! This module contains the plain data shared by the installers and the state file:
//! - [`RoutingRule`] / [`TrackingMethod`]: the declarative rule tree that decides where package files land
//! - [`RuleInstallerConfig`] / [`InstallerRulesConfig`]: named rule sets loaded from `Installers.yaml`
//! - [`Settings`]: application settings loaded from `Settings.yaml`
//! - [`Profile`] / [`ModIdentity`]: the install destination and the key for state entries
//! - [`RelocationSet`], [`ModStateEntry`], [`ProfileState`]: what an install copied and where
//!
//! # Architecture Note
//!
//! The models are designed to be:
//! - **Serializable**: config and state structs derive `Serialize`/`Deserialize` for YAML persistence
//! - **Immutable once built**: rule trees are shared read-only across installs

pub mod config;
pub mod profile;
pub mod rules;
pub mod state;

pub use config::{InstallerRulesConfig, RuleInstallerConfig, SHIMLOADER_PLUGIN_INSTALLER, Settings};
pub use profile::{ModIdentity, Profile};
pub use rules::{RoutingRule, RuleError, TrackingMethod};
pub use state::{ModStateEntry, ProfileState, RelocationRecord, RelocationSet};
