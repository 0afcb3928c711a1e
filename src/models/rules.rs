use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How files placed by a rule are recorded for later removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrackingMethod {
    /// Copied but never recorded. Cleanup belongs to whoever owns the directory.
    None,

    /// The first directory beneath the rule's route is attributed to the mod as a whole.
    SubdirTracked,
}

/// One destination subtree under the profile root.
///
/// Rules form an immutable tree: `sub_routes` are nested beneath `route` and are
/// always consulted before the rule itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingRule {
    /// Path segment(s) relative to the parent rule (or the profile root at the top level)
    pub route: Utf8PathBuf,

    /// Extensions claimed by this rule, with the leading dot (e.g. ".lua")
    #[serde(default)]
    pub default_file_extensions: Vec<String>,

    pub tracking_method: TrackingMethod,

    #[serde(default)]
    pub sub_routes: Vec<RoutingRule>,
}

/// Reasons a routing rule tree is rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    #[error("Rule route is empty")]
    EmptyRoute,

    #[error("Rule route must be relative: {0}")]
    AbsoluteRoute(Utf8PathBuf),

    #[error("Rule route may not leave the profile: {0}")]
    ParentTraversal(Utf8PathBuf),

    #[error("Extension {extension:?} on route {route} must start with '.'")]
    MalformedExtension { route: Utf8PathBuf, extension: String },
}

impl RoutingRule {
    pub fn new(route: impl Into<Utf8PathBuf>, extensions: &[&str], tracking_method: TrackingMethod) -> Self {
        Self {
            route: route.into(),
            default_file_extensions: extensions.iter().map(|e| e.to_string()).collect(),
            tracking_method,
            sub_routes: Vec::new(),
        }
    }

    /// Attach nested rules, keeping declaration order.
    pub fn with_sub_routes(mut self, sub_routes: Vec<RoutingRule>) -> Self {
        self.sub_routes = sub_routes;
        self
    }

    /// Whether `extension` (with leading dot) is claimed by this rule. Case-insensitive.
    pub fn claims_extension(&self, extension: &str) -> bool {
        self.default_file_extensions
            .iter()
            .any(|e| e.eq_ignore_ascii_case(extension))
    }

    /// Check this rule and all nested rules.
    pub fn validate(&self) -> Result<(), RuleError> {
        validate_route(&self.route)?;

        for extension in &self.default_file_extensions {
            if !extension.starts_with('.') || extension.len() < 2 {
                return Err(RuleError::MalformedExtension {
                    route: self.route.clone(),
                    extension: extension.clone(),
                });
            }
        }

        self.sub_routes.iter().try_for_each(RoutingRule::validate)
    }
}

fn validate_route(route: &Utf8Path) -> Result<(), RuleError> {
    if route.as_str().is_empty() {
        return Err(RuleError::EmptyRoute);
    }

    for component in route.components() {
        match component {
            Utf8Component::Normal(_) | Utf8Component::CurDir => {}
            Utf8Component::ParentDir => return Err(RuleError::ParentTraversal(route.to_path_buf())),
            Utf8Component::RootDir | Utf8Component::Prefix(_) => {
                return Err(RuleError::AbsoluteRoute(route.to_path_buf()));
            }
        }
    }

    Ok(())
}

/// Validate every rule in a top-level list.
pub fn validate_rules(rules: &[RoutingRule]) -> Result<(), RuleError> {
    rules.iter().try_for_each(RoutingRule::validate)
}
