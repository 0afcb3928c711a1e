//! Path routing: decides where a package file lands under a profile.
//!
//! Matching is a pure function over `(relative path, rule tree)` and runs in two
//! passes rather than a single depth-first walk that accepts either kind of match
//! at each rule. The first pass matches by layout only: a file whose package path
//! already lies under some rule's full route (e.g. `shimloader/pak/X/a.pak`) goes
//! there, even when an earlier sibling claims its extension. So
//! `shimloader/pak/X/odd.lua` lands under `shimloader/pak`, not `shimloader/mod`.
//! Only if no route matches by layout does the second pass match by extension.
//! Within each pass the tree is walked depth-first with sub-routes ahead of their
//! parent and siblings in declaration order. The first hit wins.

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};

use crate::models::{RoutingRule, TrackingMethod};

/// How a file was matched to its rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// The file's package path lies under the rule's route
    Layout,
    /// The file's extension is claimed by the rule
    Extension,
}

/// A file that matched a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutedFile {
    /// Full route of the matched rule, relative to the profile root
    pub route: Utf8PathBuf,

    /// Path kept beneath `route`
    pub remainder: Utf8PathBuf,

    pub tracking_method: TrackingMethod,
    pub matched_by: MatchKind,
}

impl RoutedFile {
    /// Destination relative to the profile root.
    pub fn destination(&self) -> Utf8PathBuf {
        self.route.join(&self.remainder)
    }
}

/// Outcome of routing one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    Routed(RoutedFile),
    /// No rule claims the file; it is left out of the install
    Unrouted,
}

impl RouteDecision {
    pub fn is_unrouted(&self) -> bool {
        matches!(self, RouteDecision::Unrouted)
    }

    pub fn routed(self) -> Option<RoutedFile> {
        match self {
            RouteDecision::Routed(file) => Some(file),
            RouteDecision::Unrouted => None,
        }
    }
}

/// Route a package-relative file through `rules`.
pub fn route(file: &Utf8Path, rules: &[RoutingRule]) -> RouteDecision {
    let base = Utf8Path::new("");

    if let Some(hit) = match_layout(file, rules, base) {
        return RouteDecision::Routed(hit);
    }

    if let Some(extension) = file.extension() {
        let extension = format!(".{extension}");
        if let Some(hit) = match_extension(file, &extension, rules, base) {
            return RouteDecision::Routed(hit);
        }
    }

    RouteDecision::Unrouted
}

fn match_layout(file: &Utf8Path, rules: &[RoutingRule], parent: &Utf8Path) -> Option<RoutedFile> {
    for rule in rules {
        let full_route = parent.join(&rule.route);

        if let Some(hit) = match_layout(file, &rule.sub_routes, &full_route) {
            return Some(hit);
        }

        if let Some(remainder) = strip_route(file, &full_route) {
            return Some(RoutedFile {
                route: full_route,
                remainder,
                tracking_method: rule.tracking_method,
                matched_by: MatchKind::Layout,
            });
        }
    }

    None
}

fn match_extension(
    file: &Utf8Path,
    extension: &str,
    rules: &[RoutingRule],
    parent: &Utf8Path,
) -> Option<RoutedFile> {
    for rule in rules {
        let full_route = parent.join(&rule.route);

        if let Some(hit) = match_extension(file, extension, &rule.sub_routes, &full_route) {
            return Some(hit);
        }

        if rule.claims_extension(extension) {
            return Some(RoutedFile {
                route: full_route,
                remainder: file.to_path_buf(),
                tracking_method: rule.tracking_method,
                matched_by: MatchKind::Extension,
            });
        }
    }

    None
}

/// Remainder of `file` beneath `route`, comparing segments case-insensitively.
///
/// `None` unless `file` lies strictly below `route`.
fn strip_route(file: &Utf8Path, route: &Utf8Path) -> Option<Utf8PathBuf> {
    let mut file_parts = normal_components(file);

    for route_part in normal_components(route) {
        match file_parts.next() {
            Some(part) if part.eq_ignore_ascii_case(route_part) => {}
            _ => return None,
        }
    }

    let remainder: Utf8PathBuf = file_parts.collect();
    if remainder.as_str().is_empty() {
        None
    } else {
        Some(remainder)
    }
}

fn normal_components(path: &Utf8Path) -> impl Iterator<Item = &str> {
    path.components().filter_map(|c| match c {
        Utf8Component::Normal(part) => Some(part),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RuleInstallerConfig;
    use proptest::prelude::*;

    fn shimloader_rules() -> Vec<RoutingRule> {
        RuleInstallerConfig::shimloader_plugin().rules
    }

    fn destination(file: &str) -> Option<String> {
        route(Utf8Path::new(file), &shimloader_rules())
            .routed()
            .map(|r| r.destination().into_string())
    }

    #[test]
    fn test_extension_match_preserves_structure() {
        assert_eq!(
            destination("MyMod/scripts/main.lua").as_deref(),
            Some("shimloader/mod/MyMod/scripts/main.lua")
        );
        assert_eq!(
            destination("Content/Paks/thing.pak").as_deref(),
            Some("shimloader/pak/Content/Paks/thing.pak")
        );
    }

    #[test]
    fn test_sub_route_wins_over_parent() {
        let decision = route(Utf8Path::new("shimloader/mod/dll/X/hook.dll"), &shimloader_rules());
        let routed = decision.routed().unwrap();

        assert_eq!(routed.route, "shimloader/mod/dll");
        assert_eq!(routed.remainder, "X/hook.dll");
        assert_eq!(routed.matched_by, MatchKind::Layout);
    }

    #[test]
    fn test_sub_route_extension_wins_over_parent_layout_default() {
        // .dll at the package root: the dll sub-route is consulted before the parent
        assert_eq!(destination("hook.dll").as_deref(), Some("shimloader/mod/dll/hook.dll"));
    }

    #[test]
    fn test_layout_beats_extension_of_earlier_sibling() {
        // .lua is claimed by shimloader/mod, but the package put it under shimloader/pak
        let routed = route(Utf8Path::new("shimloader/pak/X/odd.lua"), &shimloader_rules())
            .routed()
            .unwrap();

        assert_eq!(routed.route, "shimloader/pak");
        assert_eq!(routed.remainder, "X/odd.lua");
    }

    #[test]
    fn test_layout_match_is_case_insensitive() {
        assert_eq!(
            destination("Shimloader/Mod/X/a.lua").as_deref(),
            Some("shimloader/mod/X/a.lua")
        );
    }

    #[test]
    fn test_unmatched_file_is_unrouted() {
        assert!(route(Utf8Path::new("MyMod/enabled.txt"), &shimloader_rules()).is_unrouted());
        assert!(route(Utf8Path::new("no_extension"), &shimloader_rules()).is_unrouted());
    }

    #[test]
    fn test_route_directory_itself_is_not_a_layout_match() {
        assert_eq!(strip_route(Utf8Path::new("shimloader/mod"), Utf8Path::new("shimloader/mod")), None);
        assert_eq!(strip_route(Utf8Path::new("shimloader/modx/a"), Utf8Path::new("shimloader/mod")), None);
    }

    #[test]
    fn test_tracking_method_comes_from_matched_rule() {
        let cfg = route(Utf8Path::new("settings.cfg"), &shimloader_rules()).routed().unwrap();
        assert_eq!(cfg.tracking_method, TrackingMethod::None);

        let pak = route(Utf8Path::new("a.pak"), &shimloader_rules()).routed().unwrap();
        assert_eq!(pak.tracking_method, TrackingMethod::SubdirTracked);
    }

    #[test]
    fn test_siblings_tried_in_declaration_order() {
        let rules = vec![
            RoutingRule::new("first", &[".dat"], TrackingMethod::None),
            RoutingRule::new("second", &[".dat"], TrackingMethod::SubdirTracked),
        ];

        let routed = route(Utf8Path::new("x.dat"), &rules).routed().unwrap();
        assert_eq!(routed.route, "first");
    }

    proptest! {
        #[test]
        fn prop_pak_files_route_under_pak(
            dirs in proptest::collection::vec("[a-z]{1,8}", 0..3),
            stem in "[a-z]{1,8}",
        ) {
            let mut rel = Utf8PathBuf::new();
            for dir in &dirs {
                rel.push(dir);
            }
            rel.push(format!("{stem}.pak"));

            let routed = route(&rel, &shimloader_rules()).routed().unwrap();
            prop_assert_eq!(routed.destination(), Utf8PathBuf::from("shimloader/pak").join(&rel));
        }

        #[test]
        fn prop_txt_files_never_route(
            dirs in proptest::collection::vec("[a-z]{1,8}", 0..3),
            stem in "[a-z]{1,8}",
        ) {
            let mut rel = Utf8PathBuf::new();
            for dir in &dirs {
                rel.push(dir);
            }
            rel.push(format!("{stem}.txt"));

            prop_assert!(route(&rel, &shimloader_rules()).is_unrouted());
        }
    }
}
