//! Space-delimited OAuth2 scope strings.

use std::collections::BTreeSet;

/// Split a space-delimited scope parameter; absent or blank yields an empty set
pub fn split_scope(scope: Option<&str>) -> BTreeSet<String> {
    scope
        .map(|s| s.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default()
}

/// Join a scope set into its sorted, space-delimited form
pub fn join_scope(scope: &BTreeSet<String>) -> String {
    scope.iter().map(String::as_str).collect::<Vec<_>>().join(" ")
}
