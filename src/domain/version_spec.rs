//! Canonical string encodings for version constraints and extras.
//!
//! The normalized version-spec string is the lookup key for vulnerability
//! caching and for cross-application aggregation, so two semantically equal
//! constraint sets must normalize identically regardless of input order.

use super::manifest::Constraint;

/// Normalize constraints into the canonical comma-joined form.
///
/// Each constraint becomes its `operator ++ version` token; tokens are
/// sorted by ordinary lexicographic order over the full token (not by the
/// version component alone, which makes mixed-operator sets order in
/// occasionally surprising but deterministic ways) and joined with commas.
/// Returns `None` for an empty constraint list ("any version").
pub fn normalize_version_specs(constraints: &[Constraint]) -> Option<String> {
    if constraints.is_empty() {
        return None;
    }
    let mut tokens: Vec<String> = constraints.iter().map(Constraint::token).collect();
    tokens.sort();
    Some(tokens.join(","))
}

/// Join extras with commas in their encountered order; `None` when empty.
pub fn normalize_extras(extras: &[String]) -> Option<String> {
    if extras.is_empty() {
        return None;
    }
    Some(extras.join(","))
}
