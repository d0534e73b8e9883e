//! npm version spec matching.
//!
//! Translates npm range syntax into `semver::VersionReq` alternatives. npm
//! and Cargo agree on `^`, `~` and partial versions; they differ on bare
//! versions (exact in npm, caret in Cargo), whitespace-separated comparator
//! sets, hyphen ranges, `x` wildcards and `||`.

use semver::{Version, VersionReq};

use crate::api::PackageMetadataResponse;

const OPERATORS: [&str; 7] = [">=", "<=", ">", "<", "=", "^", "~"];

/// Pick the version of `doc` that `spec` refers to.
///
/// Dist-tags and exact versions are looked up directly; ranges select the
/// highest satisfying version. Returns `None` if nothing matches or the
/// requested range cannot be parsed.
pub fn select_version(doc: &PackageMetadataResponse, spec: &str) -> Option<String> {
    let spec = spec.trim();

    let tag = if spec.is_empty() || spec == "*" { "latest" } else { spec };
    if let Some(version) = doc.dist_tags.get(tag) {
        return Some(version.clone());
    }

    let exact = spec.trim_start_matches(['=', 'v']);
    if doc.versions.contains_key(exact) {
        return Some(exact.to_string());
    }

    let alternatives = parse_range(spec)?;
    doc.versions
        .keys()
        .filter_map(|raw| Version::parse(raw).ok())
        .filter(|version| alternatives.iter().any(|req| req.matches(version)))
        .max()
        .map(|version| version.to_string())
}

/// Parse an npm range into `||` alternatives
pub fn parse_range(spec: &str) -> Option<Vec<VersionReq>> {
    spec.split("||")
        .map(|alternative| VersionReq::parse(&comparator_set(alternative.trim())).ok())
        .collect()
}

/// Rewrite one npm comparator set as a comma-separated Cargo requirement
fn comparator_set(set: &str) -> String {
    if set.is_empty() || is_wildcard(set) {
        return "*".to_string();
    }

    if let Some((low, high)) = set.split_once(" - ") {
        return format!(">={}, <={}", strip_wildcards(low.trim()), strip_wildcards(high.trim()));
    }

    let mut comparators = Vec::new();
    let mut pending_operator: Option<&str> = None;

    for token in set.split_whitespace() {
        if OPERATORS.contains(&token) {
            pending_operator = Some(token);
            continue;
        }

        let (operator, version) = match pending_operator.take() {
            Some(operator) => (operator, token),
            None => split_operator(token),
        };

        let version = strip_wildcards(version.trim_start_matches('v'));
        if version == "*" {
            comparators.push("*".to_string());
        } else if operator.is_empty() {
            // A bare npm version is exact (partials become ranges under `=`)
            comparators.push(format!("={}", version));
        } else {
            comparators.push(format!("{}{}", operator, version));
        }
    }

    comparators.join(", ")
}

fn split_operator(token: &str) -> (&str, &str) {
    OPERATORS
        .iter()
        .find(|operator| token.starts_with(**operator))
        .map(|operator| (*operator, &token[operator.len()..]))
        .unwrap_or(("", token))
}

fn is_wildcard(part: &str) -> bool {
    matches!(part, "*" | "x" | "X")
}

/// `1.2.x` -> `1.2`, `1.x.x` -> `1`, `x` -> `*`
fn strip_wildcards(version: &str) -> String {
    let parts: Vec<&str> = version
        .split('.')
        .take_while(|part| !is_wildcard(part))
        .collect();

    if parts.is_empty() {
        "*".to_string()
    } else {
        parts.join(".")
    }
}
