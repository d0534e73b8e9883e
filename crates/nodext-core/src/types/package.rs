//! Package name helpers.

/// A package name as it appears under `node_modules` (e.g. `lodash`, `@types/node`)
pub type PackageName = String;

/// Strip the version from a `name@version` token.
///
/// The split happens at the last `@` that is not the leading scope marker, so
/// `@scope/pkg@1.0.0` yields `@scope/pkg`. Tokens without a version are
/// returned unchanged.
pub fn name_from_token(token: &str) -> &str {
    match token.rfind('@') {
        Some(index) if index > 0 => &token[..index],
        _ => token,
    }
}

/// Check if this is a scoped package name (`@scope/name`)
pub fn is_scoped(name: &str) -> bool {
    name.starts_with('@') && name.contains('/')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_from_token() {
        assert_eq!(name_from_token("lodash@4.17.21"), "lodash");
        assert_eq!(name_from_token("@types/node@20.1.0"), "@types/node");
        assert_eq!(name_from_token("lodash"), "lodash");
        assert_eq!(name_from_token("@types/node"), "@types/node");
        assert_eq!(name_from_token(""), "");
    }

    #[test]
    fn test_is_scoped() {
        assert!(is_scoped("@aws-sdk/client-s3"));
        assert!(!is_scoped("aws-sdk"));
        assert!(!is_scoped("@broken"));
    }
}
