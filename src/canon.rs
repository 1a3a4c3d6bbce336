//! Route and verb canonicalization
//!
//! Backend routes and frontend URLs are written in different dialects
//! (`{id:int}`, `${id}`, `v{version:apiVersion}`, leading slashes, mixed case).
//! Everything is folded into one comparable key space before matching:
//!
//! ```text
//! "/api/Products/{id:guid}"   ──► api/products/{id}
//! "api/products/${id}"        ──► api/products/{id}
//! "HttpGet" / "get" / "GET"   ──► GET
//! ```
//!
//! All functions here are pure and idempotent.

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// The literal prefix shared by most server routes.
pub const API_PREFIX: &str = "api/";

/// Version placeholder segment rewritten to a concrete version.
const VERSION_SEGMENT: &str = "v{version}";
const VERSION_LITERAL: &str = "v1";

struct Patterns {
    dollar_placeholder: Regex,
    typed_placeholder: Regex,
}

static PATTERNS: OnceLock<Patterns> = OnceLock::new();

fn patterns() -> &'static Patterns {
    PATTERNS.get_or_init(|| Patterns {
        // Any run of `$` directly before `{name` collapses away
        dollar_placeholder: Regex::new(r"\$+\{(\w+)").expect("valid placeholder pattern"),
        typed_placeholder: Regex::new(r"\{(\w+):[^{}]*\}").expect("valid typed pattern"),
    })
}

/// Canonicalize a raw route or URL into a comparable path.
///
/// 1. truncate at the first `"` or `)` (extraction noise)
/// 2. lowercase, strip leading/trailing `/`
/// 3. `${name}` → `{name}`
/// 4. `{name:type}` → `{name}`
/// 5. a `v{version}` segment → `v1`
///
/// ```
/// use surface_audit::canon::canonical_path;
/// assert_eq!(canonical_path("/api/Items/{id:int}"), "api/items/{id}");
/// assert_eq!(canonical_path("api/items/${id}"), "api/items/{id}");
/// assert_eq!(canonical_path(""), "");
/// ```
pub fn canonical_path(raw: &str) -> String {
    let cut = raw.find(['"', ')']).unwrap_or(raw.len());
    let lowered = raw[..cut].to_lowercase();
    let trimmed = lowered.trim_matches('/');

    let p = patterns();
    let undollared = p.dollar_placeholder.replace_all(trimmed, "{${1}");
    let untyped = p.typed_placeholder.replace_all(&undollared, "{${1}}");

    untyped
        .split('/')
        .map(|segment| {
            if segment == VERSION_SEGMENT {
                VERSION_LITERAL
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Normalize an HTTP verb token: uppercase, protocol tag stripped.
///
/// Unknown tokens pass through uppercased.
///
/// ```
/// use surface_audit::canon::normalize_verb;
/// assert_eq!(normalize_verb("HttpGet"), "GET");
/// assert_eq!(normalize_verb("post"), "POST");
/// ```
pub fn normalize_verb(raw: &str) -> String {
    let mut verb = raw.trim().to_uppercase();
    while let Some(rest) = verb.strip_prefix("HTTP") {
        verb = rest.trim_start().to_string();
    }
    verb
}

/// Ensure a canonical path sits under `api`.
///
/// Paths already starting with `api` are left alone (so `apiary/hives` keeps
/// its shape); the empty path becomes the degenerate `api`.
pub fn with_api_prefix(path: &str) -> String {
    if path.is_empty() {
        "api".to_string()
    } else if path.starts_with("api") {
        path.to_string()
    } else {
        format!("{}{}", API_PREFIX, path)
    }
}

/// A `VERB:path` key, the sole identity used to pair calls with endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalKey {
    verb: String,
    path: String,
}

impl CanonicalKey {
    /// Build a key from already-normalized parts.
    pub fn new(verb: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            verb: verb.into(),
            path: path.into(),
        }
    }

    /// Build a key from a raw verb and raw route, applying the full
    /// canonicalization and `api/` prefixing.
    pub fn from_raw(verb: &str, route: &str) -> Self {
        Self::new(
            normalize_verb(verb),
            with_api_prefix(&canonical_path(route)),
        )
    }

    pub fn verb(&self) -> &str {
        &self.verb
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// The alternate key with the leading `api/` removed, if there is one.
    pub fn without_api_prefix(&self) -> Option<Self> {
        self.path
            .strip_prefix(API_PREFIX)
            .map(|rest| Self::new(self.verb.clone(), rest))
    }
}

impl fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.verb, self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case("/api/products/{id}", "api/products/{id}")]
    #[case("api/products/${id}", "api/products/{id}")]
    #[case("/api/Products/{id:guid}/", "api/products/{id}")]
    #[case("/api/v{version:apiVersion}/orders", "api/v1/orders")]
    #[case("/api/v{version}/orders", "api/v1/orders")]
    #[case("/api/orders\")]\n[Produces(\"x\")", "api/orders")]
    #[case("/api/orders)", "api/orders")]
    #[case("", "")]
    #[case("/", "")]
    #[case("$${id}", "{id}")]
    #[case("${id:int}", "{id}")]
    fn test_canonical_path(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(canonical_path(raw), expected);
    }

    #[test]
    fn test_version_rewrite_only_whole_segment() {
        assert_eq!(canonical_path("api/xv{version}/a"), "api/xv{version}/a");
        assert_eq!(canonical_path("api/v1/a"), "api/v1/a");
    }

    #[test]
    fn test_placeholder_syntax_invariant() {
        let a = canonical_path("/items/${id}");
        let b = canonical_path("/items/{id}");
        let c = canonical_path("/items/{id:int}");
        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[rstest]
    #[case("get", "GET")]
    #[case("GET", "GET")]
    #[case("HttpGet", "GET")]
    #[case("HTTPDELETE", "DELETE")]
    #[case("httphttpPatch", "PATCH")]
    #[case(" put ", "PUT")]
    #[case("purge", "PURGE")]
    fn test_normalize_verb(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(normalize_verb(raw), expected);
    }

    #[rstest]
    #[case("", "api")]
    #[case("api", "api")]
    #[case("api/items", "api/items")]
    #[case("items", "api/items")]
    #[case("apiary/hives", "apiary/hives")]
    #[case("v1/api", "api/v1/api")]
    fn test_with_api_prefix(#[case] path: &str, #[case] expected: &str) {
        assert_eq!(with_api_prefix(path), expected);
    }

    #[test]
    fn test_key_display_and_fallback() {
        let key = CanonicalKey::from_raw("HttpGet", "/api/Widgets");
        assert_eq!(key.to_string(), "GET:api/widgets");

        let alt = key.without_api_prefix().unwrap();
        assert_eq!(alt.to_string(), "GET:widgets");

        let degenerate = CanonicalKey::from_raw("get", "");
        assert_eq!(degenerate.to_string(), "GET:api");
        assert!(degenerate.without_api_prefix().is_none());
    }

    #[test]
    fn test_fallback_strips_only_leading_prefix() {
        let key = CanonicalKey::new("GET", "api/api/items");
        assert_eq!(key.without_api_prefix().unwrap().path(), "api/items");
    }

    proptest! {
        #[test]
        fn prop_canonical_path_idempotent(raw in r#"[a-zA-Z0-9/${}:"()_.-]{0,40}"#) {
            let once = canonical_path(&raw);
            prop_assert_eq!(canonical_path(&once), once);
        }

        #[test]
        fn prop_route_like_inputs_idempotent(
            segs in prop::collection::vec(
                prop_oneof![
                    "[a-zA-Z]{1,8}",
                    "\\$\\{[a-zA-Z]{1,6}\\}",
                    "\\{[a-zA-Z]{1,6}(:[a-zA-Z]{1,6})?\\}",
                    Just("v{version}".to_string()),
                    Just("v{version:apiVersion}".to_string()),
                ],
                0..6,
            )
        ) {
            let raw = format!("/{}", segs.join("/"));
            let once = canonical_path(&raw);
            prop_assert_eq!(canonical_path(&once), once);
        }

        #[test]
        fn prop_normalize_verb_idempotent(raw in "[a-zA-Z ]{0,12}") {
            let once = normalize_verb(&raw);
            prop_assert_eq!(normalize_verb(&once), once.clone());
            prop_assert_eq!(normalize_verb(&raw.to_lowercase()), normalize_verb(&raw.to_uppercase()));
        }
    }
}
