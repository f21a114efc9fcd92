//! Route pattern compilation.
//!
//! # Responsibilities
//! - Split a path pattern into typed segments
//! - Recognize `:name`, `:name?` and `*`
//! - Normalize leading and trailing slashes per routing options
//!
//! # Design Decisions
//! - Compiled once at registration, never at request time
//! - The options active at compile time travel with the pattern, so matching
//!   never consults global state
//! - Only an empty parameter name is rejected; anything else is a literal

use std::sync::Arc;
use thiserror::Error;

/// Reserved parameter name under which a wildcard capture is stored.
pub const WILDCARD_PARAM: &str = "*";

/// Errors raised while compiling a route pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// A `:` component with nothing after it (or only `?`).
    #[error("empty parameter name in route pattern `{pattern}`")]
    EmptyParamName { pattern: String },
}

/// Options that shape compilation and later matching.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteOptions {
    /// When false, static segments compare ASCII case-insensitively.
    pub case_sensitive: bool,
    /// When true, `/foo` and `/foo/` are different routes.
    pub strict_routing: bool,
}

/// One compiled unit of a path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Literal text.
    Static(String),
    /// Named parameter capturing one segment.
    Param { name: Arc<str>, optional: bool },
    /// Captures the remainder of the path under `*`.
    Wildcard,
}

/// A compiled route pattern.
#[derive(Debug, Clone)]
pub struct Pattern {
    raw: String,
    segments: Vec<Segment>,
    has_optional_params: bool,
    has_wildcard: bool,
    trailing_slash: bool,
    options: RouteOptions,
    wildcard_name: Arc<str>,
}

impl Pattern {
    /// Compile a raw path pattern.
    pub fn compile(raw: &str, options: RouteOptions) -> Result<Self, CompileError> {
        let trailing_slash = options.strict_routing && raw.len() > 1 && raw.ends_with('/');

        let mut segments = Vec::new();
        for component in raw.split('/').filter(|c| !c.is_empty()) {
            let segment = if let Some(param) = component.strip_prefix(':') {
                let (name, optional) = match param.strip_suffix('?') {
                    Some(name) => (name, true),
                    None => (param, false),
                };
                if name.is_empty() {
                    return Err(CompileError::EmptyParamName {
                        pattern: raw.to_string(),
                    });
                }
                Segment::Param {
                    name: Arc::from(name),
                    optional,
                }
            } else if component == WILDCARD_PARAM {
                Segment::Wildcard
            } else {
                Segment::Static(component.to_string())
            };
            segments.push(segment);
        }

        let has_optional_params = segments
            .iter()
            .any(|s| matches!(s, Segment::Param { optional: true, .. }));
        let has_wildcard = segments.iter().any(|s| matches!(s, Segment::Wildcard));

        Ok(Self {
            raw: raw.to_string(),
            segments,
            has_optional_params,
            has_wildcard,
            trailing_slash,
            options,
            wildcard_name: Arc::from(WILDCARD_PARAM),
        })
    }

    /// The pattern exactly as registered.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn has_optional_params(&self) -> bool {
        self.has_optional_params
    }

    pub fn has_wildcard(&self) -> bool {
        self.has_wildcard
    }

    /// Whether the last segment is a wildcard.
    pub fn ends_with_wildcard(&self) -> bool {
        matches!(self.segments.last(), Some(Segment::Wildcard))
    }

    /// Whether a trailing slash is part of the pattern (strict routing only).
    pub fn trailing_slash(&self) -> bool {
        self.trailing_slash
    }

    pub fn options(&self) -> RouteOptions {
        self.options
    }

    pub(crate) fn wildcard_name(&self) -> Arc<str> {
        Arc::clone(&self.wildcard_name)
    }

    /// The pattern-owned spelling of a captured parameter name.
    pub(crate) fn param_name(&self, name: &str) -> &str {
        if name == WILDCARD_PARAM {
            return WILDCARD_PARAM;
        }
        self.segments
            .iter()
            .find_map(|s| match s {
                Segment::Param { name: n, .. } if &**n == name => Some(&**n),
                _ => None,
            })
            .unwrap_or("")
    }

    /// Compare a static segment against request text under this pattern's options.
    pub(crate) fn static_eq(&self, expected: &str, actual: &str) -> bool {
        if self.options.case_sensitive {
            expected == actual
        } else {
            expected.eq_ignore_ascii_case(actual)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(raw: &str) -> Pattern {
        Pattern::compile(raw, RouteOptions::default()).unwrap()
    }

    #[test]
    fn test_compile_mixed_segments() {
        let pattern = compile("/users/:id/files/:name?/*");
        assert_eq!(
            pattern.segments(),
            &[
                Segment::Static("users".into()),
                Segment::Param { name: "id".into(), optional: false },
                Segment::Static("files".into()),
                Segment::Param { name: "name".into(), optional: true },
                Segment::Wildcard,
            ]
        );
        assert!(pattern.has_optional_params());
        assert!(pattern.has_wildcard());
        assert!(pattern.ends_with_wildcard());
    }

    #[test]
    fn test_trailing_slash_normalized_unless_strict() {
        let loose = compile("/foo/");
        assert_eq!(loose.segments(), compile("/foo").segments());
        assert!(!loose.trailing_slash());

        let strict = RouteOptions { strict_routing: true, ..Default::default() };
        let with_slash = Pattern::compile("/foo/", strict).unwrap();
        let without = Pattern::compile("/foo", strict).unwrap();
        assert!(with_slash.trailing_slash());
        assert!(!without.trailing_slash());
    }

    #[test]
    fn test_root_and_empty_have_no_segments() {
        assert!(compile("/").segments().is_empty());
        assert!(compile("").segments().is_empty());
        assert_eq!(compile("users").segments(), compile("/users").segments());
    }

    #[test]
    fn test_empty_param_name_rejected() {
        for raw in ["/users/:", "/users/:?/x"] {
            let err = Pattern::compile(raw, RouteOptions::default()).unwrap_err();
            assert_eq!(err, CompileError::EmptyParamName { pattern: raw.to_string() });
        }
    }

    #[test]
    fn test_static_comparison_follows_case_option() {
        let insensitive = compile("/Users");
        assert!(insensitive.static_eq("Users", "uSeRs"));

        let sensitive = Pattern::compile(
            "/Users",
            RouteOptions { case_sensitive: true, ..Default::default() },
        )
        .unwrap();
        assert!(!sensitive.static_eq("Users", "users"));
        assert!(sensitive.static_eq("Users", "Users"));
    }
}
