//! Utility functions shared by the construct visitors.

use once_cell::sync::Lazy;
use regex::Regex;

static IDENTIFIER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][0-9A-Za-z_]*$").expect("valid identifier regex"));

static QUALIFIED_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][0-9A-Za-z_]*(\.[A-Za-z_][0-9A-Za-z_]*)*$")
        .expect("valid qualified name regex")
});

// `int`, `string[]`, `json<Person>`, `sys:Error`, `map[]`
static TYPE_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z_][0-9A-Za-z_]*:)?[A-Za-z_][0-9A-Za-z_]*(<[^<>]+>)?(\[\])*$")
        .expect("valid type name regex")
});

/// Stored leading fragment of an invocation: the callee followed by `(`,
/// optionally closed with `)`.
static INVOCATION_FRAGMENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<callee>([A-Za-z_][0-9A-Za-z_]*:)?[A-Za-z_][0-9A-Za-z_]*(\.[A-Za-z_][0-9A-Za-z_]*)*)\((?P<closed>\))?$",
    )
    .expect("valid invocation fragment regex")
});

pub fn is_identifier(value: &str) -> bool {
    IDENTIFIER_RE.is_match(value)
}

/// Dotted package path such as `ballerina.net.http`.
pub fn is_qualified_name(value: &str) -> bool {
    QUALIFIED_NAME_RE.is_match(value)
}

pub fn is_type_name(value: &str) -> bool {
    TYPE_NAME_RE.is_match(value)
}

/// Normalizes an invocation's stored leading fragment to `callee(`.
/// Returns `None` when the fragment is not `callee(` or `callee()`.
pub fn invocation_prefix(fragment: &str) -> Option<String> {
    INVOCATION_FRAGMENT_RE
        .captures(fragment)
        .and_then(|caps| caps.name("callee"))
        .map(|callee| format!("{}(", callee.as_str()))
}

/// Quotes `value` as a double-quoted string literal.
pub fn escape_string_literal(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 2);
    escaped.push('"');
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            _ => escaped.push(c),
        }
    }
    escaped.push('"');
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_normalize_invocation_fragments() {
        assert_eq!(invocation_prefix("foo("), Some("foo(".to_string()));
        assert_eq!(invocation_prefix("foo()"), Some("foo(".to_string()));
        assert_eq!(
            invocation_prefix("strings:toUpperCase("),
            Some("strings:toUpperCase(".to_string())
        );
        assert_eq!(invocation_prefix("foo"), None);
        assert_eq!(invocation_prefix("foo(a"), None);
        assert_eq!(invocation_prefix(""), None);
    }

    #[test]
    fn should_recognize_type_names() {
        assert!(is_type_name("int"));
        assert!(is_type_name("string[]"));
        assert!(is_type_name("json<Person>"));
        assert!(is_type_name("http:Request"));
        assert!(!is_type_name("int x"));
        assert!(!is_type_name(""));
    }

    #[test]
    fn should_escape_string_literals() {
        assert_eq!(escape_string_literal("a\"b\\c\n"), r#""a\"b\\c\n""#);
    }
}
