//! Element matchers.
//!
//! A [`Matcher`] is an immutable predicate over a [`UIElement`] snapshot.
//! Identifier, label and value patterns accept glob wildcards (`*` matches
//! any run of characters, `?` matches one character); patterns without
//! wildcards compare exactly.
//!
//! ```
//! use scrolltap_core::matcher::Matcher;
//!
//! let row = Matcher::id("row-*").and(Matcher::element_type("Cell"));
//! assert_eq!(row.to_string(), r#"id("row-*") && type("Cell")"#);
//! ```

use std::fmt;

use crate::element::UIElement;

/// Predicate identifying a UI element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Matcher {
    /// Accessibility identifier, glob pattern.
    Id(String),
    /// Accessibility label, glob pattern.
    Label(String),
    /// Current value, glob pattern.
    Value(String),
    /// Exact element type (e.g. "Button", "ScrollView").
    Type(String),
    /// Any part of the element is on screen.
    Visible,
    /// The element accepts touches.
    Hittable,
    /// Every inner matcher holds.
    AllOf(Vec<Matcher>),
    /// At least one inner matcher holds.
    AnyOf(Vec<Matcher>),
    /// The inner matcher does not hold.
    Not(Box<Matcher>),
}

impl Matcher {
    pub fn id(pattern: impl Into<String>) -> Self {
        Matcher::Id(pattern.into())
    }

    pub fn label(pattern: impl Into<String>) -> Self {
        Matcher::Label(pattern.into())
    }

    pub fn value(pattern: impl Into<String>) -> Self {
        Matcher::Value(pattern.into())
    }

    pub fn element_type(element_type: impl Into<String>) -> Self {
        Matcher::Type(element_type.into())
    }

    pub fn visible() -> Self {
        Matcher::Visible
    }

    pub fn hittable() -> Self {
        Matcher::Hittable
    }

    /// Builds a matcher from the selector triple used on the command line:
    /// a selector matched against the identifier (or the label when
    /// `by_label` is set), optionally narrowed by element type.
    pub fn from_selector(selector: &str, by_label: bool, element_type: Option<&str>) -> Self {
        let base = if by_label {
            Matcher::label(selector)
        } else {
            Matcher::id(selector)
        };
        match element_type {
            Some(typ) => base.and(Matcher::element_type(typ)),
            None => base,
        }
    }

    /// Conjunction. Nested `AllOf`s are flattened so descriptions stay flat.
    pub fn and(self, other: Matcher) -> Self {
        let mut parts = match self {
            Matcher::AllOf(parts) => parts,
            single => vec![single],
        };
        match other {
            Matcher::AllOf(more) => parts.extend(more),
            single => parts.push(single),
        }
        Matcher::AllOf(parts)
    }

    /// Disjunction. Nested `AnyOf`s are flattened.
    pub fn or(self, other: Matcher) -> Self {
        let mut parts = match self {
            Matcher::AnyOf(parts) => parts,
            single => vec![single],
        };
        match other {
            Matcher::AnyOf(more) => parts.extend(more),
            single => parts.push(single),
        }
        Matcher::AnyOf(parts)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Matcher::Not(Box::new(self))
    }

    /// Evaluates the matcher against a single element (children are not
    /// consulted).
    pub fn matches(&self, element: &UIElement) -> bool {
        match self {
            Matcher::Id(pattern) => field_matches(pattern, element.identifier.as_deref()),
            Matcher::Label(pattern) => field_matches(pattern, element.label.as_deref()),
            Matcher::Value(pattern) => field_matches(pattern, element.value.as_deref()),
            Matcher::Type(typ) => element.element_type.as_deref() == Some(typ.as_str()),
            Matcher::Visible => element.is_visible(),
            Matcher::Hittable => element.is_hittable(),
            Matcher::AllOf(parts) => parts.iter().all(|m| m.matches(element)),
            Matcher::AnyOf(parts) => parts.iter().any(|m| m.matches(element)),
            Matcher::Not(inner) => !inner.matches(element),
        }
    }
}

impl fmt::Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Matcher::Id(p) => write!(f, "id({:?})", p),
            Matcher::Label(p) => write!(f, "label({:?})", p),
            Matcher::Value(p) => write!(f, "value({:?})", p),
            Matcher::Type(t) => write!(f, "type({:?})", t),
            Matcher::Visible => f.write_str("visible"),
            Matcher::Hittable => f.write_str("hittable"),
            Matcher::AllOf(parts) => write_joined(f, parts, " && "),
            Matcher::AnyOf(parts) => write_joined(f, parts, " || "),
            Matcher::Not(inner) => match inner.as_ref() {
                Matcher::AllOf(_) | Matcher::AnyOf(_) => write!(f, "!({})", inner),
                _ => write!(f, "!{}", inner),
            },
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, parts: &[Matcher], sep: &str) -> fmt::Result {
    if parts.is_empty() {
        return f.write_str("()");
    }
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        match part {
            Matcher::AllOf(_) | Matcher::AnyOf(_) => write!(f, "({})", part)?,
            _ => write!(f, "{}", part)?,
        }
    }
    Ok(())
}

fn field_matches(pattern: &str, field: Option<&str>) -> bool {
    field.map_or(false, |text| glob_match(pattern, text))
}

/// Returns true if the pattern contains glob wildcard characters (`*` or `?`).
fn has_wildcard(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?')
}

/// Matches a string against a glob pattern with `*` (any chars) and `?` (single char).
///
/// When the pattern has no wildcards, falls back to exact equality.
pub fn glob_match(pattern: &str, text: &str) -> bool {
    if !has_wildcard(pattern) {
        return pattern == text;
    }

    let pat: Vec<char> = pattern.chars().collect();
    let txt: Vec<char> = text.chars().collect();
    let (plen, tlen) = (pat.len(), txt.len());

    // dp[i][j] = pattern[..i] matches text[..j]
    let mut dp = vec![vec![false; tlen + 1]; plen + 1];
    dp[0][0] = true;

    // Leading *'s can match empty text
    for i in 1..=plen {
        if pat[i - 1] == '*' {
            dp[i][0] = dp[i - 1][0];
        }
    }

    for i in 1..=plen {
        for j in 1..=tlen {
            if pat[i - 1] == '*' {
                // * matches zero chars (dp[i-1][j]) or one more char (dp[i][j-1])
                dp[i][j] = dp[i - 1][j] || dp[i][j - 1];
            } else if pat[i - 1] == '?' || pat[i - 1] == txt[j - 1] {
                dp[i][j] = dp[i - 1][j - 1];
            }
        }
    }

    dp[plen][tlen]
}

/// Collects every element in the hierarchy satisfying `matcher`, depth-first
/// in document order.
pub fn find_all(elements: &[UIElement], matcher: &Matcher) -> Vec<UIElement> {
    let mut found = Vec::new();
    collect_matches(elements, matcher, &mut found);
    found
}

fn collect_matches(elements: &[UIElement], matcher: &Matcher, found: &mut Vec<UIElement>) {
    for element in elements {
        if matcher.matches(element) {
            found.push(element.clone());
        }
        collect_matches(&element.children, matcher, found);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(id: &str, label: &str, visible: bool) -> UIElement {
        UIElement {
            identifier: Some(id.to_string()),
            label: Some(label.to_string()),
            element_type: Some("Cell".to_string()),
            visible: Some(visible),
            ..Default::default()
        }
    }

    #[test]
    fn test_glob_match_exact() {
        assert!(glob_match("hello", "hello"));
        assert!(!glob_match("hello", "world"));
    }

    #[test]
    fn test_glob_match_star() {
        assert!(glob_match("Row*", "Row 12"));
        assert!(glob_match("Row*", "Row"));
        assert!(!glob_match("Row*", "Arrow"));
    }

    #[test]
    fn test_glob_match_question_mark() {
        assert!(glob_match("Item ?", "Item 1"));
        assert!(!glob_match("Item ?", "Item 12"));
    }

    #[test]
    fn test_matches_combinators() {
        let element = cell("row-3", "Row 3", false);
        assert!(Matcher::id("row-*").matches(&element));
        assert!(Matcher::label("Row 3").matches(&element));
        assert!(!Matcher::visible().matches(&element));
        assert!(Matcher::visible().not().matches(&element));
        assert!(!Matcher::id("row-3").and(Matcher::visible()).matches(&element));
        assert!(Matcher::id("nope").or(Matcher::element_type("Cell")).matches(&element));
    }

    #[test]
    fn test_missing_field_never_matches() {
        let element = UIElement::default();
        assert!(!Matcher::id("*").matches(&element));
        assert!(!Matcher::value("*").matches(&element));
    }

    #[test]
    fn test_and_flattens() {
        let m = Matcher::id("a").and(Matcher::label("b")).and(Matcher::visible());
        match &m {
            Matcher::AllOf(parts) => assert_eq!(parts.len(), 3),
            other => panic!("expected AllOf, got {:?}", other),
        }
        assert_eq!(m.to_string(), r#"id("a") && label("b") && visible"#);
    }

    #[test]
    fn test_display_nested() {
        let m = Matcher::id("a").or(Matcher::id("b")).and(Matcher::visible());
        assert_eq!(m.to_string(), r#"(id("a") || id("b")) && visible"#);
        assert_eq!(Matcher::visible().not().to_string(), "!visible");
    }

    #[test]
    fn test_from_selector() {
        assert_eq!(Matcher::from_selector("ok", false, None), Matcher::id("ok"));
        assert_eq!(
            Matcher::from_selector("OK", true, Some("Button")),
            Matcher::label("OK").and(Matcher::element_type("Button"))
        );
    }

    #[test]
    fn test_find_all_depth_first() {
        let tree = vec![UIElement {
            identifier: Some("list".into()),
            children: vec![cell("row-1", "Row 1", true), cell("row-2", "Row 2", false)],
            ..Default::default()
        }];

        let rows = find_all(&tree, &Matcher::id("row-*"));
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].identifier.as_deref(), Some("row-1"));

        let visible = find_all(&tree, &Matcher::id("row-*").and(Matcher::visible()));
        assert_eq!(visible.len(), 1);
    }
}
