//! Element selectors
//!
//! A tagged selector type consumed by a single find operation on the session,
//! replacing loose (strategy, string) pairs at call sites.

use std::fmt;

use fantoccini::Locator;

use crate::text::{normalize_label, INVISIBLE};

/// How to locate a DOM element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// By `id` attribute
    Id(String),
    /// By `name` attribute
    Name(String),
    /// By CSS selector
    Css(String),
    /// By XPath expression
    XPath(String),
    /// By tag name
    Tag(String),
}

impl Selector {
    /// A link or button-role element whose visible text contains `label`.
    ///
    /// Both sides of the match are normalized: the label through
    /// [`normalize_label`], the DOM text through `normalize-space` plus a
    /// `translate` that strips the same invisible characters. A soft hyphen
    /// the CMS left inside the DOM label must not defeat the lookup.
    pub fn link_with_text(label: &str) -> Self {
        let needle = xpath_literal(&normalize_label(label));
        let haystack = visible_text("normalize-space(.)");
        Selector::XPath(format!(
            "//*[contains(@role, 'button') or self::a][contains({haystack}, {needle})]"
        ))
    }

    /// A tab control button whose text contains `name`.
    pub fn tab_button(name: &str) -> Self {
        let needle = xpath_literal(&normalize_label(name));
        let haystack = visible_text("text()");
        Selector::XPath(format!("//button[contains({haystack}, {needle})]"))
    }

    /// An anchor whose `href` contains `part`.
    pub fn href_contains(part: &str) -> Self {
        Selector::Css(format!("a[href*='{part}']"))
    }

    /// Any element whose visible text contains `text`.
    pub fn any_with_text(text: &str) -> Self {
        let needle = xpath_literal(&normalize_label(text));
        let haystack = visible_text("normalize-space(.)");
        Selector::XPath(format!("//*[contains({haystack}, {needle})]"))
    }

    pub(crate) fn lowered(&self) -> Lowered {
        match self {
            Selector::Id(s) => Lowered::Id(s.clone()),
            Selector::Name(s) => Lowered::Css(format!("[name='{s}']")),
            Selector::Css(s) => Lowered::Css(s.clone()),
            Selector::XPath(s) => Lowered::XPath(s.clone()),
            Selector::Tag(s) => Lowered::Css(s.clone()),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Id(s) => write!(f, "id={s}"),
            Selector::Name(s) => write!(f, "name={s}"),
            Selector::Css(s) => write!(f, "css={s}"),
            Selector::XPath(s) => write!(f, "xpath={s}"),
            Selector::Tag(s) => write!(f, "tag={s}"),
        }
    }
}

/// Owned form that fantoccini's borrowing `Locator` can point into.
pub(crate) enum Lowered {
    Id(String),
    Css(String),
    XPath(String),
}

impl Lowered {
    pub(crate) fn as_locator(&self) -> Locator<'_> {
        match self {
            Lowered::Id(s) => Locator::Id(s),
            Lowered::Css(s) => Locator::Css(s),
            Lowered::XPath(s) => Locator::XPath(s),
        }
    }
}

/// Wrap a text expression in a `translate` that deletes the invisible
/// characters, mirroring what [`normalize_label`] does to the needle.
fn visible_text(expr: &str) -> String {
    let invisibles: String = INVISIBLE.iter().collect();
    format!("translate({expr}, {}, '')", xpath_literal(&invisibles))
}

/// Quote a string as an XPath literal.
///
/// XPath 1.0 has no escape sequences inside string literals, so text that
/// mixes both quote characters must be assembled with `concat()`.
fn xpath_literal(text: &str) -> String {
    if !text.contains('\'') {
        return format!("'{text}'");
    }
    if !text.contains('"') {
        return format!("\"{text}\"");
    }
    let parts: Vec<String> = text
        .split('\'')
        .map(|chunk| format!("'{chunk}'"))
        .collect();
    format!("concat({})", parts.join(", \"'\", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_selector_normalizes_label() {
        let sel = Selector::link_with_text("תשלום\u{00AD}  דו");
        match &sel {
            Selector::XPath(xp) => assert!(xp.contains("'תשלום דו'")),
            other => panic!("expected xpath, got {other}"),
        }
    }

    /// What the locator's predicate computes for a DOM text node:
    /// `normalize-space` then the invisible-stripping `translate`.
    fn dom_haystack(text: &str) -> String {
        let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
        collapsed.chars().filter(|c| !INVISIBLE.contains(c)).collect()
    }

    #[test]
    fn soft_hyphen_in_dom_label_still_matches() {
        // The DOM side carries the soft hyphen; the normalized needle does
        // not. The translate step must bridge the two.
        let dom_label = "תש\u{00AD}לום דו";
        let needle = normalize_label("תשלום דו");
        assert!(dom_haystack(dom_label).contains(&needle));

        match Selector::link_with_text("תשלום דו") {
            Selector::XPath(xp) => {
                assert!(xp.contains("translate("));
                assert!(xp.contains('\u{00AD}'));
            }
            other => panic!("expected xpath, got {other}"),
        }
    }

    #[test]
    fn xpath_literal_handles_double_quotes() {
        // Label with a gershayim-style double quote, as in the daycare table.
        assert_eq!(xpath_literal("תמ\"ת"), "'תמ\"ת'");
    }

    #[test]
    fn xpath_literal_handles_single_quotes() {
        assert_eq!(xpath_literal("it's"), "\"it's\"");
    }

    #[test]
    fn xpath_literal_handles_mixed_quotes() {
        let lit = xpath_literal("a'b\"c");
        assert!(lit.starts_with("concat("));
        assert!(lit.contains("'a'"));
        assert!(lit.contains("'b\"c'"));
    }

    #[test]
    fn name_selector_lowers_to_css() {
        match Selector::Name("tz".into()).lowered() {
            Lowered::Css(css) => assert_eq!(css, "[name='tz']"),
            _ => panic!("expected css lowering"),
        }
    }

    #[test]
    fn tag_selector_lowers_to_css() {
        match Selector::Tag("h1".into()).lowered() {
            Lowered::Css(css) => assert_eq!(css, "h1"),
            _ => panic!("expected css lowering"),
        }
    }
}
