//! Label normalization
//!
//! The portal's button labels occasionally contain invisible Unicode
//! (soft hyphens in Hebrew labels, zero-width joiners from the CMS editor).
//! Locators match on normalized text so those characters never break a lookup.

/// Characters that render as nothing but defeat substring matching. The
/// locator builder strips the same set from the DOM side of a text match.
pub(crate) const INVISIBLE: &[char] = &[
    '\u{00AD}', // soft hyphen
    '\u{200B}', // zero-width space
    '\u{200C}', // zero-width non-joiner
    '\u{200D}', // zero-width joiner
    '\u{200E}', // left-to-right mark
    '\u{200F}', // right-to-left mark
    '\u{2060}', // word joiner
    '\u{FEFF}', // BOM / zero-width no-break space
];

/// Strip invisible characters and collapse runs of whitespace to single
/// spaces, trimming the ends.
pub fn normalize_label(label: &str) -> String {
    let stripped: String = label.chars().filter(|c| !INVISIBLE.contains(c)).collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_whitespace() {
        assert_eq!(normalize_label("  תשלום   דו\"ח \n"), "תשלום דו\"ח");
    }

    #[test]
    fn strips_soft_hyphen() {
        // Soft hyphen inside a Hebrew label, as seen in portal buttons.
        let label = "תש\u{00AD}לום דו";
        assert_eq!(normalize_label(label), "תשלום דו");
    }

    #[test]
    fn strips_zero_width_characters() {
        let label = "רישום\u{200B}\u{200F} מעון";
        assert_eq!(normalize_label(label), "רישום מעון");
    }
}
