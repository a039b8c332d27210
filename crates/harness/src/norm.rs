//! URL normalization for expectation matching
//!
//! Expected parts in the link tables are sometimes full URLs, sometimes
//! percent-encoded document paths, sometimes bare substrings. Both sides of
//! every comparison go through the same normalization: percent-decode, strip
//! the scheme, then substring match.

use percent_encoding::percent_decode_str;

/// Percent-decode a URL (lossy on invalid UTF-8) and strip a leading
/// `http://` or `https://`.
pub fn normalize_url(url: &str) -> String {
    let decoded = percent_decode_str(url).decode_utf8_lossy();
    strip_scheme(&decoded).to_string()
}

fn strip_scheme(url: &str) -> &str {
    url.strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url)
}

/// Whether the navigation result `actual` satisfies the expected URL part.
pub fn url_part_matches(actual: &str, expected_part: &str) -> bool {
    normalize_url(actual).contains(&normalize_url(expected_part))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_schemes() {
        assert_eq!(normalize_url("https://city4u.co.il/x"), "city4u.co.il/x");
        assert_eq!(normalize_url("http://city4u.co.il/x"), "city4u.co.il/x");
        assert_eq!(normalize_url("city4u.co.il/x"), "city4u.co.il/x");
    }

    #[test]
    fn decodes_percent_encoding() {
        let encoded = "rishonlezion.muni.il/Documents/%D7%98%D7%95%D7%A4%D7%A1.pdf";
        assert_eq!(normalize_url(encoded), "rishonlezion.muni.il/Documents/טופס.pdf");
    }

    #[test]
    fn matches_expected_part_inside_full_url() {
        // Fast-pass scenario from the enforcement table.
        assert!(url_part_matches(
            "https://city4u.co.il/PortalServicesSite/cityPay/283000/mislaka/77",
            "cityPay/283000/mislaka/77"
        ));
    }

    #[test]
    fn matches_across_scheme_difference() {
        assert!(url_part_matches(
            "https://www.city4u.co.il/PortalServicesSite/cityPay/283000/mislaka/4",
            "https://www.city4u.co.il/PortalServicesSite/cityPay/283000/mislaka/4"
        ));
    }

    #[test]
    fn matches_encoded_expectation_against_decoded_url() {
        let expected = "Documents/%D7%AA%D7%A6%D7%94%D7%99%D7%A8%20%D7%9E%D7%92%D7%95%D7%A8%D7%99%D7%9D";
        let actual = "https://www.rishonlezion.muni.il/Residents/Education/registrationall/Documents/תצהיר מגורים תשפו.pdf";
        assert!(url_part_matches(actual, expected));
    }

    #[test]
    fn rejects_mismatch() {
        assert!(!url_part_matches(
            "https://city4u.co.il/PortalServicesSite/cityPay/283000/mislaka/78",
            "cityPay/283000/mislaka/77"
        ));
    }
}
