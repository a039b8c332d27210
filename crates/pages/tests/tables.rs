//! Sanity checks over the static link-expectation tables. These run without
//! a browser and catch copy-paste damage in the Hebrew labels and URLs.

use muniqa_pages::{business, daycare, education, enforcement, parking, water};

use muniqa_harness::LinkExpectation;

fn all_tables() -> Vec<(&'static str, &'static [LinkExpectation])> {
    vec![
        ("business tab 1", business::TAB_1_LINKS),
        ("business tab 2", business::TAB_2_LINKS),
        ("business tab 3", business::TAB_3_LINKS),
        ("daycare afterschool", daycare::AFTERSCHOOL_LINKS),
        ("daycare daycare", daycare::DAYCARE_LINKS),
        ("education default", education::DEFAULT_TAB_LINKS),
        ("education online forms", education::ONLINE_FORMS_LINKS),
        ("education primary", education::PRIMARY_SCHOOL_LINKS),
        ("education secondary", education::SECONDARY_SCHOOL_LINKS),
        ("education special", education::SPECIAL_EDUCATION_LINKS),
        ("education payments", education::PAYMENTS_LINKS),
        ("education contact", education::CONTACT_LINKS),
        ("enforcement fines", enforcement::FINES_LINKS),
        ("parking fines", parking::FINES_LINKS),
        ("parking permits", parking::PERMIT_LINKS),
        ("water general", water::GENERAL_LINKS),
        ("water forms", water::FORM_LINKS),
    ]
}

#[test]
fn tables_are_nonempty_with_nonempty_entries() {
    for (name, table) in all_tables() {
        assert!(!table.is_empty(), "{name} is empty");
        for exp in table {
            assert!(!exp.label.trim().is_empty(), "{name} has an empty label");
            assert!(
                !exp.url_part.trim().is_empty(),
                "{name} has an empty URL part for '{}'",
                exp.label
            );
        }
    }
}

#[test]
fn labels_carry_no_stray_whitespace() {
    for (name, table) in all_tables() {
        for exp in table {
            assert_eq!(
                exp.label,
                exp.label.trim(),
                "{name}: label '{}' has surrounding whitespace",
                exp.label
            );
        }
    }
}

#[test]
fn enforcement_covers_the_fine_payment_voucher() {
    let found = enforcement::FINES_LINKS
        .iter()
        .any(|e| e.label == "תשלום דו" && e.url_part.ends_with("cityPay/283000/mislaka/77"));
    assert!(found);
}

#[test]
fn education_school_tabs_end_with_a_contact_link() {
    for links in [
        education::PRIMARY_SCHOOL_LINKS,
        education::SECONDARY_SCHOOL_LINKS,
        education::SPECIAL_EDUCATION_LINKS,
    ] {
        let last = links.last().unwrap();
        assert_eq!(last.label, "יצירת קשר");
        assert!(last.url_part.contains("CustomDispForm"));
    }
}
