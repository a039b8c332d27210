//! Portal section identifiers

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// One portal section with its own page object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Section {
    Daycare,
    Education,
    Enforcement,
    Parking,
    Street,
    Water,
    Business,
}

impl Section {
    /// All sections, in the order the full flow visits them.
    pub const ALL: [Section; 7] = [
        Section::Daycare,
        Section::Education,
        Section::Enforcement,
        Section::Parking,
        Section::Street,
        Section::Water,
        Section::Business,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Daycare => "daycare",
            Section::Education => "education",
            Section::Enforcement => "enforcement",
            Section::Parking => "parking",
            Section::Street => "street",
            Section::Water => "water",
            Section::Business => "business",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "daycare" => Ok(Section::Daycare),
            "education" => Ok(Section::Education),
            "enforcement" => Ok(Section::Enforcement),
            "parking" => Ok(Section::Parking),
            "street" => Ok(Section::Street),
            "water" => Ok(Section::Water),
            "business" => Ok(Section::Business),
            other => Err(format!(
                "unknown section '{other}' (expected one of: daycare, education, \
                 enforcement, parking, street, water, business)"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_strings() {
        for section in Section::ALL {
            assert_eq!(section.as_str().parse::<Section>().unwrap(), section);
        }
    }

    #[test]
    fn rejects_unknown_section() {
        assert!("sewage".parse::<Section>().is_err());
    }
}
