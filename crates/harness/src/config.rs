//! Portal configuration loaded from an explicit JSON file
//!
//! The file carries per-section portal URLs plus the test user's identity.
//! It is loaded once at startup and handed to page constructors; nothing in
//! the suite reads configuration from ambient filesystem state.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{HarnessError, HarnessResult};

/// Test user identity. Used once per run to authenticate, then dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserData {
    /// National ID number typed into the login form
    pub id_number: String,

    /// Phone number for the OTP flow
    #[serde(default)]
    pub phone_number: Option<String>,

    /// Password for the in-modal login variant (education student file)
    #[serde(default)]
    pub password: Option<String>,
}

/// Per-section portal URLs and credentials.
///
/// Sections the deployment does not expose are simply absent from the file;
/// the runner skips them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalConfig {
    #[serde(default)]
    pub login_url: Option<String>,

    /// URL fragment that identifies the logged-in landing page
    #[serde(default)]
    pub home_url_part: Option<String>,

    #[serde(default)]
    pub business_url: Option<String>,
    #[serde(default)]
    pub daycare_url: Option<String>,
    #[serde(default)]
    pub education_url: Option<String>,
    #[serde(default)]
    pub enforcement_url: Option<String>,
    #[serde(default)]
    pub parking_url: Option<String>,
    #[serde(default)]
    pub street_url: Option<String>,
    #[serde(default)]
    pub water_url: Option<String>,

    pub user_data: UserData,
}

impl PortalConfig {
    /// Parse a configuration from a JSON string.
    pub fn from_json(json: &str) -> HarnessResult<Self> {
        let config: PortalConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file.
    pub fn load(path: &Path) -> HarnessResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            HarnessError::InvalidConfig(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&raw)
    }

    fn validate(&self) -> HarnessResult<()> {
        if self.user_data.id_number.trim().is_empty() {
            return Err(HarnessError::InvalidConfig(
                "user_data.id_number is empty".into(),
            ));
        }
        if self.section_urls().is_empty() {
            return Err(HarnessError::InvalidConfig(
                "no section URLs configured".into(),
            ));
        }
        Ok(())
    }

    /// All configured section URLs, with their config key.
    pub fn section_urls(&self) -> Vec<(&'static str, &str)> {
        [
            ("business_url", &self.business_url),
            ("daycare_url", &self.daycare_url),
            ("education_url", &self.education_url),
            ("enforcement_url", &self.enforcement_url),
            ("parking_url", &self.parking_url),
            ("street_url", &self.street_url),
            ("water_url", &self.water_url),
        ]
        .into_iter()
        .filter_map(|(key, url)| url.as_deref().map(|u| (key, u)))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "login_url": "https://my.example.muni.il/login",
        "home_url_part": "/home",
        "daycare_url": "https://my.example.muni.il/daycare/",
        "parking_url": "https://my.example.muni.il/parking/",
        "user_data": {
            "id_number": "123456789",
            "phone_number": "0500000000",
            "password": "hunter2"
        }
    }"#;

    #[test]
    fn parses_sample_config() {
        let config = PortalConfig::from_json(SAMPLE).unwrap();
        assert_eq!(config.user_data.id_number, "123456789");
        assert_eq!(config.home_url_part.as_deref(), Some("/home"));
        assert_eq!(config.section_urls().len(), 2);
        assert!(config.business_url.is_none());
    }

    #[test]
    fn rejects_empty_identity() {
        let json = r#"{"daycare_url": "x", "user_data": {"id_number": " "}}"#;
        assert!(PortalConfig::from_json(json).is_err());
    }

    #[test]
    fn rejects_config_without_sections() {
        let json = r#"{"user_data": {"id_number": "123"}}"#;
        assert!(PortalConfig::from_json(json).is_err());
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secrets.json");
        std::fs::write(&path, SAMPLE).unwrap();
        let config = PortalConfig::load(&path).unwrap();
        assert_eq!(config.user_data.phone_number.as_deref(), Some("0500000000"));
    }
}
