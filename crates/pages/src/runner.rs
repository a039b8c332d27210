//! Suite runner
//!
//! Drives one browser session through the configured sections in a fixed
//! order, isolates per-section failures, and aggregates everything into a
//! [`SuiteResult`]. A section with no URL in the configuration is reported
//! as skipped, not failed.

use std::path::PathBuf;
use std::time::Instant;

use tracing::{error, info};

use muniqa_harness::{
    HarnessResult, LinkChecker, LinkPolicy, LinkReport, PortalConfig, ScreenshotSink, Session,
    SessionConfig,
};

use crate::business::BusinessPage;
use crate::daycare::DaycarePage;
use crate::education::EducationPage;
use crate::enforcement::EnforcementPage;
use crate::login::LoginPage;
use crate::parking::ParkingPage;
use crate::report::{SectionResult, SuiteResult};
use crate::section::Section;
use crate::street::StreetPage;
use crate::water::WaterPage;

/// Everything the runner needs, decided by the caller up front.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub session: SessionConfig,
    pub policy: LinkPolicy,
    /// Where failure screenshots land.
    pub screenshot_dir: PathBuf,
    /// Where `results.json` lands; `None` skips the write.
    pub output_dir: Option<PathBuf>,
    /// Abort the run at the first failed section.
    pub fail_fast: bool,
    /// Run sections without the initial portal login even when the
    /// configuration would allow it.
    pub skip_login: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            policy: LinkPolicy::default(),
            screenshot_dir: PathBuf::from("screenshots"),
            output_dir: None,
            fail_fast: false,
            skip_login: false,
        }
    }
}

pub struct SuiteRunner {
    config: RunnerConfig,
    portal: PortalConfig,
}

impl SuiteRunner {
    pub fn new(config: RunnerConfig, portal: PortalConfig) -> Self {
        Self { config, portal }
    }

    /// Run the given sections in [`Section::ALL`] order and return the
    /// aggregate. Setup problems (WebDriver unreachable, login failed) are
    /// hard errors; every section failure is captured in the result instead.
    pub async fn run(&self, sections: &[Section]) -> HarnessResult<SuiteResult> {
        let start = Instant::now();
        let session = Session::connect(self.config.session.clone()).await?;
        let screenshots = ScreenshotSink::new(self.config.screenshot_dir.clone());

        if let Err(e) = self.login(&session).await {
            // Login failure means every authenticated flow would be noise.
            let _ = session.close().await;
            return Err(e);
        }

        let mut results = Vec::new();
        for section in Section::ALL {
            if !sections.contains(&section) {
                continue;
            }
            let result = self.run_section(&session, &screenshots, section).await;
            let failed = result.failed();
            results.push(result);
            if failed && self.config.fail_fast {
                info!("fail-fast: stopping after {}", section);
                break;
            }
        }

        session.close().await?;

        let suite = SuiteResult::from_sections(results, start.elapsed().as_millis() as u64);
        info!(
            "suite finished: {} links, {} passed, {} warned, {} failed",
            suite.totals.links_checked,
            suite.totals.passed,
            suite.totals.warned,
            suite.totals.failed
        );

        if let Some(dir) = &self.config.output_dir {
            let path = suite.write_to(dir)?;
            info!("results written to {}", path.display());
        }
        Ok(suite)
    }

    /// Portal login via the one-time-code flow, when the configuration
    /// provides a login URL and a phone number. The code itself is typed by
    /// a human watching the (headed) browser.
    async fn login(&self, session: &Session) -> HarnessResult<()> {
        if self.config.skip_login {
            info!("login skipped, running sections unauthenticated");
            return Ok(());
        }
        let (Some(login_url), Some(phone)) = (
            &self.portal.login_url,
            &self.portal.user_data.phone_number,
        ) else {
            info!("login not configured, running sections unauthenticated");
            return Ok(());
        };

        let home_part = self.portal.home_url_part.as_deref().unwrap_or("/");
        let login = LoginPage::new(session, login_url.clone());
        login
            .request_otp(&self.portal.user_data.id_number, phone)
            .await?;
        login.wait_for_manual_otp(home_part).await?;
        Ok(())
    }

    async fn run_section(
        &self,
        session: &Session,
        screenshots: &ScreenshotSink,
        section: Section,
    ) -> SectionResult {
        let Some(url) = self.section_url(section) else {
            info!("section {} has no URL configured, skipping", section);
            return SectionResult::skipped(section);
        };

        info!("=== section {} ===", section);
        let start = Instant::now();
        let mut checker = LinkChecker::new(session)
            .with_policy(self.config.policy)
            .with_screenshots(screenshots);
        if section == Section::Daycare {
            // Daycare links resolve by href or not at all.
            checker = checker.with_find_timeout(DaycarePage::FIND_TIMEOUT);
        }

        let flow = self.run_flow(session, &checker, section, url).await;
        let (reports, flow_error) = match flow {
            Ok(reports) => (reports, None),
            Err(e) => {
                error!("section {} flow aborted: {}", section, e);
                (Vec::new(), Some(e.to_string()))
            }
        };

        SectionResult {
            section,
            reports,
            flow_error,
            skipped: false,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }

    async fn run_flow(
        &self,
        session: &Session,
        checker: &LinkChecker<'_>,
        section: Section,
        url: &str,
    ) -> HarnessResult<Vec<LinkReport>> {
        match section {
            Section::Daycare => DaycarePage::new(session, url).run_flow(checker).await,
            Section::Education => {
                let user = &self.portal.user_data;
                let credentials = user
                    .password
                    .as_deref()
                    .map(|password| (user.id_number.as_str(), password));
                EducationPage::new(session, url)
                    .run_flow(checker, credentials)
                    .await
            }
            Section::Enforcement => EnforcementPage::new(session, url).run_flow(checker).await,
            Section::Parking => ParkingPage::new(session, url).run_flow(checker).await,
            Section::Street => {
                StreetPage::new(session, url).run_flow().await?;
                Ok(Vec::new())
            }
            Section::Water => WaterPage::new(session, url).run_flow(checker).await,
            Section::Business => BusinessPage::new(session, url).run_flow(checker).await,
        }
    }

    fn section_url(&self, section: Section) -> Option<&str> {
        match section {
            Section::Daycare => self.portal.daycare_url.as_deref(),
            Section::Education => self.portal.education_url.as_deref(),
            Section::Enforcement => self.portal.enforcement_url.as_deref(),
            Section::Parking => self.portal.parking_url.as_deref(),
            Section::Street => self.portal.street_url.as_deref(),
            Section::Water => self.portal.water_url.as_deref(),
            Section::Business => self.portal.business_url.as_deref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn portal() -> PortalConfig {
        PortalConfig::from_json(
            r#"{
                "parking_url": "https://my.example.muni.il/parking/",
                "user_data": {"id_number": "123456789"}
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn unconfigured_sections_have_no_url() {
        let runner = SuiteRunner::new(RunnerConfig::default(), portal());
        assert!(runner.section_url(Section::Parking).is_some());
        assert!(runner.section_url(Section::Water).is_none());
    }
}
