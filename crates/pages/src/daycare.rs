//! Daycare and after-school programs page
//!
//! The second tab is reached by URL rather than by clicking, which is both
//! faster and immune to the tab strip's re-render races. Expectations here
//! are short href fragments so almost every link passes on the href check
//! alone, hence the short find timeout.

use std::time::Duration;

use muniqa_harness::{
    switch_tab_via_url, HarnessResult, LinkChecker, LinkExpectation, LinkReport, Selector,
    Session, TabStrategy,
};

/// After-school programs, the default tab.
pub const AFTERSCHOOL_LINKS: &[LinkExpectation] = &[
    LinkExpectation::new("איזור אישי", "cewz20"),
    LinkExpectation::new("רישום לצהרוני בית הספר", "cewz20"),
];

/// Daycare registration, second tab.
pub const DAYCARE_LINKS: &[LinkExpectation] = &[
    LinkExpectation::new("אזור אישי", "PrivateArea"),
    LinkExpectation::new("רישום מעונות יום", "AnotherProcIsRunning"),
    LinkExpectation::new("רישום מעון חרצית", TAMAT_URL_PART),
];

/// The Tamat daycare entry renders as a styled card, not a text link; its
/// href is the only stable handle.
const TAMAT_URL_PART: &str = "CategoryID=3506";

const TAB_2_URL_PART: &str = "?tab=1";

pub struct DaycarePage<'a> {
    session: &'a Session,
    url: String,
}

impl<'a> DaycarePage<'a> {
    /// Links either resolve immediately by href or are genuinely missing;
    /// waiting the full default timeout per link just slows the run down.
    pub const FIND_TIMEOUT: Duration = Duration::from_secs(3);

    pub fn new(session: &'a Session, url: impl Into<String>) -> Self {
        Self {
            session,
            url: url.into(),
        }
    }

    pub async fn open(&self) -> HarnessResult<()> {
        self.session.goto(&self.url).await?;
        self.session
            .wait_for_visible(&Selector::Tag("h1".into()), self.session.default_timeout())
            .await?;
        Ok(())
    }

    pub async fn goto_daycare_tab(&self) -> HarnessResult<()> {
        let target = format!("{}{}", self.url, TAB_2_URL_PART);
        switch_tab_via_url(
            self.session,
            &target,
            &TabStrategy::Settle(Duration::from_secs(2)),
        )
        .await
    }

    pub async fn run_flow(&self, checker: &LinkChecker<'_>) -> HarnessResult<Vec<LinkReport>> {
        self.open().await?;
        let mut reports = checker.verify_all(AFTERSCHOOL_LINKS).await;
        self.goto_daycare_tab().await?;
        for exp in DAYCARE_LINKS {
            let report = if exp.url_part == TAMAT_URL_PART {
                let selector = Selector::href_contains(TAMAT_URL_PART);
                checker.verify_with_selector(&selector, exp).await
            } else {
                checker.verify(exp).await
            };
            reports.push(report);
        }
        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tamat_entry_is_keyed_by_its_href() {
        let tamat = DAYCARE_LINKS
            .iter()
            .find(|e| e.label.contains("חרצית"))
            .unwrap();
        assert_eq!(tamat.url_part, TAMAT_URL_PART);
    }
}
