//! Parking page
//!
//! Fines links on the default tab, permit links on the third tab. The
//! personal-info tab requires login and is out of this flow's scope.

use std::time::Duration;

use muniqa_harness::{
    switch_tab, HarnessResult, LinkChecker, LinkExpectation, LinkReport, Selector, Session,
    TabStrategy,
};

/// Default tab: parking fine payment vouchers.
pub const FINES_LINKS: &[LinkExpectation] = &[
    LinkExpectation::new("תשלום דו", "https://www.city4u.co.il/PortalServicesSite/cityPay/283000/mislaka/4"),
    LinkExpectation::new("הודעת תשלום קנס", "https://www.city4u.co.il/PortalServicesSite/cityPay/283000/mislaka/16"),
    LinkExpectation::new("התראה לפני עיקול", "https://www.city4u.co.il/PortalServicesSite/cityPay/283000/mislaka/3"),
    LinkExpectation::new("צו עיקול מטלטלין", "https://www.city4u.co.il/PortalServicesSite/cityPay/283000/mislaka/98"),
    LinkExpectation::new("שובר דחיית ערעור", "https://www.city4u.co.il/PortalServicesSite/cityPay/283000/mislaka/36"),
];

/// Third tab: resident parking permits.
pub const PERMIT_LINKS: &[LinkExpectation] = &[
    LinkExpectation::new("רשימת אזורי חניה", "https://www.rishonlezion.muni.il/Residents/Transportation/Parking/Pages/LocalParkingTicketArea.aspx?prm=920082-1&language=he"),
    LinkExpectation::new("פירוט חניונים", "https://www.rishonlezion.muni.il/Residents/Transportation/Parking/Pages/Cityparking.aspx?prm=920082-1&language=he"),
    LinkExpectation::new("חידוש תו חניה", "https://mileon-portal.co.il/DynamicForm/resNew.aspx?prm=920082-1&language=he"),
    LinkExpectation::new("בדיקת תוקף", "https://mileon-portal.co.il/DynamicForm/ValidationLabelsNew.aspx?prm=920082-1&language=he"),
    LinkExpectation::new("השלמת מסמכים", "https://mileon-portal.co.il/DynamicForm/CompletingDocuments.aspx?prm=920082-1&language=he"),
    LinkExpectation::new("הקצאת חניה שמורה", "https://www.rishonlezion.muni.il/Residents/Transportation/Parking/Pages/DisabledParking.aspx"),
];

const PERMITS_TAB: &str = "תווי חניה";

pub struct ParkingPage<'a> {
    session: &'a Session,
    url: String,
}

impl<'a> ParkingPage<'a> {
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

    /// The permits tab has no URL change and no stable sentinel; a settle
    /// delay is the only working signal.
    pub async fn goto_permits_tab(&self) -> HarnessResult<()> {
        switch_tab(
            self.session,
            &Selector::tab_button(PERMITS_TAB),
            &TabStrategy::Settle(Duration::from_secs(2)),
        )
        .await
    }

    pub async fn run_flow(&self, checker: &LinkChecker<'_>) -> HarnessResult<Vec<LinkReport>> {
        self.open().await?;
        let mut reports = checker.verify_all(FINES_LINKS).await;
        self.goto_permits_tab().await?;
        reports.extend(checker.verify_all(PERMIT_LINKS).await);
        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permit_links_target_permit_systems() {
        for exp in PERMIT_LINKS {
            assert!(
                exp.url_part.contains("rishonlezion.muni.il")
                    || exp.url_part.contains("mileon-portal.co.il")
            );
        }
    }
}
