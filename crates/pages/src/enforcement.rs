//! Municipal enforcement page
//!
//! Single tab of payment and appeal links, all expected to open the external
//! payments provider.

use muniqa_harness::{
    HarnessResult, LinkChecker, LinkExpectation, LinkReport, Selector, Session,
};

/// Reports-and-fines links on the default tab.
pub const FINES_LINKS: &[LinkExpectation] = &[
    LinkExpectation::new("תשלום דו", "https://city4u.co.il/PortalServicesSite/cityPay/283000/mislaka/77"),
    LinkExpectation::new("הודעת תשלום קנס", "https://city4u.co.il/PortalServicesSite/cityPay/283000/mislaka/78"),
    LinkExpectation::new("התראה לפני עיקול", "https://city4u.co.il/PortalServicesSite/cityPay/283000/mislaka/79"),
    LinkExpectation::new("צו עיקול", "https://city4u.co.il/PortalServicesSite/cityPay/283000/mislaka/203"),
    LinkExpectation::new("שובר דחיית", "https://city4u.co.il/PortalServicesSite/cityPay/283000/mislaka/76"),
    LinkExpectation::new("צפייה בפרטי", "https://city4u.co.il/PortalServicesSite/requestsManagement/283000/GetDochDetails/2"),
    LinkExpectation::new("סטטוס ערעור", "https://city4u.co.il/PortalServicesSite/requestsManagement/283000/GetStatus/2"),
    LinkExpectation::new("בקשה לביטול", "https://por140.cityforms.co.il/ApplicationBuilder/eFormRender.html?code=81140050568A4D0111CC9E33E032EFBD&Process=CitizenAppealPikuach140"),
];

pub struct EnforcementPage<'a> {
    session: &'a Session,
    url: String,
}

impl<'a> EnforcementPage<'a> {
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

    pub async fn title(&self) -> HarnessResult<String> {
        let el = self
            .session
            .wait_for_visible(&Selector::Tag("h1".into()), self.session.default_timeout())
            .await?;
        Ok(el.text().await?)
    }

    pub async fn run_flow(&self, checker: &LinkChecker<'_>) -> HarnessResult<Vec<LinkReport>> {
        self.open().await?;
        Ok(checker.verify_all(FINES_LINKS).await)
    }
}
