//! Business licensing page
//!
//! Three tabs of external links. Tab switches here are the flaky part: the
//! tab strip re-renders the whole link table, so each switch waits for the
//! old tab's first link to leave the DOM, for the new tab's first link to
//! become clickable, and for the URL to pick up the tab marker.

use muniqa_harness::{
    switch_tab, HarnessResult, LinkChecker, LinkExpectation, LinkReport, Selector, Session,
    TabStrategy,
};

/// Default tab: starting a business.
pub const TAB_1_LINKS: &[LinkExpectation] = &[
    LinkExpectation::new("שלבים בפתיחת עסק", "rishonlezion.muni.il/Business/BusinessLicense/Pages/NewBusiness.aspx"),
    LinkExpectation::new("הגשת בקשה מקוונת לרישיון עסק", "por141.cityforms.co.il/ApplicationBuilder/eFormRender.html"),
];

/// Second tab: requirements, specifications and permits.
pub const TAB_2_LINKS: &[LinkExpectation] = &[
    LinkExpectation::new("רישיון לניהול עסק", "rishonlezion.muni.il/Business/BusinessLicense/Pages/License.aspx"),
    LinkExpectation::new("דרישות ותנאים לקבלת רישיון עסק", "rishonlezion.muni.il/Business/BusinessLicense/BusinessLicenseprocess/Pages/default.aspx"),
    LinkExpectation::new("אתר המפרטים האחידים ברישוי עסקים", "gov.il/he/departments/units/reform1/govil-landing-page"),
    LinkExpectation::new("בדיקת סטטוס רישוי", "city4u.co.il/PortalServicesSite/_portal/283000"),
    LinkExpectation::new("דרישות לנגישות עסקים", "rishonlezion.muni.il/Business/BusinessLicense/BusinessLicenseprocess/Pages/Accessibility.aspx"),
];

/// Third tab: forms and payments.
pub const TAB_3_LINKS: &[LinkExpectation] = &[
    LinkExpectation::new("בקשה להצבת כיסאות ושולחנות ומתקני תצוגה", "https://por141.cityforms.co.il/ApplicationBuilder/eFormRender.html?code=8141005056A14F7F11CC002357F0A3B0&Process=TableAndChairsPermit141"),
    LinkExpectation::new("תשלום להצבת שולחנות וכיסאות ו/או מתקני תצוגה", "city4u.co.il/PortalServicesSite/cityPay/283000/mislaka/48"),
    LinkExpectation::new("בקשה לרישיון עסק מקוונת", "por141.cityforms.co.il/ApplicationBuilder/eFormRender.html"),
    LinkExpectation::new("בדיקת סטטוס רישוי עסק", "city4u.co.il/PortalServicesSite/_portal/283000"),
    LinkExpectation::new("תשלום אגרת רישוי עסק", "city4u.co.il/PortalServicesSite/cityPay/283000/mislaka/118"),
];

const TAB_2_NAME: &str = "דרישות ותנאים, מפרטים והיתרים";
const TAB_3_NAME: &str = "טפסים";
const TAB_2_URL_PART: &str = "?tab=1";
const TAB_3_URL_PART: &str = "https://my.rishonlezion.muni.il/business/?tab=2";

pub struct BusinessPage<'a> {
    session: &'a Session,
    url: String,
}

impl<'a> BusinessPage<'a> {
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

    /// The first link of the departing tab and the first link of the arriving
    /// tab bracket the re-render.
    async fn goto_tab(
        &self,
        name: &str,
        old_first: &LinkExpectation,
        new_first: &LinkExpectation,
        url_part: &str,
    ) -> HarnessResult<()> {
        switch_tab(
            self.session,
            &Selector::tab_button(name),
            &TabStrategy::ElementGone {
                old: Selector::link_with_text(old_first.label),
                new: Selector::link_with_text(new_first.label),
            },
        )
        .await?;
        self.session
            .wait_for_url_contains(url_part, self.session.default_timeout())
            .await
    }

    pub async fn goto_requirements_tab(&self) -> HarnessResult<()> {
        self.goto_tab(TAB_2_NAME, &TAB_1_LINKS[0], &TAB_2_LINKS[0], TAB_2_URL_PART)
            .await
    }

    pub async fn goto_forms_tab(&self) -> HarnessResult<()> {
        self.goto_tab(TAB_3_NAME, &TAB_2_LINKS[0], &TAB_3_LINKS[0], TAB_3_URL_PART)
            .await
    }

    pub async fn run_flow(&self, checker: &LinkChecker<'_>) -> HarnessResult<Vec<LinkReport>> {
        self.open().await?;
        let mut reports = checker.verify_all(TAB_1_LINKS).await;
        self.goto_requirements_tab().await?;
        reports.extend(checker.verify_all(TAB_2_LINKS).await);
        self.goto_forms_tab().await?;
        reports.extend(checker.verify_all(TAB_3_LINKS).await);
        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_check_link_repeats_across_tabs() {
        // The same status-check target is deliberately listed on two tabs.
        let on_2 = TAB_2_LINKS.iter().find(|e| e.url_part.contains("_portal"));
        let on_3 = TAB_3_LINKS.iter().find(|e| e.url_part.contains("_portal"));
        assert_eq!(on_2.unwrap().url_part, on_3.unwrap().url_part);
    }
}
