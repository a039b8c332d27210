//! Water services page
//!
//! One payment link on the default tab, then a forms tab full of PDF
//! downloads. Several of the form URLs contain percent-encoded Hebrew path
//! segments, which is what the decoded URL comparison exists for.

use std::time::Duration;

use muniqa_harness::{
    switch_tab, HarnessResult, LinkChecker, LinkExpectation, LinkReport, Selector, Session,
    TabStrategy,
};

/// Default tab.
pub const GENERAL_LINKS: &[LinkExpectation] =
    &[LinkExpectation::new("תשלום חשבון מים", "manit")];

/// Forms tab: downloadable PDFs. Expectations are fragments of the decoded
/// file path, not full URLs.
pub const FORM_LINKS: &[LinkExpectation] = &[
    LinkExpectation::new("בקשה לביקור", "setvisit.pdf"),
    LinkExpectation::new("בקשה לקבלת", "מידע.pdf"),
    LinkExpectation::new("הוראה", "מונגש"),
    LinkExpectation::new("החלפת", "החלפת"),
    LinkExpectation::new("סניטרית", "סניטרית"),
    LinkExpectation::new("הנדרשים", "טופס"),
    LinkExpectation::new("כשרות", "קרמ.pdf"),
];

const FORMS_TAB: &str = "טפסים";

pub struct WaterPage<'a> {
    session: &'a Session,
    url: String,
}

impl<'a> WaterPage<'a> {
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

    pub async fn goto_forms_tab(&self) -> HarnessResult<()> {
        switch_tab(
            self.session,
            &Selector::tab_button(FORMS_TAB),
            &TabStrategy::Settle(Duration::from_secs(2)),
        )
        .await
    }

    pub async fn run_flow(&self, checker: &LinkChecker<'_>) -> HarnessResult<Vec<LinkReport>> {
        self.open().await?;
        let mut reports = checker.verify_all(GENERAL_LINKS).await;
        self.goto_forms_tab().await?;
        reports.extend(checker.verify_all(FORM_LINKS).await);
        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use muniqa_harness::norm::normalize_url;

    #[test]
    fn hebrew_form_fragments_survive_normalization() {
        // Normalizing an already-decoded fragment must be a no-op, otherwise
        // the containment check against decoded hrefs breaks.
        for exp in FORM_LINKS {
            assert_eq!(normalize_url(exp.url_part), exp.url_part);
        }
    }
}
