//! Street information page
//!
//! Unlike the link-table sections, this one exercises an interactive search:
//! type a street name, pick the autocomplete suggestion, wait for the AJAX
//! result table, then expand a row into its detail popup. There are no link
//! expectations here; the flow itself is the assertion.

use std::time::Duration;

use tracing::info;

use muniqa_harness::{HarnessResult, Selector, Session};

/// A street guaranteed to exist in the city register.
pub const TEST_STREET_NAME: &str = "רבי מאיר";

const LOAD_SENTINEL: &str = "מידע על רחוב";

pub struct StreetPage<'a> {
    session: &'a Session,
    url: String,
}

impl<'a> StreetPage<'a> {
    pub fn new(session: &'a Session, url: impl Into<String>) -> Self {
        Self {
            session,
            url: url.into(),
        }
    }

    fn search_input() -> Selector {
        Selector::XPath("//input[@type='text' and not(@readonly) and not(@disabled)]".into())
    }

    fn suggestion(street: &str) -> Selector {
        Selector::XPath(format!(
            "//*[contains(@class, 'suggestion') or @role='option']\
             [contains(normalize-space(.), '{street}')]"
        ))
    }

    fn result_entry(street: &str) -> Selector {
        Selector::XPath(format!(
            "//*[contains(@class, 'data-field') or contains(@class, 'data-row') \
             or contains(@class, 'data-container')]\
             //*[contains(normalize-space(.), '{street}')]"
        ))
    }

    fn first_data_row() -> Selector {
        Selector::XPath("//div[contains(@class, 'table-row')][position()>1][1]".into())
    }

    fn expand_button() -> Selector {
        Selector::XPath("//i[contains(@class, 'plus')]".into())
    }

    fn popup_heading() -> Selector {
        Selector::Css(".popup-container h4".into())
    }

    /// The page shell arrives before its widgets; a known heading text is
    /// the stability signal.
    pub async fn open(&self) -> HarnessResult<()> {
        self.session.goto(&self.url).await?;
        self.session
            .wait_for_present(
                &Selector::any_with_text(LOAD_SENTINEL),
                Duration::from_secs(15),
            )
            .await?;
        info!("street page loaded");
        Ok(())
    }

    /// Type the street name, click its autocomplete suggestion, and wait for
    /// the result table to carry the street. Returns the first data row's
    /// text.
    pub async fn search(&self, street: &str) -> HarnessResult<String> {
        self.session.enter_text(&Self::search_input(), street).await?;

        // Committing the search requires clicking the suggestion; Enter
        // submits an empty query.
        let suggestion = self
            .session
            .wait_for_clickable(&Self::suggestion(street), Duration::from_secs(7))
            .await?;
        suggestion.click().await?;

        self.session
            .wait_for_present(&Self::result_entry(street), Duration::from_secs(15))
            .await?;

        let row = self.session.find(&Self::first_data_row()).await?;
        let text = row.text().await?;
        info!("search returned data for '{}'", street);
        Ok(text)
    }

    /// Expand the first result row and return the popup's heading text.
    pub async fn expand_details(&self) -> HarnessResult<String> {
        self.session.click(&Self::expand_button()).await?;
        let heading = self
            .session
            .wait_for_present(&Self::popup_heading(), Duration::from_secs(5))
            .await?;
        let text = heading.text().await?;
        info!("detail popup opened: {}", text);
        Ok(text)
    }

    pub async fn run_flow(&self) -> HarnessResult<()> {
        self.open().await?;
        self.search(TEST_STREET_NAME).await?;
        self.expand_details().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggestion_selector_embeds_the_street() {
        let s = StreetPage::suggestion(TEST_STREET_NAME);
        match s {
            Selector::XPath(x) => assert!(x.contains(TEST_STREET_NAME)),
            _ => unreachable!(),
        }
    }
}
