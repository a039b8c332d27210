//! Browser session management
//!
//! One `Session` owns the suite's single WebDriver connection for its whole
//! run. All waits are bounded polls; there are no unbounded blocking calls.

use std::time::Duration;

use fantoccini::elements::Element;
use fantoccini::wd::WindowHandle;
use fantoccini::{Client, ClientBuilder};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::error::{HarnessError, HarnessResult};
use crate::retry::wait_until;
use crate::selector::Selector;

/// Configuration for connecting the browser session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// WebDriver endpoint (chromedriver / geckodriver / selenium grid)
    pub webdriver_url: String,

    /// Run the browser without a visible window
    pub headless: bool,

    /// Browser window size
    pub window_width: u32,
    pub window_height: u32,

    /// Default bound for element waits
    pub default_timeout: Duration,

    /// Poll interval for all bounded waits
    pub poll_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:9515".to_string(),
            headless: true,
            window_width: 1440,
            window_height: 900,
            default_timeout: Duration::from_secs(10),
            poll_interval: Duration::from_millis(250),
        }
    }
}

/// A live browser session.
pub struct Session {
    client: Client,
    config: SessionConfig,
}

impl Session {
    /// Check the WebDriver endpoint is reachable, then open a session.
    pub async fn connect(config: SessionConfig) -> HarnessResult<Self> {
        preflight(&config.webdriver_url).await?;

        let mut args = vec![
            "--no-sandbox".to_string(),
            "--disable-dev-shm-usage".to_string(),
            format!("--window-size={},{}", config.window_width, config.window_height),
        ];
        if config.headless {
            args.push("--headless=new".to_string());
        }

        let mut caps = serde_json::map::Map::new();
        caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));

        let client = ClientBuilder::native()
            .capabilities(caps)
            .connect(&config.webdriver_url)
            .await?;

        if let Err(e) = client
            .set_window_size(config.window_width, config.window_height)
            .await
        {
            debug!("could not set window size: {}", e);
        }

        info!("browser session open via {}", config.webdriver_url);
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The underlying fantoccini client, for operations the session does not
    /// wrap (window switching is in [`crate::window`]).
    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn default_timeout(&self) -> Duration {
        self.config.default_timeout
    }

    // --- navigation ---

    pub async fn goto(&self, url: &str) -> HarnessResult<()> {
        debug!("navigating to {}", url);
        self.client.goto(url).await?;
        Ok(())
    }

    pub async fn current_url(&self) -> HarnessResult<String> {
        Ok(self.client.current_url().await?.to_string())
    }

    pub async fn back(&self) -> HarnessResult<()> {
        self.client.back().await?;
        Ok(())
    }

    pub async fn refresh(&self) -> HarnessResult<()> {
        self.client.refresh().await?;
        Ok(())
    }

    // --- element lookup ---

    /// Single-attempt find. Any lookup failure is reported as
    /// [`HarnessError::ElementNotFound`] so callers can retry uniformly.
    pub async fn find(&self, selector: &Selector) -> HarnessResult<Element> {
        let lowered = selector.lowered();
        self.client
            .find(lowered.as_locator())
            .await
            .map_err(|_| HarnessError::ElementNotFound {
                selector: selector.to_string(),
            })
    }

    pub async fn find_all(&self, selector: &Selector) -> HarnessResult<Vec<Element>> {
        let lowered = selector.lowered();
        Ok(self.client.find_all(lowered.as_locator()).await?)
    }

    /// The first *displayed* element matching the selector, falling back to
    /// the last match if none is displayed (hidden duplicates are common in
    /// the portal's responsive layouts).
    pub async fn find_visible_or_last(&self, selector: &Selector) -> HarnessResult<Element> {
        let elements = self.find_all(selector).await?;
        if elements.is_empty() {
            return Err(HarnessError::ElementNotFound {
                selector: selector.to_string(),
            });
        }
        for el in &elements {
            if el.is_displayed().await.unwrap_or(false) {
                return Ok(el.clone());
            }
        }
        Ok(elements[elements.len() - 1].clone())
    }

    // --- waits ---

    /// Wait until the element exists and is displayed.
    pub async fn wait_for_visible(
        &self,
        selector: &Selector,
        timeout: Duration,
    ) -> HarnessResult<Element> {
        self.wait_for_element(selector, timeout, |el| async move {
            Ok(el.is_displayed().await?)
        })
        .await
    }

    /// Wait until the element is displayed and enabled.
    pub async fn wait_for_clickable(
        &self,
        selector: &Selector,
        timeout: Duration,
    ) -> HarnessResult<Element> {
        self.wait_for_element(selector, timeout, |el| async move {
            Ok(el.is_displayed().await? && el.is_enabled().await?)
        })
        .await
    }

    /// Wait until the element is present in the DOM, displayed or not.
    pub async fn wait_for_present(
        &self,
        selector: &Selector,
        timeout: Duration,
    ) -> HarnessResult<Element> {
        self.wait_for_element(selector, timeout, |_| async { Ok(true) })
            .await
    }

    async fn wait_for_element<F, Fut>(
        &self,
        selector: &Selector,
        timeout: Duration,
        condition: F,
    ) -> HarnessResult<Element>
    where
        F: Fn(Element) -> Fut,
        Fut: std::future::Future<Output = HarnessResult<bool>>,
    {
        wait_until(
            timeout,
            self.config.poll_interval,
            &selector.to_string(),
            || async {
                match self.find(selector).await {
                    Ok(el) => condition(el).await,
                    Err(_) => Ok(false),
                }
            },
        )
        .await
        .map_err(|_| HarnessError::ElementNotFound {
            selector: selector.to_string(),
        })?;
        self.find(selector).await
    }

    /// Wait until the element is gone, hidden, or fully transparent.
    ///
    /// The portal's frontend sometimes leaves a replaced tab's nodes attached
    /// but at opacity 0, so plain invisibility is not enough.
    pub async fn wait_for_invisible(
        &self,
        selector: &Selector,
        timeout: Duration,
    ) -> HarnessResult<()> {
        wait_until(
            timeout,
            self.config.poll_interval,
            &format!("invisibility of {selector}"),
            || async {
                let el = match self.find(selector).await {
                    Ok(el) => el,
                    Err(_) => return Ok(true), // detached
                };
                if !el.is_displayed().await.unwrap_or(false) {
                    return Ok(true);
                }
                let opacity = self
                    .execute(
                        "return window.getComputedStyle(arguments[0]).opacity;",
                        vec![serde_json::to_value(&el)?],
                    )
                    .await?;
                Ok(opacity.as_str() == Some("0"))
            },
        )
        .await
    }

    /// Wait until the current URL contains `part` (normalized comparison).
    pub async fn wait_for_url_contains(&self, part: &str, timeout: Duration) -> HarnessResult<()> {
        wait_until(
            timeout,
            self.config.poll_interval,
            &format!("url containing '{part}'"),
            || async {
                let url = self.current_url().await?;
                Ok(crate::norm::url_part_matches(&url, part))
            },
        )
        .await
    }

    // --- interaction ---

    /// Wait for the element to be clickable, then click it; falls back to a
    /// script-injected click when the native one is intercepted by an overlay.
    pub async fn click(&self, selector: &Selector) -> HarnessResult<()> {
        let el = self
            .wait_for_clickable(selector, self.config.default_timeout)
            .await?;
        if let Err(e) = el.click().await {
            debug!("native click on {} failed ({}), using script click", selector, e);
            self.js_click(&el).await?;
        }
        Ok(())
    }

    /// Script-injected click, for elements native clicks cannot reach.
    pub async fn js_click(&self, el: &Element) -> HarnessResult<()> {
        self.execute("arguments[0].click();", vec![serde_json::to_value(el)?])
            .await?;
        Ok(())
    }

    pub async fn scroll_into_view(&self, el: &Element) -> HarnessResult<()> {
        self.execute(
            "arguments[0].scrollIntoView({block: 'center'});",
            vec![serde_json::to_value(el)?],
        )
        .await?;
        Ok(())
    }

    /// Clear the field and type `text`, verifying the value actually landed.
    ///
    /// The portal's controlled inputs occasionally swallow synthetic key
    /// events; when readback differs, the value is set directly and an
    /// `input` event dispatched so the frontend state updates.
    pub async fn enter_text(&self, selector: &Selector, text: &str) -> HarnessResult<()> {
        let el = self
            .wait_for_visible(selector, self.config.default_timeout)
            .await?;
        el.clear().await?;
        el.send_keys(text).await?;

        let value = el.prop("value").await?.unwrap_or_default();
        if value != text {
            warn!("typed value did not stick on {}, setting via script", selector);
            self.execute(
                "arguments[0].value = arguments[1]; \
                 arguments[0].dispatchEvent(new Event('input', { bubbles: true }));",
                vec![serde_json::to_value(&el)?, json!(text)],
            )
            .await?;
        }
        Ok(())
    }

    pub async fn execute(
        &self,
        script: &str,
        args: Vec<serde_json::Value>,
    ) -> HarnessResult<serde_json::Value> {
        Ok(self.client.execute(script, args).await?)
    }

    // --- frames ---

    /// Enter the first iframe on the page, if any. Returns whether a frame
    /// was entered.
    pub async fn enter_first_iframe(&self) -> HarnessResult<bool> {
        let frames = self.find_all(&Selector::Tag("iframe".into())).await?;
        match frames.into_iter().next() {
            Some(frame) => {
                frame.enter_frame().await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Return to the parent browsing context. The suite only ever nests one
    /// iframe deep, so this lands back at the top-level document.
    pub async fn exit_frame(&self) -> HarnessResult<()> {
        // Clones of the client share the underlying session.
        self.client.clone().enter_parent_frame().await?;
        Ok(())
    }

    // --- windows ---

    pub async fn windows(&self) -> HarnessResult<Vec<WindowHandle>> {
        Ok(self.client.windows().await?)
    }

    pub async fn current_window(&self) -> HarnessResult<WindowHandle> {
        Ok(self.client.window().await?)
    }

    // --- diagnostics ---

    /// Full-page PNG screenshot written to `path`.
    pub async fn screenshot_to(&self, path: &std::path::Path) -> HarnessResult<()> {
        let png = self.client.screenshot().await?;
        std::fs::write(path, png)?;
        Ok(())
    }

    /// End the session, closing the browser.
    pub async fn close(self) -> HarnessResult<()> {
        self.client.close().await?;
        Ok(())
    }
}

/// Confirm the WebDriver endpoint answers its status endpoint before we try
/// to open a session, so a missing driver is reported as setup failure.
async fn preflight(webdriver_url: &str) -> HarnessResult<()> {
    let status_url = format!("{}/status", webdriver_url.trim_end_matches('/'));
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(3))
        .build()
        .map_err(|e| HarnessError::DriverUnreachable {
            url: webdriver_url.to_string(),
            reason: e.to_string(),
        })?;

    match client.get(&status_url).send().await {
        Ok(resp) if resp.status().is_success() => Ok(()),
        Ok(resp) => Err(HarnessError::DriverUnreachable {
            url: webdriver_url.to_string(),
            reason: format!("status endpoint returned {}", resp.status()),
        }),
        Err(e) => Err(HarnessError::DriverUnreachable {
            url: webdriver_url.to_string(),
            reason: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_headless_chromedriver() {
        let config = SessionConfig::default();
        assert!(config.headless);
        assert_eq!(config.webdriver_url, "http://localhost:9515");
        assert_eq!(config.default_timeout, Duration::from_secs(10));
    }

    #[tokio::test]
    async fn preflight_reports_unreachable_driver() {
        // Port 1 is never a WebDriver.
        let err = preflight("http://127.0.0.1:1").await.unwrap_err();
        match err {
            HarnessError::DriverUnreachable { url, .. } => {
                assert_eq!(url, "http://127.0.0.1:1");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
