//! The link-verification protocol
//!
//! One deterministic contract for every (label, expected-URL-part) pair:
//!
//! 1. locate the element by normalized visible text;
//! 2. fast pass on the `href` attribute when it already satisfies the
//!    expectation (no navigation);
//! 3. otherwise click, wait for exactly one new window, verify its URL, close
//!    it and return focus;
//! 4. classify whatever happened into a [`LinkOutcome`] and map it to a
//!    [`Verdict`] through an explicit [`LinkPolicy`].
//!
//! The fast pass and the click path agree by construction: both compare
//! through [`crate::norm::url_part_matches`].

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{HarnessError, HarnessResult};
use crate::norm::url_part_matches;
use crate::retry::{retry, RetryPolicy};
use crate::screenshot::ScreenshotSink;
use crate::selector::Selector;
use crate::session::Session;

/// A visible link/button text fragment and the URL substring its navigation
/// target is expected to contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LinkExpectation {
    pub label: &'static str,
    pub url_part: &'static str,
}

impl LinkExpectation {
    pub const fn new(label: &'static str, url_part: &'static str) -> Self {
        Self { label, url_part }
    }
}

/// What actually happened when a link was checked.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LinkOutcome {
    /// The `href` attribute already contained the expected part.
    PassedHref,
    /// A new window opened and its URL contained the expected part.
    PassedClick,
    /// The click navigated the current window instead of opening a new one.
    SameWindow { url: String, url_matched: bool },
    /// A new window opened but its URL never contained the expected part.
    UrlMismatch { expected: String, actual: String },
    /// No element matched the label.
    NotFound,
    /// The click produced neither a new window nor a navigation.
    ClickFailed { reason: String },
}

/// Severity of a link check result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Pass,
    Warn,
    Fail,
}

/// Explicit severity policy for the ambiguous outcomes.
///
/// Defaults: a redirect-style URL mismatch after a successful open is a
/// warning; a link that navigates in place but reaches the right URL is a
/// warning (the portal should have opened a tab); in-place navigation to the
/// wrong URL is a failure. Element-not-found and click failures are always
/// failures.
#[derive(Debug, Clone, Copy)]
pub struct LinkPolicy {
    pub url_mismatch: Verdict,
    pub same_window_matched: Verdict,
    pub same_window_mismatched: Verdict,
}

impl Default for LinkPolicy {
    fn default() -> Self {
        Self {
            url_mismatch: Verdict::Warn,
            same_window_matched: Verdict::Warn,
            same_window_mismatched: Verdict::Fail,
        }
    }
}

impl LinkPolicy {
    /// A policy where any URL deviation is a hard failure.
    pub fn strict() -> Self {
        Self {
            url_mismatch: Verdict::Fail,
            same_window_matched: Verdict::Fail,
            same_window_mismatched: Verdict::Fail,
        }
    }

    pub fn verdict(&self, outcome: &LinkOutcome) -> Verdict {
        match outcome {
            LinkOutcome::PassedHref | LinkOutcome::PassedClick => Verdict::Pass,
            LinkOutcome::UrlMismatch { .. } => self.url_mismatch,
            LinkOutcome::SameWindow { url_matched: true, .. } => self.same_window_matched,
            LinkOutcome::SameWindow { url_matched: false, .. } => self.same_window_mismatched,
            LinkOutcome::NotFound | LinkOutcome::ClickFailed { .. } => Verdict::Fail,
        }
    }
}

/// Result of one link check.
#[derive(Debug, Clone, Serialize)]
pub struct LinkReport {
    pub label: String,
    pub expected_part: String,
    pub outcome: LinkOutcome,
    pub verdict: Verdict,
    pub duration_ms: u64,
    pub screenshot: Option<PathBuf>,
}

/// Runs the verification protocol against one session.
pub struct LinkChecker<'a> {
    session: &'a Session,
    policy: LinkPolicy,
    screenshots: Option<&'a ScreenshotSink>,
    find_timeout: Duration,
    window_timeout: Duration,
    url_timeout: Duration,
    retry_policy: RetryPolicy,
}

impl<'a> LinkChecker<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self {
            session,
            policy: LinkPolicy::default(),
            screenshots: None,
            find_timeout: session.default_timeout(),
            window_timeout: Duration::from_secs(8),
            url_timeout: Duration::from_secs(15),
            retry_policy: RetryPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: LinkPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_screenshots(mut self, sink: &'a ScreenshotSink) -> Self {
        self.screenshots = Some(sink);
        self
    }

    /// Bound for locating the element; fast-check pages use a short one.
    pub fn with_find_timeout(mut self, timeout: Duration) -> Self {
        self.find_timeout = timeout;
        self
    }

    /// Verify every expectation in order, continuing past failures.
    pub async fn verify_all(&self, expectations: &[LinkExpectation]) -> Vec<LinkReport> {
        let mut reports = Vec::with_capacity(expectations.len());
        for exp in expectations {
            reports.push(self.verify(exp).await);
        }
        reports
    }

    /// Verify one expectation using the generic text locator.
    pub async fn verify(&self, exp: &LinkExpectation) -> LinkReport {
        let selector = Selector::link_with_text(exp.label);
        self.verify_with_selector(&selector, exp).await
    }

    /// Verify one expectation with a caller-supplied locator (for elements
    /// the generic text match cannot reach).
    pub async fn verify_with_selector(
        &self,
        selector: &Selector,
        exp: &LinkExpectation,
    ) -> LinkReport {
        let start = std::time::Instant::now();
        let windows_before = self.session.window_snapshot().await.unwrap_or_default();

        let outcome = match self.run_protocol(selector, exp).await {
            Ok(outcome) => outcome,
            Err(e) => LinkOutcome::ClickFailed {
                reason: e.to_string(),
            },
        };
        let verdict = self.policy.verdict(&outcome);

        // Post-condition: the handle set must be back at its pre-check size.
        // Close anything that survived the protocol so the stray windows do
        // not poison the next check's handle diff.
        if let Ok(windows_after) = self.session.window_snapshot().await {
            let extras: Vec<_> = windows_after
                .into_iter()
                .filter(|h| !windows_before.contains(h))
                .collect();
            if !extras.is_empty() {
                warn!(
                    "'{}' left {} extra window(s) open, closing",
                    exp.label,
                    extras.len()
                );
                let focused = self.session.current_window().await.ok();
                for extra in extras {
                    if self.session.client().switch_to_window(extra).await.is_ok() {
                        let _ = self.session.client().close_window().await;
                    }
                }
                if let Some(handle) = focused.filter(|h| windows_before.contains(h)) {
                    let _ = self.session.client().switch_to_window(handle).await;
                }
            }
        }

        let screenshot = match (verdict, self.screenshots) {
            (Verdict::Fail, Some(sink)) => sink.capture(self.session, exp.label).await,
            _ => None,
        };

        match verdict {
            Verdict::Pass => info!("✓ {}", exp.label),
            Verdict::Warn => warn!("△ {} — {:?}", exp.label, outcome),
            Verdict::Fail => warn!("✗ {} — {:?}", exp.label, outcome),
        }

        LinkReport {
            label: exp.label.to_string(),
            expected_part: exp.url_part.to_string(),
            outcome,
            verdict,
            duration_ms: start.elapsed().as_millis() as u64,
            screenshot,
        }
    }

    async fn run_protocol(
        &self,
        selector: &Selector,
        exp: &LinkExpectation,
    ) -> HarnessResult<LinkOutcome> {
        debug!("checking link '{}'", exp.label);

        // Locate + read href under retry; the portal re-renders tables and
        // stale references are routine.
        let located = retry(self.retry_policy, exp.label, || async {
            let el = self
                .session
                .wait_for_present(selector, self.find_timeout)
                .await?;
            let href = el.attr("href").await?;
            Ok((el, href))
        })
        .await;

        let (el, href) = match located {
            Ok(found) => found,
            Err(HarnessError::ElementNotFound { .. }) | Err(HarnessError::Timeout { .. }) => {
                return Ok(LinkOutcome::NotFound);
            }
            Err(e) => return Err(e),
        };

        if href_satisfies(href.as_deref(), exp.url_part) {
            return Ok(LinkOutcome::PassedHref);
        }

        // Click path.
        let url_before = self.session.current_url().await?;
        let windows_before = self.session.window_snapshot().await?;

        self.session.scroll_into_view(&el).await?;
        tokio::time::sleep(Duration::from_millis(200)).await;
        if let Err(e) = el.click().await {
            debug!("native click failed ({}), trying script click", e);
            self.session.js_click(&el).await?;
        }

        match self
            .session
            .enter_new_window(&windows_before, exp.label, self.window_timeout)
            .await
        {
            Ok(guard) => {
                let matched = self
                    .session
                    .wait_for_url_contains(exp.url_part, self.url_timeout)
                    .await
                    .is_ok();
                let actual = self.session.current_url().await.unwrap_or_default();
                guard.close_and_return().await?;

                if matched {
                    Ok(LinkOutcome::PassedClick)
                } else {
                    Ok(LinkOutcome::UrlMismatch {
                        expected: exp.url_part.to_string(),
                        actual,
                    })
                }
            }
            Err(HarnessError::NoNewWindow { .. }) => {
                let url_now = self.session.current_url().await?;
                if url_now != url_before {
                    let url_matched = url_part_matches(&url_now, exp.url_part);
                    self.session.back().await?;
                    Ok(LinkOutcome::SameWindow {
                        url: url_now,
                        url_matched,
                    })
                } else {
                    Ok(LinkOutcome::ClickFailed {
                        reason: "no new window and no navigation".to_string(),
                    })
                }
            }
            Err(e) => Err(e),
        }
    }
}

/// The fast pass: does the element's own `href` already satisfy the
/// expectation? Only absolute links count; `javascript:` handlers and
/// fragment stubs must go through the click path.
pub fn href_satisfies(href: Option<&str>, expected_part: &str) -> bool {
    match href {
        Some(h) if h.contains("http") => url_part_matches(h, expected_part),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fast_pass_on_matching_absolute_href() {
        // Example pair from the enforcement table.
        assert!(href_satisfies(
            Some("https://city4u.co.il/PortalServicesSite/cityPay/283000/mislaka/77"),
            "cityPay/283000/mislaka/77"
        ));
    }

    #[test]
    fn no_fast_pass_without_href() {
        assert!(!href_satisfies(None, "cityPay/283000/mislaka/77"));
    }

    #[test]
    fn no_fast_pass_on_javascript_href() {
        assert!(!href_satisfies(Some("javascript:void(0)"), "cityPay"));
    }

    #[test]
    fn no_fast_pass_on_wrong_target() {
        assert!(!href_satisfies(
            Some("https://city4u.co.il/PortalServicesSite/cityPay/283000/mislaka/78"),
            "cityPay/283000/mislaka/77"
        ));
    }

    #[test]
    fn fast_pass_handles_percent_encoding() {
        assert!(href_satisfies(
            Some("https://example.muni.il/Documents/%D7%98%D7%95%D7%A4%D7%A1.pdf"),
            "Documents/טופס.pdf"
        ));
    }

    #[test]
    fn default_policy_maps_outcomes() {
        let policy = LinkPolicy::default();
        assert_eq!(policy.verdict(&LinkOutcome::PassedHref), Verdict::Pass);
        assert_eq!(policy.verdict(&LinkOutcome::PassedClick), Verdict::Pass);
        assert_eq!(policy.verdict(&LinkOutcome::NotFound), Verdict::Fail);
        assert_eq!(
            policy.verdict(&LinkOutcome::UrlMismatch {
                expected: "a".into(),
                actual: "b".into()
            }),
            Verdict::Warn
        );
        assert_eq!(
            policy.verdict(&LinkOutcome::SameWindow {
                url: "x".into(),
                url_matched: true
            }),
            Verdict::Warn
        );
        assert_eq!(
            policy.verdict(&LinkOutcome::SameWindow {
                url: "x".into(),
                url_matched: false
            }),
            Verdict::Fail
        );
    }

    #[test]
    fn strict_policy_escalates_mismatches() {
        let policy = LinkPolicy::strict();
        assert_eq!(
            policy.verdict(&LinkOutcome::UrlMismatch {
                expected: "a".into(),
                actual: "b".into()
            }),
            Verdict::Fail
        );
    }

    #[test]
    fn report_serializes_outcome_tag() {
        let report = LinkReport {
            label: "תשלום דו".into(),
            expected_part: "cityPay/283000/mislaka/77".into(),
            outcome: LinkOutcome::PassedHref,
            verdict: Verdict::Pass,
            duration_ms: 12,
            screenshot: None,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["outcome"]["kind"], "passed_href");
        assert_eq!(json["verdict"], "pass");
    }
}
