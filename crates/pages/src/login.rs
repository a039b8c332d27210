//! Login page
//!
//! Two entry paths into an authenticated state: the standalone login page
//! with its one-time-code flow (the code is typed by a human watching the
//! run), and the password form the education section shows inside a modal
//! iframe.

use std::time::Duration;

use tracing::info;

use muniqa_harness::{HarnessResult, Selector, Session};

pub struct LoginPage<'a> {
    session: &'a Session,
    url: String,
}

impl<'a> LoginPage<'a> {
    pub fn new(session: &'a Session, url: impl Into<String>) -> Self {
        Self {
            session,
            url: url.into(),
        }
    }

    fn id_field() -> Selector {
        Selector::Name("tz".into())
    }

    fn phone_field() -> Selector {
        Selector::Name("phone".into())
    }

    fn otp_field() -> Selector {
        Selector::Name("code".into())
    }

    fn send_code_button() -> Selector {
        Selector::XPath("//button[text()='שלח לי קוד חד פעמי']".into())
    }

    /// Navigate to the login page, fill identity and phone, request the
    /// one-time code.
    pub async fn request_otp(&self, id_number: &str, phone: &str) -> HarnessResult<()> {
        self.session.goto(&self.url).await?;
        self.session.enter_text(&Self::id_field(), id_number).await?;
        self.session.enter_text(&Self::phone_field(), phone).await?;
        self.session.click(&Self::send_code_button()).await?;
        info!("one-time code requested");
        Ok(())
    }

    /// Wait for a human to type the one-time code in the browser, then for
    /// the navigation to the logged-in landing page.
    pub async fn wait_for_manual_otp(&self, home_url_part: &str) -> HarnessResult<()> {
        self.session
            .wait_for_visible(&Self::otp_field(), self.session.default_timeout())
            .await?;
        info!("waiting for the one-time code to be typed in the browser");

        // The OTP field disappearing is the navigation signal.
        self.session
            .wait_for_invisible(&Self::otp_field(), Duration::from_secs(60))
            .await?;
        self.session
            .wait_for_url_contains(home_url_part, Duration::from_secs(20))
            .await?;
        info!("login confirmed");
        Ok(())
    }

    /// Password login inside the education section's modal iframe. The
    /// caller has already entered the frame.
    pub async fn login_in_modal(&self, id_number: &str, password: &str) -> HarnessResult<()> {
        self.session.enter_text(&Self::id_field(), id_number).await?;
        self.session
            .enter_text(&Selector::Css("input[type='password']".into()), password)
            .await?;
        self.session
            .click(&Selector::XPath(
                "//button[contains(text(), 'התחברות') or contains(text(), 'כניסה')]".into(),
            ))
            .await?;
        Ok(())
    }
}
