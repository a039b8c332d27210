//! Live-browser tests
//!
//! Requires a running WebDriver; set MUNIQA_WEBDRIVER_URL to enable, e.g.
//! `MUNIQA_WEBDRIVER_URL=http://localhost:9515 cargo test -p muniqa-harness --test live`.
//! Skips cleanly when the variable is absent.

use std::time::Duration;

use muniqa_harness::{Session, SessionConfig};

fn webdriver_url() -> Option<String> {
    std::env::var("MUNIQA_WEBDRIVER_URL").ok()
}

async fn connect() -> Option<Session> {
    let Some(url) = webdriver_url() else {
        eprintln!("MUNIQA_WEBDRIVER_URL not set; skipping live test");
        return None;
    };
    let config = SessionConfig {
        webdriver_url: url,
        ..SessionConfig::default()
    };
    Some(Session::connect(config).await.expect("session connects"))
}

#[tokio::test]
async fn session_opens_navigates_and_screenshots() {
    let Some(session) = connect().await else {
        return;
    };

    session.goto("about:blank").await.expect("navigation works");
    let url = session.current_url().await.expect("url readable");
    assert_eq!(url, "about:blank");

    let windows = session.windows().await.expect("handles readable");
    assert_eq!(windows.len(), 1);

    let dir = tempfile::tempdir().expect("tempdir");
    let shot = dir.path().join("blank.png");
    session.screenshot_to(&shot).await.expect("screenshot");
    assert!(shot.exists());

    session.close().await.expect("session closes");
}

#[tokio::test]
async fn window_guard_restores_the_handle_set() {
    let Some(session) = connect().await else {
        return;
    };
    session.goto("about:blank").await.expect("navigation works");

    let before = session.window_snapshot().await.expect("handles readable");
    assert_eq!(before.len(), 1);

    session
        .execute("window.open('about:blank');", vec![])
        .await
        .expect("window.open runs");
    let guard = session
        .enter_new_window(&before, "opened tab", Duration::from_secs(5))
        .await
        .expect("new window focused");
    assert_eq!(
        session.windows().await.expect("handles readable").len(),
        2
    );

    guard.close_and_return().await.expect("window closed");
    let after = session.windows().await.expect("handles readable");
    assert_eq!(after.len(), before.len());
    assert_eq!(
        session.current_window().await.expect("handle readable"),
        before[0]
    );

    session.close().await.expect("session closes");
}

#[tokio::test]
async fn extra_windows_beyond_the_first_are_closed() {
    let Some(session) = connect().await else {
        return;
    };
    session.goto("about:blank").await.expect("navigation works");

    let before = session.window_snapshot().await.expect("handles readable");
    session
        .execute(
            "window.open('about:blank'); window.open('about:blank');",
            vec![],
        )
        .await
        .expect("window.open runs");

    // Two windows appeared; only the guarded one may survive.
    let guard = session
        .enter_new_window(&before, "opened tab", Duration::from_secs(5))
        .await
        .expect("new window focused");
    assert_eq!(
        session.windows().await.expect("handles readable").len(),
        before.len() + 1
    );

    guard.close_and_return().await.expect("window closed");
    assert_eq!(
        session.windows().await.expect("handles readable").len(),
        before.len()
    );

    session.close().await.expect("session closes");
}
