//! MuniQA browser-automation harness
//!
//! Reusable layer below the page objects: one WebDriver session, explicit
//! waits, a bounded retry combinator, and the link-verification protocol the
//! whole suite is built around.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                    muniqa-harness                        │
//! ├──────────────────────────────────────────────────────────┤
//! │  Session (fantoccini::Client)                            │
//! │    ├── find(&Selector) / waits (visible, gone, url)      │
//! │    ├── enter_text() with controlled-input fallback       │
//! │    └── enter_new_window() -> WindowGuard                 │
//! │          └── close_and_return()   // invariant holder    │
//! ├──────────────────────────────────────────────────────────┤
//! │  LinkChecker                                             │
//! │    ├── href fast pass (no navigation)                    │
//! │    ├── click -> new window -> URL compare -> close       │
//! │    └── LinkOutcome + LinkPolicy -> Verdict               │
//! ├──────────────────────────────────────────────────────────┤
//! │  retry::{RetryPolicy, retry, wait_until}                 │
//! │  norm::{normalize_url, url_part_matches}                 │
//! │  text::normalize_label                                   │
//! │  ScreenshotSink (failure PNGs)                           │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod linkcheck;
pub mod norm;
pub mod retry;
pub mod screenshot;
pub mod selector;
pub mod session;
pub mod tabs;
pub mod text;
pub mod window;

pub use config::{PortalConfig, UserData};
pub use error::{HarnessError, HarnessResult};
pub use linkcheck::{LinkChecker, LinkExpectation, LinkOutcome, LinkPolicy, LinkReport, Verdict};
pub use retry::{retry, wait_until, RetryPolicy};
pub use screenshot::ScreenshotSink;
pub use selector::Selector;
pub use session::{Session, SessionConfig};
pub use tabs::{switch_tab, switch_tab_via_url, TabStrategy};
pub use window::WindowGuard;

/// Harness version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
