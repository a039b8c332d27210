//! Failure screenshots
//!
//! Diagnostic PNGs written when a link check fails, named by sanitized link
//! label and timestamp. Nothing reads them programmatically.

use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::{info, warn};

use crate::error::HarnessResult;
use crate::session::Session;

/// Writes failure screenshots under one directory.
#[derive(Debug, Clone)]
pub struct ScreenshotSink {
    dir: PathBuf,
}

impl ScreenshotSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Capture the current page for a failed check. Screenshot failures are
    /// logged, never propagated: diagnostics must not fail the run.
    pub async fn capture(&self, session: &Session, label: &str) -> Option<PathBuf> {
        match self.try_capture(session, label).await {
            Ok(path) => {
                info!("screenshot saved: {}", path.display());
                Some(path)
            }
            Err(e) => {
                warn!("failed to save screenshot for '{}': {}", label, e);
                None
            }
        }
    }

    async fn try_capture(&self, session: &Session, label: &str) -> HarnessResult<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;
        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let path = self
            .dir
            .join(format!("err_{}_{}.png", sanitize_label(label), timestamp));
        session.screenshot_to(&path).await?;
        Ok(path)
    }
}

/// Keep alphanumerics (any script), replace everything else with `_`.
pub fn sanitize_label(label: &str) -> String {
    label
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_keeps_hebrew_letters() {
        assert_eq!(sanitize_label("תשלום דו\"ח"), "תשלום_דו_ח");
    }

    #[test]
    fn sanitize_replaces_path_hazards() {
        assert_eq!(sanitize_label("a/b\\c:d"), "a_b_c_d");
    }

    #[test]
    fn sink_remembers_directory() {
        let sink = ScreenshotSink::new("shots");
        assert_eq!(sink.dir(), Path::new("shots"));
    }
}
