//! New-window detection and the focus-restore invariant
//!
//! An external-link click must open at most one new window, and that window
//! must be closed with focus returned to the original handle before the next
//! check runs. [`WindowGuard`] owns both handles so the only way forward is
//! [`WindowGuard::close_and_return`].

use std::time::Duration;

use fantoccini::wd::WindowHandle;
use tracing::{debug, warn};

use crate::error::{HarnessError, HarnessResult};
use crate::retry::wait_until;
use crate::session::Session;

/// Focus held in a freshly opened window.
#[must_use = "call close_and_return() to restore the original window"]
pub struct WindowGuard {
    client: fantoccini::Client,
    original: WindowHandle,
    opened: WindowHandle,
    done: bool,
}

impl Session {
    /// Handle set before a click, for [`Session::enter_new_window`].
    pub async fn window_snapshot(&self) -> HarnessResult<Vec<WindowHandle>> {
        self.windows().await
    }

    /// Wait for a window beyond `before` to appear, switch focus to it, and
    /// return a guard that restores the previous state. Should the click spawn
    /// more than one window, the extras are closed on the spot, keeping the
    /// handle set at exactly `before` plus the guarded window.
    ///
    /// `label` only decorates the error when nothing opens.
    pub async fn enter_new_window(
        &self,
        before: &[WindowHandle],
        label: &str,
        timeout: Duration,
    ) -> HarnessResult<WindowGuard> {
        let original = self.current_window().await?;

        wait_until(
            timeout,
            self.config().poll_interval,
            &format!("new window after clicking '{label}'"),
            || async { Ok(self.windows().await?.len() > before.len()) },
        )
        .await
        .map_err(|_| HarnessError::NoNewWindow {
            label: label.to_string(),
        })?;

        let handles = self.windows().await?;
        let mut fresh: Vec<WindowHandle> = handles
            .into_iter()
            .filter(|h| !before.contains(h))
            .collect();
        if fresh.is_empty() {
            return Err(HarnessError::NoNewWindow {
                label: label.to_string(),
            });
        }
        let opened = fresh.remove(0);

        // Exactly one new window per click; close anything beyond that so
        // the handle set stays accountable for the next check.
        for extra in fresh {
            warn!("'{}' opened more than one window, closing the extra", label);
            self.client().switch_to_window(extra).await?;
            self.client().close_window().await?;
        }

        self.client().switch_to_window(opened.clone()).await?;
        debug!("focused new window for '{}'", label);

        Ok(WindowGuard {
            client: self.client().clone(),
            original,
            opened,
            done: false,
        })
    }
}

impl WindowGuard {
    /// Handle of the newly opened window.
    pub fn opened(&self) -> &WindowHandle {
        &self.opened
    }

    /// Close the new window and refocus the original one. This restores the
    /// handle set to its pre-click cardinality.
    pub async fn close_and_return(mut self) -> HarnessResult<()> {
        self.done = true;
        // close_window closes the currently focused window, which is the one
        // this guard opened.
        self.client.close_window().await?;
        self.client.switch_to_window(self.original.clone()).await?;
        Ok(())
    }

    /// Best-effort recovery when verification inside the new window failed:
    /// same as [`Self::close_and_return`] but never errors, so cleanup can run
    /// in failure paths.
    pub async fn abandon(mut self) {
        self.done = true;
        if let Err(e) = self.client.close_window().await {
            warn!("could not close extra window: {}", e);
        }
        if let Err(e) = self.client.switch_to_window(self.original.clone()).await {
            warn!("could not refocus original window: {}", e);
        }
    }
}

impl Drop for WindowGuard {
    fn drop(&mut self) {
        // Async cleanup cannot run here; leaving the guard unresolved means a
        // stray window stays open and focus is wrong for the next check.
        if !self.done {
            warn!("WindowGuard dropped without close_and_return(); a browser window may be left open");
        }
    }
}
