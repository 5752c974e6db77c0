//! # Validation Sessions
//!
//! Compiled schemas are shared between runs and threads, so they cannot
//! hold per-run state. Findings that must not travel through the engine's
//! error channel (format warnings) are written to the session active on the
//! current thread instead. The orchestrator opens a session around one
//! engine run and drains it afterwards.
//!
//! A session is installed for the duration of one run only; nothing it
//! records survives into the next run, whatever the outcome of this one.

use std::cell::RefCell;

use oasv_core::Finding;

thread_local! {
    static ACTIVE: RefCell<Option<Vec<Finding>>> = const { RefCell::new(None) };
}

/// Guard for the session active on this thread.
///
/// Dropping the guard without [`ValidationSession::finish`] discards what
/// was recorded. Sessions nest: the enclosing session is restored on drop.
pub(crate) struct ValidationSession {
    enclosing: Option<Vec<Finding>>,
}

impl ValidationSession {
    /// Install an empty session on the current thread.
    pub(crate) fn begin() -> Self {
        let enclosing = ACTIVE.with(|active| active.replace(Some(Vec::new())));
        Self { enclosing }
    }

    /// Take everything recorded, in recording order.
    pub(crate) fn finish(self) -> Vec<Finding> {
        ACTIVE
            .with(|active| active.borrow_mut().take())
            .unwrap_or_default()
    }
}

impl Drop for ValidationSession {
    fn drop(&mut self) {
        let enclosing = self.enclosing.take();
        ACTIVE.with(|active| *active.borrow_mut() = enclosing);
    }
}

/// Record a finding in the active session.
///
/// A finding equal in location, key and severity to one already recorded is
/// dropped, as the engine may visit the same instance through more than one
/// path. Returns `false` when no session is active.
pub(crate) fn record(finding: Finding) -> bool {
    ACTIVE.with(|active| match active.borrow_mut().as_mut() {
        Some(findings) => {
            let duplicate = findings.iter().any(|f| {
                f.instance_path == finding.instance_path
                    && f.key == finding.key
                    && f.severity == finding.severity
            });
            if !duplicate {
                findings.push(finding);
            }
            true
        }
        None => false,
    })
}
