use super::Inner;
use std::rc::Rc;

/// Holds change notifications back while alive.
///
/// Guards nest. Filter changes made while any guard is alive are remembered,
/// and the effective filter is re-applied once, when the last guard drops.
#[must_use = "notifications resume as soon as the guard is dropped"]
pub struct NotificationGuard {
    inner: Rc<Inner>,
}

impl NotificationGuard {
    pub(super) fn new(inner: &Rc<Inner>) -> Self {
        inner.suppress();
        Self {
            inner: inner.clone(),
        }
    }
}

impl Drop for NotificationGuard {
    fn drop(&mut self) {
        self.inner.resume();
    }
}
