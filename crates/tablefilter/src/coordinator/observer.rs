use super::Inner;
use crate::filter::{FilterEvent, FilterObserver};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Outside observer of the per-column editors.
pub trait HeaderObserver {
    fn editor_created(&self, column: usize);
    fn editor_excluded(&self, column: usize);
    /// The column's filter changed content or enabled state.
    fn filter_updated(&self, column: usize);
}

/// Weakly held header observers, notified in registration order.
#[derive(Default)]
pub(super) struct HeaderObservers {
    list: RefCell<Vec<Weak<dyn HeaderObserver>>>,
}

impl HeaderObservers {
    pub fn add(&self, observer: Weak<dyn HeaderObserver>) {
        let mut list = self.list.borrow_mut();
        if !list.iter().any(|o| Weak::ptr_eq(o, &observer)) {
            list.push(observer);
        }
    }

    pub fn remove(&self, observer: &Weak<dyn HeaderObserver>) {
        self.list.borrow_mut().retain(|o| !Weak::ptr_eq(o, observer));
    }

    /// Live observers; callbacks may register or unregister observers.
    pub fn snapshot(&self) -> Vec<Rc<dyn HeaderObserver>> {
        let mut list = self.list.borrow_mut();
        list.retain(|o| o.strong_count() > 0);
        let live = list.iter().filter_map(Weak::upgrade).collect();
        live
    }
}

/// Subscribes the coordinator to its composite filter.
pub(super) struct CompositeListener {
    pub inner: Weak<Inner>,
}

impl FilterObserver for CompositeListener {
    fn filter_updated(&self, event: &FilterEvent) {
        if let Some(inner) = self.inner.upgrade() {
            inner.on_filter_event(event);
        }
    }
}
