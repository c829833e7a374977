//! # Filters
//!
//! A [`Filter`] is a toggle-able, observable row predicate. Two kinds exist:
//!
//! - [`PredicateFilter`]: a leaf whose predicate can be replaced at any time
//!   (one per column editor).
//! - [`ComposedFilter`]: a set of filters combined by a [`Combinator`]
//!   ([`And`], [`Or`], [`Not`]) that itself behaves as a single filter.
//!
//! ## Notifications
//!
//! Observers receive a [`FilterEvent`] describing *what* changed:
//!
//! | change | meaning |
//! |--------|---------|
//! | `Enabled` / `Disabled` | the filter's enabled flag flipped |
//! | `Updated` | the predicate content changed, the flag did not |
//!
//! Composites forward the child change that caused their own event, so an
//! observer of the composite can still tell which column changed. Observers
//! are held weakly and notified in registration order.
//!
//! A disabled filter is a pass-through: callers skip it entirely, which is why
//! `include` itself does not consult the flag.

mod composed;
mod predicate;

pub use composed::{And, AndFilter, Combinator, ComposedFilter, Not, NotFilter, Or, OrFilter};
pub use predicate::{Predicate, PredicateFilter};

use crate::model::RowEntry;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

/// Identity of a filter instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FilterId(u64);

impl FilterId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        FilterId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterChange {
    Enabled,
    Disabled,
    Updated,
}

impl FilterChange {
    /// True for enabled-flag transitions, false for content updates.
    pub fn is_transition(self) -> bool {
        !matches!(self, FilterChange::Updated)
    }
}

/// The child change a composite is reacting to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildChange {
    pub filter: FilterId,
    pub change: FilterChange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterEvent {
    pub source: FilterId,
    pub change: FilterChange,
    /// Set when `source` is a composite reacting to one of its children.
    pub child: Option<ChildChange>,
}

pub trait FilterObserver {
    fn filter_updated(&self, event: &FilterEvent);
}

/// A toggle-able, observable row predicate.
pub trait Filter {
    fn id(&self) -> FilterId;

    /// Whether `row` passes. Must not have side effects.
    fn include(&self, row: &dyn RowEntry) -> bool;

    fn is_enabled(&self) -> bool;

    /// No-op when unchanged; otherwise flips the flag and notifies observers.
    fn set_enabled(&self, enabled: bool);

    /// Registers an observer. Registering the same observer twice is a no-op.
    fn add_observer(&self, observer: Weak<dyn FilterObserver>);

    fn remove_observer(&self, observer: &Weak<dyn FilterObserver>);
}

/// Shared handle to any filter.
pub type FilterRef = Rc<dyn Filter>;

/// Identity, enabled flag and observer list shared by every filter kind.
pub struct FilterCore {
    id: FilterId,
    enabled: Cell<bool>,
    observers: RefCell<Vec<Weak<dyn FilterObserver>>>,
}

impl Default for FilterCore {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterCore {
    pub fn new() -> Self {
        Self {
            id: FilterId::next(),
            enabled: Cell::new(true),
            observers: RefCell::new(Vec::new()),
        }
    }

    pub fn id(&self) -> FilterId {
        self.id
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    /// Stores the flag, returning true if it changed. Does not notify.
    pub fn replace_enabled(&self, enabled: bool) -> bool {
        self.enabled.replace(enabled) != enabled
    }

    /// Flips the flag and notifies when it changed.
    pub fn set_enabled(&self, enabled: bool) {
        if self.replace_enabled(enabled) {
            self.notify(transition(enabled), None);
        }
    }

    pub fn add_observer(&self, observer: Weak<dyn FilterObserver>) {
        let mut observers = self.observers.borrow_mut();
        if !observers.iter().any(|o| Weak::ptr_eq(o, &observer)) {
            observers.push(observer);
        }
    }

    pub fn remove_observer(&self, observer: &Weak<dyn FilterObserver>) {
        self.observers
            .borrow_mut()
            .retain(|o| !Weak::ptr_eq(o, observer));
    }

    pub fn observer_count(&self) -> usize {
        self.observers.borrow().iter().filter(|o| o.strong_count() > 0).count()
    }

    /// Notifies every live observer, in registration order.
    ///
    /// The list is snapshotted first: observers may register or unregister
    /// while being notified.
    pub fn notify(&self, change: FilterChange, child: Option<ChildChange>) {
        let event = FilterEvent {
            source: self.id,
            change,
            child,
        };
        let live: Vec<Rc<dyn FilterObserver>> = {
            let mut observers = self.observers.borrow_mut();
            observers.retain(|o| o.strong_count() > 0);
            let live = observers.iter().filter_map(Weak::upgrade).collect();
            live
        };
        for observer in live {
            observer.filter_updated(&event);
        }
    }
}

pub(crate) fn transition(enabled: bool) -> FilterChange {
    if enabled {
        FilterChange::Enabled
    } else {
        FilterChange::Disabled
    }
}
