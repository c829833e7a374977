use super::{
    transition, ChildChange, Filter, FilterChange, FilterCore, FilterEvent, FilterId,
    FilterObserver, FilterRef,
};
use crate::model::RowEntry;
use indexmap::IndexMap;
use std::cell::RefCell;
use std::collections::HashSet;
use std::marker::PhantomData;
use std::rc::{Rc, Weak};

/// How a composite combines the verdicts of its enabled children.
///
/// Disabled children must be skipped entirely.
pub trait Combinator: 'static {
    fn combine<'a>(filters: &mut dyn Iterator<Item = &'a FilterRef>, row: &dyn RowEntry) -> bool;
}

/// Row passes when every enabled child accepts it. No enabled child: passes.
pub struct And;

/// Row passes when any enabled child accepts it. No enabled child: passes.
pub struct Or;

/// Row passes when the enabled children, AND-combined, reject it.
/// No enabled child: passes.
pub struct Not;

impl Combinator for And {
    fn combine<'a>(filters: &mut dyn Iterator<Item = &'a FilterRef>, row: &dyn RowEntry) -> bool {
        filters.filter(|f| f.is_enabled()).all(|f| f.include(row))
    }
}

impl Combinator for Or {
    fn combine<'a>(filters: &mut dyn Iterator<Item = &'a FilterRef>, row: &dyn RowEntry) -> bool {
        let mut any_enabled = false;
        for filter in filters.filter(|f| f.is_enabled()) {
            if filter.include(row) {
                return true;
            }
            any_enabled = true;
        }
        !any_enabled
    }
}

impl Combinator for Not {
    fn combine<'a>(filters: &mut dyn Iterator<Item = &'a FilterRef>, row: &dyn RowEntry) -> bool {
        let mut enabled = filters.filter(|f| f.is_enabled()).peekable();
        if enabled.peek().is_none() {
            return true;
        }
        !enabled.all(|f| f.include(row))
    }
}

pub type AndFilter = ComposedFilter<And>;
pub type OrFilter = ComposedFilter<Or>;
pub type NotFilter = ComposedFilter<Not>;

/// A set of filters acting as one.
///
/// The composite observes every child. Its enabled flag is derived: with at
/// least one child, it is enabled iff some child is enabled. An empty
/// composite keeps whatever flag it was given.
///
/// The set of disabled children is cached so that a child toggling its flag
/// costs O(1) to classify, and the composite emits exactly one notification
/// per child change: a transition when its own flag flipped, an update
/// otherwise.
pub struct ComposedFilter<C: Combinator> {
    core: FilterCore,
    filters: RefCell<IndexMap<FilterId, FilterRef>>,
    disabled: RefCell<HashSet<FilterId>>,
    this: Weak<Self>,
    _combinator: PhantomData<C>,
}

impl<C: Combinator> ComposedFilter<C> {
    pub fn new() -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            core: FilterCore::new(),
            filters: RefCell::new(IndexMap::new()),
            disabled: RefCell::new(HashSet::new()),
            this: this.clone(),
            _combinator: PhantomData,
        })
    }

    pub fn with_filters(filters: impl IntoIterator<Item = FilterRef>) -> Rc<Self> {
        let composite = Self::new();
        composite.add_filters(filters);
        composite
    }

    fn as_observer(&self) -> Weak<dyn FilterObserver> {
        self.this.clone() as Weak<dyn FilterObserver>
    }

    pub fn add_filter(&self, filter: FilterRef) {
        self.add_filters([filter]);
    }

    /// Adds filters not already present, subscribing to each.
    pub fn add_filters(&self, filters: impl IntoIterator<Item = FilterRef>) {
        let mut added_enabled = false;
        let mut added = false;
        for filter in filters {
            let id = filter.id();
            let inserted = {
                let mut map = self.filters.borrow_mut();
                if map.contains_key(&id) {
                    false
                } else {
                    map.insert(id, filter.clone());
                    true
                }
            };
            if !inserted {
                continue;
            }
            filter.add_observer(self.as_observer());
            added = true;
            if filter.is_enabled() {
                added_enabled = true;
            } else {
                self.disabled.borrow_mut().insert(id);
            }
        }
        if !added {
            return;
        }

        let was_enabled = self.core.is_enabled();
        if added_enabled && !was_enabled {
            self.core.replace_enabled(true);
            self.core.notify(FilterChange::Enabled, None);
        } else if was_enabled && self.all_disabled() {
            self.core.replace_enabled(false);
            self.core.notify(FilterChange::Disabled, None);
        } else if added_enabled {
            self.core.notify(FilterChange::Updated, None);
        }
    }

    pub fn remove_filter(&self, id: FilterId) -> Option<FilterRef> {
        self.remove_filters([id]).pop()
    }

    /// Removes and unsubscribes the given filters, returning those found.
    pub fn remove_filters(&self, ids: impl IntoIterator<Item = FilterId>) -> Vec<FilterRef> {
        let mut removed = Vec::new();
        for id in ids {
            let filter = self.filters.borrow_mut().shift_remove(&id);
            if let Some(filter) = filter {
                filter.remove_observer(&self.as_observer());
                self.disabled.borrow_mut().remove(&id);
                removed.push(filter);
            }
        }
        if !removed.is_empty() {
            if self.core.is_enabled() && self.all_disabled() {
                self.core.replace_enabled(false);
                self.core.notify(FilterChange::Disabled, None);
            } else {
                self.core.notify(FilterChange::Updated, None);
            }
        }
        removed
    }

    /// Snapshot of the children, in insertion order.
    pub fn filters(&self) -> Vec<FilterRef> {
        self.filters.borrow().values().cloned().collect()
    }

    pub fn get(&self, id: FilterId) -> Option<FilterRef> {
        self.filters.borrow().get(&id).cloned()
    }

    pub fn contains(&self, id: FilterId) -> bool {
        self.filters.borrow().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.filters.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.borrow().is_empty()
    }

    /// Whether the composite last saw `id` as disabled.
    pub fn is_disabled(&self, id: FilterId) -> bool {
        self.disabled.borrow().contains(&id)
    }

    fn all_disabled(&self) -> bool {
        let len = self.filters.borrow().len();
        len > 0 && self.disabled.borrow().len() == len
    }
}

impl<C: Combinator> Filter for ComposedFilter<C> {
    fn id(&self) -> FilterId {
        self.core.id()
    }

    fn include(&self, row: &dyn RowEntry) -> bool {
        let filters = self.filters.borrow();
        C::combine(&mut filters.values(), row)
    }

    fn is_enabled(&self) -> bool {
        self.core.is_enabled()
    }

    /// With children, the request is forwarded to each of them and the
    /// composite's own flag follows from their notifications.
    fn set_enabled(&self, enabled: bool) {
        let children = self.filters();
        if children.is_empty() {
            self.core.set_enabled(enabled);
        } else {
            for child in children {
                child.set_enabled(enabled);
            }
        }
    }

    fn add_observer(&self, observer: Weak<dyn FilterObserver>) {
        self.core.add_observer(observer);
    }

    fn remove_observer(&self, observer: &Weak<dyn FilterObserver>) {
        self.core.remove_observer(observer);
    }
}

impl<C: Combinator> FilterObserver for ComposedFilter<C> {
    fn filter_updated(&self, event: &FilterEvent) {
        let id = event.source;
        let Some(child) = self.get(id) else {
            return;
        };
        let enabled = self.core.is_enabled();
        let change_state = if child.is_enabled() {
            let was_disabled = self.disabled.borrow_mut().remove(&id);
            was_disabled && !enabled
        } else {
            let newly_disabled = self.disabled.borrow_mut().insert(id);
            newly_disabled && self.all_disabled()
        };

        let cause = Some(ChildChange {
            filter: id,
            change: event.change,
        });
        if change_state {
            self.core.replace_enabled(!enabled);
            self.core.notify(transition(!enabled), cause);
        } else {
            self.core.notify(FilterChange::Updated, cause);
        }
    }
}
