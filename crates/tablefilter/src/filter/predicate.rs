use super::{Filter, FilterChange, FilterCore, FilterId, FilterObserver};
use crate::model::RowEntry;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// A row predicate closure.
pub type Predicate = Rc<dyn Fn(&dyn RowEntry) -> bool>;

/// Leaf filter with a replaceable predicate.
///
/// Each column editor owns one. Replacing the predicate is a content update;
/// toggling the flag is a state transition.
pub struct PredicateFilter {
    core: FilterCore,
    predicate: RefCell<Predicate>,
}

impl PredicateFilter {
    pub fn new(predicate: Predicate) -> Self {
        Self {
            core: FilterCore::new(),
            predicate: RefCell::new(predicate),
        }
    }

    /// A filter accepting every row.
    pub fn pass_all() -> Self {
        Self::new(Rc::new(|_: &dyn RowEntry| true))
    }

    pub fn from_fn(f: impl Fn(&dyn RowEntry) -> bool + 'static) -> Self {
        Self::new(Rc::new(f))
    }

    /// Installs a new predicate and reports a content update.
    pub fn set_predicate(&self, predicate: Predicate) {
        self.replace_predicate(predicate);
        self.report_updated();
    }

    /// Installs a new predicate without notifying anyone.
    pub(crate) fn replace_predicate(&self, predicate: Predicate) {
        *self.predicate.borrow_mut() = predicate;
    }

    pub fn predicate(&self) -> Predicate {
        self.predicate.borrow().clone()
    }

    /// Tells observers the predicate content changed.
    pub fn report_updated(&self) {
        self.core.notify(FilterChange::Updated, None);
    }
}

impl Filter for PredicateFilter {
    fn id(&self) -> FilterId {
        self.core.id()
    }

    fn include(&self, row: &dyn RowEntry) -> bool {
        let predicate = self.predicate();
        predicate(row)
    }

    fn is_enabled(&self) -> bool {
        self.core.is_enabled()
    }

    fn set_enabled(&self, enabled: bool) {
        self.core.set_enabled(enabled);
    }

    fn add_observer(&self, observer: Weak<dyn FilterObserver>) {
        self.core.add_observer(observer);
    }

    fn remove_observer(&self, observer: &Weak<dyn FilterObserver>) {
        self.core.remove_observer(observer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::tests::Recorder;
    use crate::model::{MemTable, RowCursor};
    use crate::value::{ColumnType, Value};

    fn table() -> MemTable {
        MemTable::new([("n", ColumnType::Int)]).with_rows(vec![vec![1.into()], vec![2.into()]])
    }

    #[test]
    fn predicate_is_applied() {
        let table = table();
        let cursor = RowCursor::default();
        let filter = PredicateFilter::from_fn(|row| row.value(0) == Value::Int(2));
        assert!(!filter.include(&cursor.at(&table, 0)));
        assert!(filter.include(&cursor.at(&table, 1)));
    }

    #[test]
    fn replacing_predicate_reports_update() {
        let filter = PredicateFilter::pass_all();
        let recorder = Recorder::attach(&filter);

        filter.set_predicate(Rc::new(|_: &dyn RowEntry| false));
        assert_eq!(recorder.changes(), vec![FilterChange::Updated]);

        let table = table();
        assert!(!filter.include(&RowCursor::default().at(&table, 0)));
    }

    #[test]
    fn silent_replacement_does_not_notify() {
        let filter = PredicateFilter::pass_all();
        let recorder = Recorder::attach(&filter);
        filter.replace_predicate(Rc::new(|_: &dyn RowEntry| false));
        assert!(recorder.changes().is_empty());
    }

    #[test]
    fn disabling_reports_transition() {
        let filter = PredicateFilter::pass_all();
        let recorder = Recorder::attach(&filter);
        filter.set_enabled(false);
        assert!(!filter.is_enabled());
        assert_eq!(recorder.changes(), vec![FilterChange::Disabled]);
        assert!(recorder.events.borrow()[0].child.is_none());
    }
}
