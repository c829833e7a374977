//! # View Boundary
//!
//! The coordinator never decides which rows are shown itself: it installs its
//! effective filter into a [`RowView`], the collaborator that owns row
//! visibility, ordering and selection. [`MemView`] is the in-memory version
//! used by the CLI and the tests.

use crate::filter::{Filter, FilterRef};
use crate::model::{EventKind, RowCursor, SharedModel, TableEvent};
use std::cell::RefCell;
use std::rc::Rc;

pub trait RowView {
    /// Installs or removes the row filter and recomputes visibility.
    fn set_row_filter(&mut self, filter: Option<FilterRef>);

    fn has_row_filter(&self) -> bool;

    fn visible_row_count(&self) -> usize;

    /// Model indices of the visible rows, in view order.
    fn visible_rows(&self) -> Vec<usize>;

    fn select_row(&mut self, view_row: usize);

    /// Selected row, as a model index.
    fn selected_row(&self) -> Option<usize>;

    /// Whether updated rows are re-filtered.
    fn set_filter_on_updates(&mut self, on: bool);

    /// The model changed; refresh visibility accordingly.
    fn table_changed(&mut self, event: &TableEvent);
}

pub type SharedView = Rc<RefCell<dyn RowView>>;

pub struct MemView {
    model: SharedModel,
    filter: Option<FilterRef>,
    rows: Vec<usize>,
    selected: Option<usize>,
    filter_on_updates: bool,
    cursor: RowCursor,
}

impl MemView {
    pub fn new(model: SharedModel) -> Self {
        let mut view = Self {
            model,
            filter: None,
            rows: Vec::new(),
            selected: None,
            filter_on_updates: true,
            cursor: RowCursor::default(),
        };
        view.refilter();
        view
    }

    pub fn into_shared(self) -> Rc<RefCell<MemView>> {
        Rc::new(RefCell::new(self))
    }

    fn refilter(&mut self) {
        let model = self.model.borrow();
        self.rows = (0..model.row_count())
            .filter(|&row| match &self.filter {
                Some(filter) => filter.include(&self.cursor.at(&*model, row)),
                None => true,
            })
            .collect();
        if let Some(selected) = self.selected {
            if !self.rows.contains(&selected) {
                self.selected = None;
            }
        }
    }
}

impl RowView for MemView {
    fn set_row_filter(&mut self, filter: Option<FilterRef>) {
        self.filter = filter;
        self.refilter();
    }

    fn has_row_filter(&self) -> bool {
        self.filter.is_some()
    }

    fn visible_row_count(&self) -> usize {
        self.rows.len()
    }

    fn visible_rows(&self) -> Vec<usize> {
        self.rows.clone()
    }

    fn select_row(&mut self, view_row: usize) {
        self.selected = self.rows.get(view_row).copied();
    }

    fn selected_row(&self) -> Option<usize> {
        self.selected
    }

    fn set_filter_on_updates(&mut self, on: bool) {
        self.filter_on_updates = on;
    }

    fn table_changed(&mut self, event: &TableEvent) {
        if event.kind == EventKind::Update && !self.filter_on_updates {
            return;
        }
        self.selected = None;
        self.refilter();
    }
}
