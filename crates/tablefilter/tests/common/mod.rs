#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;
use tablefilter::filter::FilterRef;
use tablefilter::model::{MemTable, TableEvent, TableModel};
use tablefilter::view::{MemView, RowView};
use tablefilter::{ColumnType, FilterCoordinator, FilterSettings, Value};

/// A [`MemTable`] that counts value reads per column.
pub struct CountingModel {
    table: MemTable,
    reads: RefCell<Vec<usize>>,
}

impl CountingModel {
    pub fn new(table: MemTable) -> Self {
        let columns = table.column_count();
        Self {
            table,
            reads: RefCell::new(vec![0; columns]),
        }
    }

    pub fn table_mut(&mut self) -> &mut MemTable {
        &mut self.table
    }

    pub fn reads(&self, column: usize) -> usize {
        self.reads.borrow().get(column).copied().unwrap_or(0)
    }

    pub fn reset(&self) {
        self.reads.borrow_mut().iter_mut().for_each(|count| *count = 0);
    }
}

impl TableModel for CountingModel {
    fn row_count(&self) -> usize {
        self.table.row_count()
    }

    fn column_count(&self) -> usize {
        self.table.column_count()
    }

    fn value_at(&self, row: usize, column: usize) -> Value {
        if let Some(count) = self.reads.borrow_mut().get_mut(column) {
            *count += 1;
        }
        self.table.value_at(row, column)
    }

    fn column_type(&self, column: usize) -> ColumnType {
        self.table.column_type(column)
    }

    fn column_name(&self, column: usize) -> String {
        self.table.column_name(column)
    }
}

/// A [`MemView`] that counts how often a row filter was installed.
pub struct RecordingView {
    view: MemView,
    installs: usize,
}

impl RecordingView {
    pub fn installs(&self) -> usize {
        self.installs
    }
}

impl RowView for RecordingView {
    fn set_row_filter(&mut self, filter: Option<FilterRef>) {
        self.installs += 1;
        self.view.set_row_filter(filter);
    }

    fn has_row_filter(&self) -> bool {
        self.view.has_row_filter()
    }

    fn visible_row_count(&self) -> usize {
        self.view.visible_row_count()
    }

    fn visible_rows(&self) -> Vec<usize> {
        self.view.visible_rows()
    }

    fn select_row(&mut self, view_row: usize) {
        self.view.select_row(view_row);
    }

    fn selected_row(&self) -> Option<usize> {
        self.view.selected_row()
    }

    fn set_filter_on_updates(&mut self, on: bool) {
        self.view.set_filter_on_updates(on);
    }

    fn table_changed(&mut self, event: &TableEvent) {
        self.view.table_changed(event);
    }
}

pub struct Harness {
    pub model: Rc<RefCell<CountingModel>>,
    pub view: Rc<RefCell<RecordingView>>,
    pub coordinator: FilterCoordinator,
}

impl Harness {
    pub fn new(table: MemTable, settings: FilterSettings) -> Self {
        let model = Rc::new(RefCell::new(CountingModel::new(table)));
        let view = Rc::new(RefCell::new(RecordingView {
            view: MemView::new(model.clone()),
            installs: 0,
        }));
        let coordinator = FilterCoordinator::new(model.clone(), view.clone(), settings)
            .expect("coordinator");
        Self {
            model,
            view,
            coordinator,
        }
    }

    pub fn installs(&self) -> usize {
        self.view.borrow().installs()
    }

    pub fn visible(&self) -> Vec<usize> {
        self.view.borrow().visible_rows()
    }

    /// Applies a table mutation and forwards the event it produced.
    pub fn mutate(&self, f: impl FnOnce(&mut MemTable) -> Option<TableEvent>) {
        let event = f(self.model.borrow_mut().table_mut());
        if let Some(event) = event {
            self.coordinator.table_changed(&event).expect("table event");
        }
        self.coordinator.run_deferred();
    }

    pub fn reads(&self, column: usize) -> usize {
        self.model.borrow().reads(column)
    }
}

pub fn cities() -> MemTable {
    MemTable::new([
        ("city", ColumnType::Text),
        ("country", ColumnType::Text),
        ("pop", ColumnType::Int),
    ])
    .with_rows(vec![
        vec!["Madrid".into(), "Spain".into(), 3.into()],
        vec!["Sevilla".into(), "Spain".into(), 1.into()],
        vec!["Paris".into(), "France".into(), 2.into()],
        vec!["Lyon".into(), "France".into(), 1.into()],
    ])
}
