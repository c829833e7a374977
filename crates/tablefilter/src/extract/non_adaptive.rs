use super::{
    cursor_for, fill_domain, reclassify, scans_rows, ChoicesContext, ChoicesStrategy,
};
use crate::editor::AutoChoices;
use crate::filter::Filter;
use crate::model::{EventKind, RowCursor, TableEvent, TableModel};
use crate::value::Value;
use std::collections::BTreeSet;
use std::mem;
use tracing::debug;

/// Choices harvested from the whole table, regardless of other filters.
#[derive(Default)]
pub struct NonAdaptiveChoices {
    interrupted: bool,
    reconciled: bool,
    stale: BTreeSet<usize>,
    stale_all: bool,
    cursor: RowCursor,
}

/// Distinct non-null values of `column` in `rows`.
fn model_extract(
    model: &dyn TableModel,
    column: usize,
    rows: impl Iterator<Item = usize>,
) -> Vec<Value> {
    rows.map(|row| model.value_at(row, column))
        .filter(|value| !value.is_null())
        .collect()
}

impl NonAdaptiveChoices {
    fn refresh(&self, ctx: &mut ChoicesContext<'_>, column: usize) {
        let Some(editor) = ctx.editors.get_mut(&column) else {
            return;
        };
        match editor.auto_choices() {
            AutoChoices::Disabled => editor.set_extracted(Vec::new()),
            AutoChoices::Enums => fill_domain(ctx, column),
            AutoChoices::Enabled => {
                if editor.is_enabled() {
                    debug!(column, "rescanning column choices");
                    let values = model_extract(ctx.model, column, 0..ctx.model.row_count());
                    editor.set_extracted(values);
                }
            }
        }
    }

    fn refresh_all(&self, ctx: &mut ChoicesContext<'_>) {
        let columns: Vec<usize> = ctx.editors.keys().copied().collect();
        for column in columns {
            self.refresh(ctx, column);
        }
    }

    fn mark_stale(&mut self, column: Option<usize>) {
        match column {
            Some(column) => {
                self.stale.insert(column);
            }
            None => self.stale_all = true,
        }
    }

    /// Appends the values of freshly inserted rows.
    fn append_rows(&self, ctx: &mut ChoicesContext<'_>, event: &TableEvent) {
        let row_count = ctx.model.row_count();
        if event.first_row >= row_count {
            return;
        }
        let last = event.last_row.min(row_count - 1);
        for (&column, editor) in ctx.editors.iter_mut() {
            if event.column.is_some_and(|c| c != column) {
                continue;
            }
            if scans_rows(editor) && editor.is_enabled() {
                editor.add_extracted(model_extract(ctx.model, column, event.first_row..=last));
            }
        }
    }
}

impl ChoicesStrategy for NonAdaptiveChoices {
    fn is_adaptive(&self) -> bool {
        false
    }

    fn filter_operation(&mut self, ctx: &mut ChoicesContext<'_>, start: bool) -> bool {
        if start {
            self.interrupted = true;
            return false;
        }
        self.interrupted = false;
        self.cursor = cursor_for(ctx);
        let fresh = !self.reconciled;
        self.reconciled = true;
        if fresh {
            let columns: Vec<usize> = ctx.editors.keys().copied().collect();
            for column in columns {
                reclassify(ctx, column);
            }
            self.stale_all = true;
        }
        self.consolidate_filter_changes(ctx);
        fresh
    }

    fn editor_updated(&mut self, ctx: &mut ChoicesContext<'_>, column: usize) {
        reclassify(ctx, column);
        if self.interrupted {
            self.stale.insert(column);
        } else {
            self.refresh(ctx, column);
        }
    }

    fn filter_updated(
        &mut self,
        ctx: &mut ChoicesContext<'_>,
        filter: &dyn Filter,
        row_check: bool,
    ) -> bool {
        if !row_check {
            return true;
        }
        filter.is_enabled() && self.cursor.any_row(ctx.model, |row| filter.include(row))
    }

    fn filter_enabled(&mut self, ctx: &mut ChoicesContext<'_>, column: usize, enabled: bool) {
        if !enabled {
            return;
        }
        if self.interrupted {
            self.stale.insert(column);
        } else {
            self.refresh(ctx, column);
        }
    }

    fn consolidate_filter_changes(&mut self, ctx: &mut ChoicesContext<'_>) {
        let stale = mem::take(&mut self.stale);
        if mem::take(&mut self.stale_all) {
            self.refresh_all(ctx);
        } else {
            for column in stale {
                self.refresh(ctx, column);
            }
        }
    }

    fn table_updated(&mut self, ctx: &mut ChoicesContext<'_>, event: &TableEvent) {
        if self.interrupted {
            let column = event.column.filter(|_| event.kind != EventKind::StructureChanged);
            self.mark_stale(column);
            return;
        }
        match event.kind {
            EventKind::Insert => self.append_rows(ctx, event),
            EventKind::Update | EventKind::Delete => {
                let columns: Vec<usize> = match event.column {
                    Some(column) => vec![column],
                    None => ctx.editors.keys().copied().collect(),
                };
                for column in columns {
                    reclassify(ctx, column);
                    self.refresh(ctx, column);
                }
            }
            EventKind::StructureChanged => {
                let columns: Vec<usize> = ctx.editors.keys().copied().collect();
                for column in columns {
                    reclassify(ctx, column);
                }
                self.cursor = cursor_for(ctx);
                self.refresh_all(ctx);
            }
        }
    }
}
