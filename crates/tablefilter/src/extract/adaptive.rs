use super::{cursor_for, reclassify, ChoicesContext, ChoicesStrategy};
use crate::editor::AutoChoices;
use crate::filter::{Filter, PredicateFilter};
use crate::model::{RowCursor, TableEvent};
use crate::value::Value;
use indexmap::IndexSet;
use std::collections::BTreeMap;
use std::rc::Rc;
use tracing::debug;

/// Choices restricted to the rows the other filters still let through.
///
/// A row contributes to a column's choices when no enabled filter of another
/// column rejects it. One pass over the table serves every column: a row
/// rejected by exactly one filter only feeds that filter's column, a row
/// rejected by two or more feeds none.
#[derive(Default)]
pub struct AdaptiveChoices {
    interrupted: bool,
    reconciled: bool,
    stale: bool,
    cursor: RowCursor,
}

impl AdaptiveChoices {
    fn recompute(&self, ctx: &mut ChoicesContext<'_>) {
        let active: Vec<(usize, Rc<PredicateFilter>)> = ctx
            .editors
            .iter()
            .filter(|(_, editor)| editor.is_enabled())
            .map(|(&column, editor)| (column, editor.filter().clone()))
            .collect();
        let mut reachable: BTreeMap<usize, IndexSet<Value>> = ctx
            .editors
            .iter()
            .filter(|(_, editor)| editor.auto_choices() != AutoChoices::Disabled)
            .map(|(&column, _)| (column, IndexSet::new()))
            .collect();

        let rows = ctx.model.row_count();
        debug!(rows, editors = reachable.len(), "recomputing adaptive choices");
        for row in 0..rows {
            let entry = self.cursor.at(ctx.model, row);
            let mut rejecting = active
                .iter()
                .filter(|(_, filter)| !filter.include(&entry))
                .map(|(column, _)| *column);
            let first = rejecting.next();
            if rejecting.next().is_some() {
                continue;
            }
            for (&column, values) in reachable.iter_mut() {
                if first.is_some_and(|rejected| rejected != column) {
                    continue;
                }
                let value = ctx.model.value_at(row, column);
                if !value.is_null() {
                    values.insert(value);
                }
            }
        }

        let columns: Vec<usize> = ctx.editors.keys().copied().collect();
        for column in columns {
            let found = reachable.remove(&column).unwrap_or_default();
            let domain = ctx.model.column_type(column).domain();
            let Some(editor) = ctx.editors.get_mut(&column) else {
                continue;
            };
            match editor.auto_choices() {
                AutoChoices::Disabled => editor.set_extracted(Vec::new()),
                AutoChoices::Enums => editor.set_extracted(
                    domain
                        .unwrap_or_default()
                        .into_iter()
                        .filter(|value| found.contains(value)),
                ),
                AutoChoices::Enabled => editor.set_extracted(found),
            }
        }
    }

    fn changed(&mut self, ctx: &mut ChoicesContext<'_>) {
        if self.interrupted {
            self.stale = true;
        } else {
            self.recompute(ctx);
        }
    }
}

impl ChoicesStrategy for AdaptiveChoices {
    fn is_adaptive(&self) -> bool {
        true
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
            self.stale = true;
        }
        self.consolidate_filter_changes(ctx);
        fresh
    }

    fn editor_updated(&mut self, ctx: &mut ChoicesContext<'_>, column: usize) {
        reclassify(ctx, column);
        self.changed(ctx);
    }

    fn filter_updated(
        &mut self,
        ctx: &mut ChoicesContext<'_>,
        filter: &dyn Filter,
        row_check: bool,
    ) -> bool {
        self.changed(ctx);
        !row_check
            || (filter.is_enabled() && self.cursor.any_row(ctx.model, |row| filter.include(row)))
    }

    fn filter_enabled(&mut self, ctx: &mut ChoicesContext<'_>, _column: usize, _enabled: bool) {
        self.changed(ctx);
    }

    fn consolidate_filter_changes(&mut self, ctx: &mut ChoicesContext<'_>) {
        if std::mem::take(&mut self.stale) {
            self.recompute(ctx);
        }
    }

    fn table_updated(&mut self, ctx: &mut ChoicesContext<'_>, _event: &TableEvent) {
        self.changed(ctx);
    }
}
