//! # Choice Extraction
//!
//! Keeps each editor's [`ChoiceSet`](crate::choice::ChoiceSet) in step with
//! the data, without rescanning the table on every keystroke.
//!
//! Two strategies implement [`ChoicesStrategy`]:
//!
//! - [`NonAdaptiveChoices`]: choices come from the whole table. Inserts
//!   append the new rows' values; updates and deletes rescan the affected
//!   columns, since a value's last occurrence may be gone.
//! - [`AdaptiveChoices`]: a column's choices are the values found in rows
//!   that every *other* enabled filter accepts, recomputed on any change.
//!
//! The coordinator brackets bulk changes with
//! [`ChoicesStrategy::filter_operation`]. While interrupted, strategies only
//! record what became stale and catch up when the operation ends.

mod adaptive;
mod non_adaptive;

pub use adaptive::AdaptiveChoices;
pub use non_adaptive::NonAdaptiveChoices;

use crate::editor::{AutoChoices, FilterEditor};
use crate::filter::Filter;
use crate::model::{RowCursor, TableEvent, TableModel};
use std::collections::BTreeMap;
use tracing::debug;

/// What a strategy may read and update.
pub struct ChoicesContext<'a> {
    pub model: &'a dyn TableModel,
    pub editors: &'a mut BTreeMap<usize, FilterEditor>,
}

pub trait ChoicesStrategy {
    fn is_adaptive(&self) -> bool;

    /// Brackets a bulk change. On end, returns true when the strategy has
    /// never been reconciled with the editors and the view needs a refresh.
    fn filter_operation(&mut self, ctx: &mut ChoicesContext<'_>, start: bool) -> bool;

    /// The editor's column or configuration changed. Reclassifies its
    /// auto-choice mode before extracting anything.
    fn editor_updated(&mut self, ctx: &mut ChoicesContext<'_>, column: usize);

    /// A filter's content changed. With `row_check`, returns whether `filter`
    /// on its own lets at least one row through (never true for a disabled
    /// filter); otherwise returns true without looking.
    fn filter_updated(
        &mut self,
        ctx: &mut ChoicesContext<'_>,
        filter: &dyn Filter,
        row_check: bool,
    ) -> bool;

    /// An editor's filter was enabled or disabled.
    fn filter_enabled(&mut self, ctx: &mut ChoicesContext<'_>, column: usize, enabled: bool);

    /// Applies whatever extraction was deferred so far.
    fn consolidate_filter_changes(&mut self, ctx: &mut ChoicesContext<'_>);

    fn table_updated(&mut self, ctx: &mut ChoicesContext<'_>, event: &TableEvent);
}

/// Builds the strategy selected by the `adaptive` switch.
pub fn strategy_for(adaptive: bool) -> Box<dyn ChoicesStrategy> {
    if adaptive {
        Box::new(AdaptiveChoices::default())
    } else {
        Box::new(NonAdaptiveChoices::default())
    }
}

/// Row cursor formatting values the way each editor does.
pub(crate) fn cursor_for(ctx: &ChoicesContext<'_>) -> RowCursor {
    let count = ctx.model.column_count();
    let formats = (0..count)
        .map(|column| {
            ctx.editors
                .get(&column)
                .and_then(|editor| editor.config().format.clone())
        })
        .collect();
    RowCursor::new(formats)
}

/// Reclassifies one editor against its column's current type.
pub(crate) fn reclassify(ctx: &mut ChoicesContext<'_>, column: usize) {
    let enumerable = ctx.model.column_type(column).is_enumerable();
    if let Some(editor) = ctx.editors.get_mut(&column) {
        let before = editor.auto_choices();
        if editor.reclassify(enumerable) {
            debug!(column, ?before, after = ?editor.auto_choices(), "auto choices reclassified");
        }
    }
}

/// Sets an enumerable editor's choices to its column's fixed domain.
pub(crate) fn fill_domain(ctx: &mut ChoicesContext<'_>, column: usize) {
    let domain = ctx.model.column_type(column).domain().unwrap_or_default();
    if let Some(editor) = ctx.editors.get_mut(&column) {
        editor.set_extracted(domain);
    }
}

/// Whether the editor harvests its choices from the rows.
pub(crate) fn scans_rows(editor: &FilterEditor) -> bool {
    editor.auto_choices() == AutoChoices::Enabled
}
