//! # Coordinator
//!
//! [`FilterCoordinator`] owns one [`FilterEditor`] per attached column, the
//! AND composite of their filters, and the choice extraction strategy. It
//! installs the composite into the [`RowView`](crate::view::RowView) whenever
//! the effective filter changes.
//!
//! ## Batching
//!
//! Many changes (attaching every column, toggling every editor, swapping the
//! choice strategy) should cost one re-application, not one per filter. While
//! a [`NotificationGuard`] is alive, filter notifications only set a pending
//! flag. When the last guard drops, the coordinator re-applies the filter
//! exactly once if anything was pending, or if the strategy reports it has
//! never been reconciled:
//!
//! ```text
//! Idle --guard--> Suppressed --last drop, pending--> Reapplying --> Idle
//!                     |
//!                     +--------last drop, nothing pending-------> Idle
//! ```
//!
//! ## Deferred work
//!
//! Some follow-ups must wait until the host's view has reacted to the same
//! event: the warning refresh after a table mutation and the auto-selection
//! after a sort. They are queued and executed by
//! [`FilterCoordinator::run_deferred`], which the host calls once its event
//! has been fully handled.
//!
//! ## Borrowing rules
//!
//! The coordinator borrows the shared model and view while it works. The host
//! must release its own mutable borrows before calling in, e.g. forward a
//! [`TableEvent`] only after the mutation that produced it has completed.

mod deferred;
mod guard;
mod observer;

pub use deferred::DeferredTask;
pub use guard::NotificationGuard;
pub use observer::HeaderObserver;

use self::deferred::DeferredQueue;
use self::observer::{CompositeListener, HeaderObservers};
use crate::choice::{Choice, ChoiceMatch, CustomChoice, ValueComparator};
use crate::editor::{AutoChoices, EditorConfig, FilterEditor};
use crate::error::{FilterError, Result};
use crate::extract::{strategy_for, ChoicesContext, ChoicesStrategy};
use crate::filter::{
    AndFilter, Filter, FilterChange, FilterEvent, FilterId, FilterObserver, FilterRef, Predicate,
    PredicateFilter,
};
use crate::history::HistoryList;
use crate::model::{EventKind, SharedModel, TableEvent};
use crate::settings::FilterSettings;
use crate::value::FormatRef;
use crate::view::SharedView;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};
use tracing::{debug, trace, warn};

/// Batches filter changes into single re-applications on a row view.
pub struct FilterCoordinator {
    inner: Rc<Inner>,
}

struct Inner {
    settings: RefCell<FilterSettings>,
    model: SharedModel,
    view: SharedView,
    composite: Rc<AndFilter>,
    editors: RefCell<BTreeMap<usize, FilterEditor>>,
    choices: RefCell<Box<dyn ChoicesStrategy>>,
    balance: Cell<i32>,
    pending: Cell<bool>,
    warning: Cell<bool>,
    /// Filter whose content is being committed; the commit path has already
    /// informed the strategy.
    applying: Cell<Option<FilterId>>,
    deferred: RefCell<DeferredQueue>,
    observers: HeaderObservers,
    listener: Rc<CompositeListener>,
}

impl FilterCoordinator {
    /// Creates a coordinator and attaches an editor to every model column.
    pub fn new(model: SharedModel, view: SharedView, settings: FilterSettings) -> Result<Self> {
        view.borrow_mut()
            .set_filter_on_updates(settings.filter_on_updates);
        let strategy = strategy_for(settings.adaptive_choices);
        let inner = Rc::new_cyclic(|weak| Inner {
            settings: RefCell::new(settings),
            model,
            view,
            composite: AndFilter::new(),
            editors: RefCell::new(BTreeMap::new()),
            choices: RefCell::new(strategy),
            balance: Cell::new(0),
            pending: Cell::new(false),
            warning: Cell::new(false),
            applying: Cell::new(None),
            deferred: RefCell::new(DeferredQueue::default()),
            observers: HeaderObservers::default(),
            listener: Rc::new(CompositeListener {
                inner: weak.clone(),
            }),
        });
        let listener = Rc::downgrade(&inner.listener) as Weak<dyn FilterObserver>;
        inner.composite.add_observer(listener);

        let coordinator = Self { inner };
        coordinator.rebuild_editors()?;
        Ok(coordinator)
    }

    pub fn settings(&self) -> FilterSettings {
        self.inner.settings.borrow().clone()
    }

    pub fn model(&self) -> SharedModel {
        self.inner.model.clone()
    }

    pub fn view(&self) -> SharedView {
        self.inner.view.clone()
    }

    /// The composite of every editor's filter.
    pub fn filter(&self) -> Rc<AndFilter> {
        self.inner.composite.clone()
    }

    /// Holds re-application back until the returned guard (and any other
    /// live guard) is dropped.
    pub fn suppress_notifications(&self) -> NotificationGuard {
        NotificationGuard::new(&self.inner)
    }

    pub fn is_suppressed(&self) -> bool {
        self.inner.balance.get() < 0
    }

    /// True while the view shows no row although the model has some.
    pub fn is_warning(&self) -> bool {
        self.inner.warning.get()
    }

    // -- editors --

    pub fn attach_column(&self, column: usize) -> Result<()> {
        self.inner.attach(column)
    }

    pub fn detach_column(&self, column: usize) -> Result<()> {
        self.inner.detach(column)
    }

    pub fn attached_columns(&self) -> Vec<usize> {
        self.inner.editors.borrow().keys().copied().collect()
    }

    /// Replaces every editor with a fresh one per model column.
    pub fn rebuild_editors(&self) -> Result<()> {
        self.inner.rebuild_editors()
    }

    /// Reads an editor.
    pub fn with_editor<R>(&self, column: usize, f: impl FnOnce(&FilterEditor) -> R) -> Result<R> {
        let editors = self.inner.editors.borrow();
        let editor = editors
            .get(&column)
            .ok_or(FilterError::ColumnNotAttached(column))?;
        Ok(f(editor))
    }

    pub fn with_history_mut<R>(
        &self,
        column: usize,
        f: impl FnOnce(&mut HistoryList) -> R,
    ) -> Result<R> {
        self.inner.update_editor(column, |editor| f(editor.history_mut()))
    }

    pub fn content(&self, column: usize) -> Result<Choice> {
        self.with_editor(column, |editor| editor.content().clone())
    }

    /// The column's choices in display order.
    pub fn choices(&self, column: usize) -> Result<Vec<Choice>> {
        self.with_editor(column, |editor| {
            editor.choices().sorted(editor.config().comparator.as_ref())
        })
    }

    /// Visible history entries, most recent first.
    pub fn history(&self, column: usize) -> Result<Vec<Choice>> {
        self.with_editor(column, |editor| editor.history().items().to_vec())
    }

    pub fn autocomplete(&self, column: usize, hint: &Choice) -> Result<ChoiceMatch> {
        self.with_editor(column, |editor| editor.autocomplete(hint))
    }

    pub fn is_column_enabled(&self, column: usize) -> Result<bool> {
        self.with_editor(column, FilterEditor::is_enabled)
    }

    pub fn set_column_enabled(&self, column: usize, enabled: bool) -> Result<()> {
        let filter = self.inner.editor_filter(column)?;
        filter.set_enabled(enabled);
        Ok(())
    }

    pub fn set_custom_choices(&self, column: usize, custom: Vec<CustomChoice>) -> Result<()> {
        self.inner
            .update_editor(column, |editor| editor.set_custom_choices(custom))
    }

    pub fn set_comparator(&self, column: usize, comparator: Option<ValueComparator>) -> Result<()> {
        self.inner
            .update_editor(column, |editor| editor.set_comparator(comparator))
    }

    /// Changes how the column's values are rendered to text, rebuilding its
    /// filter.
    pub fn set_format(&self, column: usize, format: Option<FormatRef>) -> Result<()> {
        let _guard = self.suppress_notifications();
        let (filter, predicate) = self.inner.update_editor(column, |editor| {
            editor.set_format(format);
            (editor.filter().clone(), editor.current_predicate())
        })?;
        filter.set_predicate(predicate);
        Ok(())
    }

    /// Commits `content` as the column's filter.
    ///
    /// Returns whether the content on its own hides every row; filters on
    /// other columns play no part in that check. An `instant` edit (the
    /// user is still typing) is not applied when instant filtering is off, or
    /// when it would hide every row and instant vanishing is not allowed. A
    /// final commit always applies and records the content in the history.
    pub fn apply_editor_filter(&self, column: usize, content: Choice, instant: bool) -> Result<bool> {
        let inner = &self.inner;
        let (filter, candidate, config) = self.with_editor(column, |editor| {
            (
                editor.filter().clone(),
                editor.predicate_for(&content),
                editor.config().clone(),
            )
        })?;

        let previous = filter.predicate();
        filter.replace_predicate(candidate);
        let hides_all = !inner.with_choices(|strategy, ctx| {
            strategy.filter_updated(ctx, &*filter, true)
        });

        let rejected = instant
            && (!config.instant_filtering || (hides_all && !config.allow_instant_vanishing));
        if rejected {
            filter.replace_predicate(previous);
            inner.with_choices(|strategy, ctx| {
                strategy.filter_updated(ctx, &*filter, false);
            });
            debug!(column, hides_all, "instant edit not applied");
            return Ok(hides_all);
        }

        inner.update_editor(column, |editor| {
            editor.set_content(content.clone());
            if !instant {
                editor.history_mut().add(content);
            }
        })?;
        inner.applying.set(Some(filter.id()));
        filter.report_updated();
        inner.applying.set(None);
        Ok(hides_all)
    }

    /// Returns the column to the match-all content.
    pub fn reset_filter(&self, column: usize) -> Result<()> {
        self.apply_editor_filter(column, Choice::default(), false)?;
        Ok(())
    }

    // -- global switches --

    /// Enables or disables every editor at once.
    pub fn set_enabled(&self, enabled: bool) {
        let _guard = self.suppress_notifications();
        self.inner.composite.set_enabled(enabled);
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.composite.is_enabled()
    }

    pub fn set_ignore_case(&self, ignore_case: bool) {
        let _guard = self.suppress_notifications();
        self.inner.settings.borrow_mut().ignore_case = ignore_case;
        let updates: Vec<(Rc<PredicateFilter>, Predicate)> = self
            .inner
            .editors
            .borrow_mut()
            .values_mut()
            .map(|editor| {
                editor.set_ignore_case(ignore_case);
                (editor.filter().clone(), editor.current_predicate())
            })
            .collect();
        for (filter, predicate) in updates {
            filter.set_predicate(predicate);
        }
    }

    pub fn set_filter_on_updates(&self, on: bool) {
        let _guard = self.suppress_notifications();
        self.inner.settings.borrow_mut().filter_on_updates = on;
        self.inner.view.borrow_mut().set_filter_on_updates(on);
    }

    pub fn set_auto_selection(&self, on: bool) {
        self.inner.settings.borrow_mut().auto_selection = on;
    }

    /// Resets every editor to `mode`, then reclassifies it for its column.
    pub fn set_auto_choices(&self, mode: AutoChoices) {
        let _guard = self.suppress_notifications();
        self.inner.settings.borrow_mut().auto_choices = mode;
        for editor in self.inner.editors.borrow_mut().values_mut() {
            editor.set_auto_choices(mode);
        }
        for column in self.attached_columns() {
            self.inner
                .with_choices(|strategy, ctx| strategy.editor_updated(ctx, column));
        }
    }

    /// Swaps between adaptive and non-adaptive choice extraction.
    pub fn set_adaptive_choices(&self, adaptive: bool) {
        if self.inner.choices.borrow().is_adaptive() == adaptive {
            return;
        }
        let _guard = self.suppress_notifications();
        self.inner.settings.borrow_mut().adaptive_choices = adaptive;
        *self.inner.choices.borrow_mut() = strategy_for(adaptive);
        self.inner.with_choices(|strategy, ctx| {
            strategy.filter_operation(ctx, true);
        });
        debug!(adaptive, "choice strategy replaced");
    }

    pub fn is_adaptive_choices(&self) -> bool {
        self.inner.choices.borrow().is_adaptive()
    }

    /// Applies choice extraction deferred so far, even while suppressed.
    pub fn consolidate_filter_changes(&self) {
        self.inner
            .with_choices(|strategy, ctx| strategy.consolidate_filter_changes(ctx));
    }

    // -- host events --

    /// Forwards a model mutation. Events naming a column the model does not
    /// have are ignored.
    pub fn table_changed(&self, event: &TableEvent) -> Result<()> {
        let inner = &self.inner;
        if let Some(column) = event.column {
            let count = inner.model.borrow().column_count();
            if column >= count {
                warn!(column, count, "ignoring event for unknown column");
                return Ok(());
            }
        }
        inner.view.borrow_mut().table_changed(event);
        if event.kind == EventKind::StructureChanged {
            inner.rebuild_editors()?;
        } else {
            inner.with_choices(|strategy, ctx| strategy.table_updated(ctx, event));
        }
        inner.deferred.borrow_mut().push(DeferredTask::RefreshWarning);
        Ok(())
    }

    /// The view finished sorting; schedules auto-selection.
    pub fn sort_completed(&self) {
        self.inner.sort_completed();
    }

    /// Runs the queued follow-up tasks. Returns how many ran.
    pub fn run_deferred(&self) -> usize {
        let mut ran = 0;
        loop {
            let task = self.inner.deferred.borrow_mut().pop();
            let Some(task) = task else {
                break;
            };
            match task {
                DeferredTask::RefreshWarning => self.inner.check_warning_state(),
                DeferredTask::AutoSelect => self.inner.auto_select(),
            }
            ran += 1;
        }
        ran
    }

    pub fn add_header_observer(&self, observer: Weak<dyn HeaderObserver>) {
        self.inner.observers.add(observer);
    }

    pub fn remove_header_observer(&self, observer: &Weak<dyn HeaderObserver>) {
        self.inner.observers.remove(observer);
    }
}

impl Inner {
    fn suppress(&self) {
        let balance = self.balance.get() - 1;
        self.balance.set(balance);
        trace!(balance, "notifications suppressed");
        if balance == -1 {
            self.with_choices(|strategy, ctx| {
                strategy.filter_operation(ctx, true);
            });
        }
    }

    fn resume(&self) {
        let balance = self.balance.get() + 1;
        debug_assert!(balance <= 0, "unbalanced notification resume");
        self.balance.set(balance);
        trace!(balance, "notifications resumed");
        if balance != 0 {
            return;
        }
        let reconcile = self.with_choices(|strategy, ctx| strategy.filter_operation(ctx, false));
        let pending = self.pending.replace(false);
        if reconcile || pending {
            self.update_table_filter();
        }
    }

    /// Runs `f` with the strategy and the context it works on.
    fn with_choices<R>(
        &self,
        f: impl FnOnce(&mut Box<dyn ChoicesStrategy>, &mut ChoicesContext<'_>) -> R,
    ) -> R {
        let model = self.model.borrow();
        let mut editors = self.editors.borrow_mut();
        let mut strategy = self.choices.borrow_mut();
        let mut ctx = ChoicesContext {
            model: &*model,
            editors: &mut *editors,
        };
        f(&mut *strategy, &mut ctx)
    }

    fn update_editor<R>(&self, column: usize, f: impl FnOnce(&mut FilterEditor) -> R) -> Result<R> {
        let mut editors = self.editors.borrow_mut();
        let editor = editors
            .get_mut(&column)
            .ok_or(FilterError::ColumnNotAttached(column))?;
        Ok(f(editor))
    }

    fn editor_filter(&self, column: usize) -> Result<Rc<PredicateFilter>> {
        self.editors
            .borrow()
            .get(&column)
            .map(|editor| editor.filter().clone())
            .ok_or(FilterError::ColumnNotAttached(column))
    }

    fn column_of(&self, filter: FilterId) -> Option<usize> {
        self.editors
            .borrow()
            .values()
            .find(|editor| editor.filter_id() == filter)
            .map(FilterEditor::column)
    }

    fn attach(self: &Rc<Self>, column: usize) -> Result<()> {
        let count = self.model.borrow().column_count();
        if column >= count {
            return Err(FilterError::ColumnOutOfRange { column, count });
        }
        if self.editors.borrow().contains_key(&column) {
            return Err(FilterError::ColumnAlreadyAttached(column));
        }
        let _guard = NotificationGuard::new(self);
        let config = EditorConfig::from_settings(&self.settings.borrow());
        let editor = FilterEditor::new(column, config);
        let filter = editor.filter_ref();
        self.editors.borrow_mut().insert(column, editor);
        self.with_choices(|strategy, ctx| strategy.editor_updated(ctx, column));
        self.composite.add_filter(filter);
        debug!(column, "editor attached");
        for observer in self.observers.snapshot() {
            observer.editor_created(column);
        }
        Ok(())
    }

    fn detach(self: &Rc<Self>, column: usize) -> Result<()> {
        let editor = self.editors.borrow_mut().remove(&column);
        let editor = editor.ok_or(FilterError::ColumnNotAttached(column))?;
        let _guard = NotificationGuard::new(self);
        self.composite.remove_filter(editor.filter_id());
        debug!(column, "editor detached");
        for observer in self.observers.snapshot() {
            observer.editor_excluded(column);
        }
        Ok(())
    }

    fn rebuild_editors(self: &Rc<Self>) -> Result<()> {
        let _guard = NotificationGuard::new(self);
        let attached: Vec<usize> = self.editors.borrow().keys().copied().collect();
        for column in attached {
            self.detach(column)?;
        }
        let count = self.model.borrow().column_count();
        for column in 0..count {
            self.attach(column)?;
        }
        debug!(count, "editors rebuilt");
        Ok(())
    }

    fn on_filter_event(&self, event: &FilterEvent) {
        if let Some(child) = event.child {
            if let Some(column) = self.column_of(child.filter) {
                if self.applying.get() != Some(child.filter) {
                    match child.change {
                        FilterChange::Updated => {
                            let composite = self.composite.clone();
                            self.with_choices(|strategy, ctx| {
                                strategy.filter_updated(ctx, &*composite, false);
                            });
                        }
                        change => {
                            let enabled = change == FilterChange::Enabled;
                            self.with_choices(|strategy, ctx| {
                                strategy.filter_enabled(ctx, column, enabled)
                            });
                        }
                    }
                }
                for observer in self.observers.snapshot() {
                    observer.filter_updated(column);
                }
            }
        }
        if self.balance.get() < 0 {
            self.pending.set(true);
        } else {
            self.update_table_filter();
        }
    }

    /// Installs the composite into the view (or removes it when disabled)
    /// and refreshes the warning state.
    fn update_table_filter(&self) {
        let filter = self
            .composite
            .is_enabled()
            .then(|| self.composite.clone() as FilterRef);
        let installed = self.view.borrow().has_row_filter();
        if filter.is_some() || installed {
            debug!(enabled = filter.is_some(), "reapplying table filter");
            self.view.borrow_mut().set_row_filter(filter);
            self.sort_completed();
        }
        self.check_warning_state();
    }

    fn check_warning_state(&self) {
        let visible = self.view.borrow().visible_row_count();
        let rows = self.model.borrow().row_count();
        let warning = visible == 0 && rows > 0;
        if self.warning.replace(warning) != warning {
            debug!(warning, "warning state changed");
        }
        for editor in self.editors.borrow_mut().values_mut() {
            let enabled = editor.is_enabled();
            editor.set_warning(warning && enabled);
        }
    }

    fn sort_completed(&self) {
        if self.settings.borrow().auto_selection {
            self.deferred.borrow_mut().push(DeferredTask::AutoSelect);
        }
    }

    fn auto_select(&self) {
        if !self.settings.borrow().auto_selection {
            return;
        }
        let mut view = self.view.borrow_mut();
        if view.visible_row_count() == 1 {
            view.select_row(0);
            debug!("auto-selected the only visible row");
        }
    }
}
