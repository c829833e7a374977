//! # Editors
//!
//! A [`FilterEditor`] binds one column to one [`PredicateFilter`]. It holds
//! the content the user selected or typed, the column's current choices and
//! its history. Editors are owned by the coordinator and live exactly as long
//! as the column stays attached.
//!
//! ## Auto-choice modes
//!
//! [`AutoChoices`] decides where an editor's choices come from. The mode is
//! re-derived from the column type whenever the editor is updated, through
//! the transition table in [`AutoChoices::reclassify`]:
//!
//! | current | enumerable column | free-form column |
//! |---------|-------------------|------------------|
//! | `Disabled` | `Disabled` | `Disabled` |
//! | `Enums` | `Enums` | `Disabled` |
//! | `Enabled` | `Enums` | `Enabled` |

use crate::choice::{
    predicate_for, Choice, ChoiceMatch, ChoiceSet, CustomChoice, MatchOptions, TextComparison,
    ValueComparator,
};
use crate::filter::{Filter, FilterId, FilterRef, Predicate, PredicateFilter};
use crate::history::HistoryList;
use crate::settings::FilterSettings;
use crate::value::{FormatRef, Value};
use serde::{Deserialize, Serialize};
use std::rc::Rc;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AutoChoices {
    /// Only the user's custom choices are offered.
    Disabled,
    /// Enumerable columns offer their fixed domain.
    #[default]
    Enums,
    /// Free-form columns offer the values found in the data.
    Enabled,
}

impl AutoChoices {
    /// Next mode for a column that is (or is not) enumerable.
    pub fn reclassify(self, enumerable: bool) -> AutoChoices {
        match (self, enumerable) {
            (AutoChoices::Disabled, _) => AutoChoices::Disabled,
            (AutoChoices::Enums, true) | (AutoChoices::Enabled, true) => AutoChoices::Enums,
            (AutoChoices::Enums, false) => AutoChoices::Disabled,
            (AutoChoices::Enabled, false) => AutoChoices::Enabled,
        }
    }
}

/// Per-editor options, seeded from [`FilterSettings`].
#[derive(Clone)]
pub struct EditorConfig {
    pub auto_choices: AutoChoices,
    pub ignore_case: bool,
    pub format: Option<FormatRef>,
    pub comparator: Option<ValueComparator>,
    pub instant_filtering: bool,
    pub allow_instant_vanishing: bool,
    pub auto_completion: bool,
    pub max_history: usize,
    pub custom_choices: Vec<CustomChoice>,
    /// History matches on text prefixes rather than identity.
    pub text_matching: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self::from_settings(&FilterSettings::default())
    }
}

impl EditorConfig {
    pub fn from_settings(settings: &FilterSettings) -> Self {
        Self {
            auto_choices: settings.auto_choices,
            ignore_case: settings.ignore_case,
            format: None,
            comparator: None,
            instant_filtering: settings.instant_filtering,
            allow_instant_vanishing: settings.allow_instant_vanishing,
            auto_completion: settings.auto_completion,
            max_history: settings.max_history,
            custom_choices: Vec::new(),
            text_matching: true,
        }
    }

    pub fn text_comparison(&self) -> Option<TextComparison> {
        self.text_matching
            .then(|| TextComparison::for_ignore_case(self.ignore_case))
    }

    fn match_options(&self) -> MatchOptions {
        MatchOptions {
            ignore_case: self.ignore_case,
            format: self.format.clone(),
        }
    }
}

pub struct FilterEditor {
    column: usize,
    filter: Rc<PredicateFilter>,
    config: EditorConfig,
    content: Choice,
    choices: ChoiceSet,
    history: HistoryList,
    warning: bool,
}

impl FilterEditor {
    pub fn new(column: usize, config: EditorConfig) -> Self {
        let content = Choice::default();
        let predicate = predicate_for(&content, column, &config.match_options());
        let history = match config.text_comparison() {
            Some(comparison) => HistoryList::with_text_matching(config.max_history, comparison),
            None => HistoryList::new(config.max_history),
        };
        let choices = config.custom_choices.iter().cloned().collect();
        Self {
            column,
            filter: Rc::new(PredicateFilter::new(predicate)),
            config,
            content,
            choices,
            history,
            warning: false,
        }
    }

    pub fn column(&self) -> usize {
        self.column
    }

    pub fn filter(&self) -> &Rc<PredicateFilter> {
        &self.filter
    }

    pub fn filter_ref(&self) -> FilterRef {
        self.filter.clone()
    }

    pub fn filter_id(&self) -> FilterId {
        self.filter.id()
    }

    pub fn is_enabled(&self) -> bool {
        self.filter.is_enabled()
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn auto_choices(&self) -> AutoChoices {
        self.config.auto_choices
    }

    pub fn content(&self) -> &Choice {
        &self.content
    }

    pub fn choices(&self) -> &ChoiceSet {
        &self.choices
    }

    pub fn history(&self) -> &HistoryList {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut HistoryList {
        &mut self.history
    }

    pub fn is_warning(&self) -> bool {
        self.warning
    }

    pub(crate) fn set_warning(&mut self, warning: bool) {
        self.warning = warning;
    }

    /// The predicate that would select `content` on this column.
    pub fn predicate_for(&self, content: &Choice) -> Predicate {
        predicate_for(content, self.column, &self.config.match_options())
    }

    /// The predicate for the current content and options.
    pub fn current_predicate(&self) -> Predicate {
        self.predicate_for(&self.content)
    }

    pub(crate) fn set_content(&mut self, content: Choice) {
        self.content = content;
    }

    /// Applies the transition table for the column's current type.
    /// Returns true when the mode changed.
    pub fn reclassify(&mut self, enumerable: bool) -> bool {
        let next = self.config.auto_choices.reclassify(enumerable);
        let changed = next != self.config.auto_choices;
        self.config.auto_choices = next;
        changed
    }

    pub(crate) fn set_auto_choices(&mut self, mode: AutoChoices) {
        self.config.auto_choices = mode;
    }

    /// Replaces the extracted choices. Custom choices are always kept.
    pub fn set_extracted(&mut self, values: impl IntoIterator<Item = Value>) {
        self.choices.clear();
        self.choices.extend(self.config.custom_choices.iter().cloned());
        self.choices.extend(values);
    }

    /// Adds extracted choices to the current set.
    pub fn add_extracted(&mut self, values: impl IntoIterator<Item = Value>) {
        self.choices.extend(values);
    }

    pub fn set_custom_choices(&mut self, custom: Vec<CustomChoice>) {
        let extracted: Vec<Value> = self.choices.values().cloned().collect();
        self.config.custom_choices = custom;
        self.set_extracted(extracted);
    }

    /// Changes case sensitivity. The caller must install
    /// [`current_predicate`](Self::current_predicate) afterwards.
    pub(crate) fn set_ignore_case(&mut self, ignore_case: bool) {
        self.config.ignore_case = ignore_case;
        self.history.set_string_content(self.config.text_comparison());
    }

    /// Changes the format. The caller must install
    /// [`current_predicate`](Self::current_predicate) afterwards.
    pub(crate) fn set_format(&mut self, format: Option<FormatRef>) {
        self.config.format = format;
    }

    pub(crate) fn set_comparator(&mut self, comparator: Option<ValueComparator>) {
        self.config.comparator = comparator;
    }

    pub fn set_max_history(&mut self, max: usize) {
        self.config.max_history = max;
        self.history.set_max_history(max);
    }

    /// Closest known entry for partial input.
    ///
    /// History is searched first, then the choices in display order; the
    /// longer match wins and history wins ties.
    pub fn autocomplete(&self, hint: &Choice) -> ChoiceMatch {
        if !self.config.auto_completion {
            return ChoiceMatch::none();
        }
        let from_history = self.history.closest_match(hint);
        if from_history.exact {
            return from_history;
        }
        let from_choices = self.choices.closest_match(
            hint,
            self.config.text_comparison(),
            self.config.comparator.as_ref(),
        );
        if from_choices.is_match() && (!from_history.is_match() || from_choices.len > from_history.len) {
            from_choices
        } else {
            from_history
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MemTable, RowCursor};
    use crate::value::ColumnType;

    fn table() -> MemTable {
        MemTable::new([("city", ColumnType::Text)]).with_rows(vec![
            vec!["Madrid".into()],
            vec!["Paris".into()],
            vec![Value::Null],
        ])
    }

    #[test]
    fn reclassify_transition_table() {
        use AutoChoices::*;
        assert_eq!(Disabled.reclassify(true), Disabled);
        assert_eq!(Disabled.reclassify(false), Disabled);
        assert_eq!(Enums.reclassify(true), Enums);
        assert_eq!(Enums.reclassify(false), Disabled);
        assert_eq!(Enabled.reclassify(true), Enums);
        assert_eq!(Enabled.reclassify(false), Enabled);
    }

    #[test]
    fn editor_reclassify_reports_change() {
        let mut editor = FilterEditor::new(0, EditorConfig::default());
        assert!(!editor.reclassify(true));
        assert!(editor.reclassify(false));
        assert_eq!(editor.auto_choices(), AutoChoices::Disabled);
    }

    #[test]
    fn new_editor_passes_everything() {
        let table = table();
        let cursor = RowCursor::default();
        let editor = FilterEditor::new(0, EditorConfig::default());
        assert!(editor.content().is_match_all());
        assert!(editor.filter().include(&cursor.at(&table, 2)));
    }

    #[test]
    fn predicate_honours_ignore_case() {
        let table = table();
        let cursor = RowCursor::default();
        let mut editor = FilterEditor::new(0, EditorConfig::default());
        let predicate = editor.predicate_for(&Choice::from("madrid"));
        assert!(predicate(&cursor.at(&table, 0)));

        editor.set_ignore_case(false);
        let predicate = editor.predicate_for(&Choice::from("madrid"));
        assert!(!predicate(&cursor.at(&table, 0)));
    }

    #[test]
    fn predicate_uses_format() {
        let table = table();
        let cursor = RowCursor::default();
        let mut editor = FilterEditor::new(0, EditorConfig::default());
        let upper: FormatRef = Rc::new(|v: &Value| v.to_string().to_uppercase());
        editor.set_format(Some(upper));
        let choice = CustomChoice::pattern("P", "PA.*").unwrap();
        let predicate = editor.predicate_for(&Choice::from(choice));
        assert!(predicate(&cursor.at(&table, 1)));
        assert!(!predicate(&cursor.at(&table, 0)));
    }

    #[test]
    fn custom_choices_survive_extraction() {
        let config = EditorConfig {
            custom_choices: vec![CustomChoice::match_empty("=")],
            ..EditorConfig::default()
        };
        let mut editor = FilterEditor::new(0, config);
        editor.set_extracted(vec![Value::from("a"), Value::from("b")]);
        assert_eq!(editor.choices().len(), 3);
        editor.set_extracted(Vec::new());
        assert_eq!(editor.choices().len(), 1);

        editor.set_custom_choices(Vec::new());
        assert!(editor.choices().is_empty());
    }

    #[test]
    fn autocomplete_prefers_longer_match() {
        let mut editor = FilterEditor::new(0, EditorConfig::default());
        editor.history_mut().initialize([Choice::from("par")]);
        editor.set_extracted(vec![Value::from("Paris"), Value::from("Madrid")]);

        let m = editor.autocomplete(&Choice::from("pari"));
        assert_eq!(m.content, Some(Choice::from("Paris")));

        let m = editor.autocomplete(&Choice::from("pa"));
        assert_eq!(m.content, Some(Choice::from("par")));
    }

    #[test]
    fn autocomplete_history_wins_ties() {
        let mut editor = FilterEditor::new(0, EditorConfig::default());
        editor.history_mut().initialize([Choice::from("mad")]);
        editor.set_extracted(vec![Value::from("Madrid")]);
        let m = editor.autocomplete(&Choice::from("ma"));
        assert_eq!(m.content, Some(Choice::from("mad")));
    }

    #[test]
    fn autocomplete_off_matches_nothing() {
        let config = EditorConfig {
            auto_completion: false,
            ..EditorConfig::default()
        };
        let mut editor = FilterEditor::new(0, config);
        editor.set_extracted(vec![Value::from("Madrid")]);
        assert!(!editor.autocomplete(&Choice::from("M")).is_match());
    }

    #[test]
    fn changing_case_rule_clears_history() {
        let mut editor = FilterEditor::new(0, EditorConfig::default());
        editor.history_mut().initialize([Choice::from("x")]);
        editor.set_ignore_case(true);
        assert_eq!(editor.history().len(), 1);
        editor.set_ignore_case(false);
        assert!(editor.history().is_empty());
    }
}
