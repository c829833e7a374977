//! # History
//!
//! Each editor remembers the contents it committed, most recent first.
//!
//! Insertion lags one step behind: adding a value stores the value added
//! *before* it, so the content currently live in the editor only reaches the
//! list once something else replaces it. With a maximum of 2, adding A, B and
//! C leaves `[B, A]`.
//!
//! A value can be temporarily hidden ("restricted"), typically the one the
//! editor is currently showing. Restrictions never touch the stored entries.

use crate::choice::{closest_in, Choice, ChoiceMatch, TextComparison};
use crate::error::Result;

#[derive(Clone, Debug, Default)]
pub struct HistoryList {
    entries: Vec<Choice>,
    /// Visible entries while a restriction is active.
    shown: Option<Vec<Choice>>,
    last_added: Option<Choice>,
    max: usize,
    comparison: Option<TextComparison>,
}

impl HistoryList {
    pub fn new(max: usize) -> Self {
        Self {
            max,
            ..Self::default()
        }
    }

    /// A list whose matching works on text prefixes.
    pub fn with_text_matching(max: usize, comparison: TextComparison) -> Self {
        Self {
            max,
            comparison: Some(comparison),
            ..Self::default()
        }
    }

    pub fn max_history(&self) -> usize {
        self.max
    }

    /// Stored entries, most recent first, ignoring restrictions.
    pub fn entries(&self) -> &[Choice] {
        &self.entries
    }

    /// Visible entries, most recent first.
    pub fn items(&self) -> &[Choice] {
        self.shown.as_deref().unwrap_or(&self.entries)
    }

    pub fn len(&self) -> usize {
        self.items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    pub fn is_restricted(&self) -> bool {
        self.shown.is_some()
    }

    /// Records `choice` as the live content, storing the previous one.
    pub fn add(&mut self, choice: Choice) {
        self.entries.retain(|c| *c != choice);
        if self.max > 0 {
            if let Some(previous) = self.last_added.take() {
                if previous != choice && !previous.to_string().is_empty() {
                    self.entries.retain(|c| *c != previous);
                    self.entries.insert(0, previous);
                    self.entries.truncate(self.max);
                }
            }
        }
        self.last_added = Some(choice);
        self.shown = None;
    }

    /// Hides `choice` until the next [`clear_restrictions`](Self::clear_restrictions).
    pub fn restrict(&mut self, choice: &Choice) {
        let visible: Vec<Choice> = self
            .items()
            .iter()
            .filter(|c| *c != choice)
            .cloned()
            .collect();
        if visible.len() != self.items().len() {
            self.shown = Some(visible);
        }
    }

    pub fn clear_restrictions(&mut self) {
        self.shown = None;
    }

    /// Replaces the stored entries, e.g. with a persisted list.
    pub fn initialize(&mut self, entries: impl IntoIterator<Item = Choice>) {
        self.entries.clear();
        for entry in entries {
            if self.entries.len() >= self.max {
                break;
            }
            if !self.entries.contains(&entry) {
                self.entries.push(entry);
            }
        }
        self.last_added = None;
        self.shown = None;
    }

    pub fn set_max_history(&mut self, max: usize) {
        self.max = max;
        if self.entries.len() > max {
            self.entries.truncate(max);
            self.shown = None;
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.shown = None;
        self.last_added = None;
    }

    pub fn comparison(&self) -> Option<TextComparison> {
        self.comparison
    }

    /// Switches between text-prefix matching and identity matching.
    ///
    /// Entries collected under another rule are dropped.
    pub fn set_string_content(&mut self, comparison: Option<TextComparison>) {
        let same = match (self.comparison, comparison) {
            (None, None) => true,
            (Some(a), Some(b)) => a.same_as(b),
            _ => false,
        };
        if !same {
            self.comparison = comparison;
            self.clear();
        }
    }

    /// Closest visible entry to `hint`, searched most recent first.
    pub fn closest_match(&self, hint: &Choice) -> ChoiceMatch {
        closest_in(self.items().iter(), hint, self.comparison)
    }

    /// Stored entries as a JSON array, for the host to persist.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.entries)?)
    }

    /// Loads entries saved with [`to_json`](Self::to_json).
    pub fn load_json(&mut self, json: &str) -> Result<()> {
        let entries: Vec<Choice> = serde_json::from_str(json)?;
        self.initialize(entries);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::choice::CustomChoice;
    use crate::value::Value;

    fn c(s: &str) -> Choice {
        Choice::from(s)
    }

    #[test]
    fn add_lags_one_step_and_evicts_oldest() {
        let mut history = HistoryList::new(2);
        history.add(c("A"));
        assert!(history.entries().is_empty());
        history.add(c("B"));
        assert_eq!(history.entries(), &[c("A")]);
        history.add(c("C"));
        assert_eq!(history.entries(), &[c("B"), c("A")]);
        history.add(c("D"));
        assert_eq!(history.entries(), &[c("C"), c("B")]);
    }

    #[test]
    fn re_adding_moves_value_to_front() {
        let mut history = HistoryList::new(5);
        for s in ["A", "B", "C", "A", "D"] {
            history.add(c(s));
        }
        assert_eq!(history.entries(), &[c("A"), c("C"), c("B")]);
    }

    #[test]
    fn adding_live_value_removes_it_from_entries() {
        let mut history = HistoryList::new(5);
        history.initialize([c("A"), c("B")]);
        history.add(c("B"));
        assert_eq!(history.entries(), &[c("A")]);
    }

    #[test]
    fn match_all_is_never_stored() {
        let mut history = HistoryList::new(3);
        history.add(Choice::default());
        history.add(c("A"));
        assert!(history.entries().is_empty());
    }

    #[test]
    fn zero_max_stores_nothing() {
        let mut history = HistoryList::new(0);
        history.add(c("A"));
        history.add(c("B"));
        assert!(history.is_empty());
    }

    #[test]
    fn restrict_round_trip_restores_view() {
        let mut history = HistoryList::new(4);
        history.initialize([c("x"), c("y"), c("z")]);
        let before = history.items().to_vec();

        history.restrict(&c("y"));
        assert_eq!(history.items(), &[c("x"), c("z")]);
        assert_eq!(history.entries().len(), 3);

        history.clear_restrictions();
        assert_eq!(history.items(), before.as_slice());
        assert!(!history.is_restricted());
    }

    #[test]
    fn shrinking_drops_the_restriction() {
        let mut history = HistoryList::new(4);
        history.initialize([c("a"), c("b"), c("c")]);
        history.restrict(&c("a"));

        history.set_max_history(2);
        assert_eq!(history.entries(), &[c("a"), c("b")]);
        assert!(!history.is_restricted());
        assert!(history
            .items()
            .iter()
            .all(|item| history.entries().contains(item)));
    }

    #[test]
    fn growing_keeps_the_restriction() {
        let mut history = HistoryList::new(3);
        history.initialize([c("a"), c("b")]);
        history.restrict(&c("a"));
        history.set_max_history(5);
        assert_eq!(history.items(), &[c("b")]);
    }

    #[test]
    fn restricting_absent_value_changes_nothing() {
        let mut history = HistoryList::new(4);
        history.initialize([c("x")]);
        history.restrict(&c("q"));
        assert!(!history.is_restricted());
    }

    #[test]
    fn closest_match_prefers_most_recent_on_ties() {
        let mut history = HistoryList::with_text_matching(5, TextComparison::CaseSensitive);
        history.initialize([c("abc"), c("abd"), c("xy")]);
        let m = history.closest_match(&c("ab"));
        assert!(!m.exact);
        assert_eq!(m.content, Some(c("abc")));
        assert_eq!(m.index, Some(0));
        assert_eq!(m.len, 2);
    }

    #[test]
    fn closest_match_exact() {
        let mut history = HistoryList::with_text_matching(5, TextComparison::CaseSensitive);
        history.initialize([c("abc")]);
        let m = history.closest_match(&c("abc"));
        assert!(m.exact);
        assert_eq!(m.len, 3);
    }

    #[test]
    fn closest_match_skips_restricted_entries() {
        let mut history = HistoryList::with_text_matching(5, TextComparison::IgnoreCase);
        history.initialize([c("Paris"), c("Parma")]);
        history.restrict(&c("Paris"));
        let m = history.closest_match(&c("par"));
        assert_eq!(m.content, Some(c("Parma")));
    }

    #[test]
    fn empty_history_has_no_match() {
        let history = HistoryList::with_text_matching(5, TextComparison::IgnoreCase);
        assert!(!history.closest_match(&c("a")).is_match());
    }

    #[test]
    fn identity_mode_needs_exact_value() {
        let mut history = HistoryList::new(5);
        history.initialize([Choice::from(Value::Int(12))]);
        assert!(history.closest_match(&Choice::from(Value::Int(12))).exact);
        assert!(!history.closest_match(&c("1")).is_match());
    }

    #[test]
    fn initialize_truncates_to_max() {
        let mut history = HistoryList::new(2);
        history.initialize([c("a"), c("b"), c("c")]);
        assert_eq!(history.entries(), &[c("a"), c("b")]);
    }

    #[test]
    fn shrinking_max_truncates() {
        let mut history = HistoryList::new(3);
        history.initialize([c("a"), c("b"), c("c")]);
        history.set_max_history(1);
        assert_eq!(history.entries(), &[c("a")]);
    }

    #[test]
    fn changing_comparison_clears_entries() {
        let mut history = HistoryList::with_text_matching(3, TextComparison::CaseSensitive);
        history.initialize([c("a")]);
        history.set_string_content(Some(TextComparison::CaseSensitive));
        assert_eq!(history.entries().len(), 1);
        history.set_string_content(Some(TextComparison::IgnoreCase));
        assert!(history.entries().is_empty());
    }

    #[test]
    fn json_persistence() {
        let mut history = HistoryList::new(3);
        history.initialize([
            c("a"),
            Choice::from(Value::Int(4)),
            Choice::from(CustomChoice::match_empty("=")),
        ]);
        let json = history.to_json().unwrap();

        let mut restored = HistoryList::new(3);
        restored.load_json(&json).unwrap();
        assert_eq!(restored.entries(), history.entries());
    }
}
