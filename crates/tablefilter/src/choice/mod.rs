//! # Choices
//!
//! A [`Choice`] is something an editor can offer: either a plain cell
//! [`Value`] harvested from the data, or a [`CustomChoice`] supplied by the
//! user (a labelled predicate such as "match all", "match empty" or a
//! regular expression).
//!
//! A [`ChoiceSet`] holds the distinct candidates of one column. Storage order is
//! insertion order; [`ChoiceSet::sorted`] gives the display order: custom
//! choices first (by precedence, then label), then values.

mod matching;

pub use matching::{matching_length, ChoiceMatch, TextComparison};
pub(crate) use matching::closest_in;

use crate::error::Result;
use crate::filter::Predicate;
use crate::model::RowEntry;
use crate::value::{format_value, FormatRef, Value};
use indexmap::IndexSet;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// Ordering used to present value choices.
pub type ValueComparator = Rc<dyn Fn(&Value, &Value) -> Ordering>;

pub const DEFAULT_PRECEDENCE: i32 = 0;
pub const MATCH_ALL_PRECEDENCE: i32 = -255;

/// How a custom choice decides whether a cell matches.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChoiceMatcher {
    /// Every row.
    All,
    /// Null cells, or cells whose text is blank.
    Empty,
    /// Cells equal to the value (text compared per the editor's case rule).
    Equals { value: Value },
    /// Cells whose text fully matches the expression.
    Pattern {
        #[serde(with = "anchored_pattern")]
        pattern: Regex,
    },
}

/// A user-supplied, labelled choice.
///
/// Identity is the label plus precedence.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CustomChoice {
    label: String,
    #[serde(default)]
    precedence: i32,
    matcher: ChoiceMatcher,
}

impl CustomChoice {
    pub fn new(label: impl Into<String>, precedence: i32, matcher: ChoiceMatcher) -> Self {
        Self {
            label: label.into(),
            precedence,
            matcher,
        }
    }

    /// The "no filter" choice: empty label, shown before anything else.
    pub fn match_all() -> Self {
        Self::new("", MATCH_ALL_PRECEDENCE, ChoiceMatcher::All)
    }

    pub fn match_empty(label: impl Into<String>) -> Self {
        Self::new(label, DEFAULT_PRECEDENCE, ChoiceMatcher::Empty)
    }

    pub fn equals(label: impl Into<String>, value: Value) -> Self {
        Self::new(label, DEFAULT_PRECEDENCE, ChoiceMatcher::Equals { value })
    }

    /// A choice matching cells whose whole text matches `pattern`.
    pub fn pattern(label: impl Into<String>, pattern: &str) -> Result<Self> {
        Ok(Self::new(
            label,
            DEFAULT_PRECEDENCE,
            ChoiceMatcher::Pattern {
                pattern: anchored_pattern::compile(pattern)?,
            },
        ))
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn precedence(&self) -> i32 {
        self.precedence
    }

    pub fn matcher(&self) -> &ChoiceMatcher {
        &self.matcher
    }

    pub fn is_match_all(&self) -> bool {
        matches!(self.matcher, ChoiceMatcher::All)
    }
}

impl PartialEq for CustomChoice {
    fn eq(&self, other: &Self) -> bool {
        self.label == other.label && self.precedence == other.precedence
    }
}

impl Eq for CustomChoice {}

impl Hash for CustomChoice {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.label.hash(state);
        self.precedence.hash(state);
    }
}

/// A candidate an editor can offer or hold as content.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Choice {
    Value(Value),
    Custom(CustomChoice),
}

impl Default for Choice {
    fn default() -> Self {
        Choice::Custom(CustomChoice::match_all())
    }
}

impl Choice {
    pub fn is_match_all(&self) -> bool {
        matches!(self, Choice::Custom(c) if c.is_match_all())
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Choice::Value(v) => Some(v),
            Choice::Custom(_) => None,
        }
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Choice::Value(v) => write!(f, "{}", v),
            Choice::Custom(c) => f.write_str(&c.label),
        }
    }
}

impl From<Value> for Choice {
    fn from(value: Value) -> Self {
        Choice::Value(value)
    }
}

impl From<CustomChoice> for Choice {
    fn from(custom: CustomChoice) -> Self {
        Choice::Custom(custom)
    }
}

impl From<&str> for Choice {
    fn from(s: &str) -> Self {
        Choice::Value(Value::from(s))
    }
}

/// Options that shape the predicate built for a choice.
#[derive(Clone, Default)]
pub struct MatchOptions {
    pub ignore_case: bool,
    pub format: Option<FormatRef>,
}

/// Builds the row predicate selecting `choice` on `column`.
pub fn predicate_for(choice: &Choice, column: usize, options: &MatchOptions) -> Predicate {
    let ignore_case = options.ignore_case;
    match choice {
        Choice::Value(value) => equals_predicate(value.clone(), column, ignore_case),
        Choice::Custom(custom) => match custom.matcher() {
            ChoiceMatcher::All => Rc::new(|_: &dyn RowEntry| true),
            ChoiceMatcher::Equals { value } => equals_predicate(value.clone(), column, ignore_case),
            ChoiceMatcher::Empty => {
                let format = options.format.clone();
                Rc::new(move |row: &dyn RowEntry| {
                    let cell = row.value(column);
                    cell.is_null() || format_value(format.as_ref(), &cell).trim().is_empty()
                })
            }
            ChoiceMatcher::Pattern { pattern } => {
                let pattern = pattern.clone();
                let format = options.format.clone();
                Rc::new(move |row: &dyn RowEntry| {
                    let cell = row.value(column);
                    !cell.is_null() && pattern.is_match(&format_value(format.as_ref(), &cell))
                })
            }
        },
    }
}

fn equals_predicate(expected: Value, column: usize, ignore_case: bool) -> Predicate {
    Rc::new(move |row: &dyn RowEntry| {
        let cell = row.value(column);
        match (&expected, &cell) {
            (Value::Text(a), Value::Text(b)) if ignore_case => {
                a.chars().flat_map(char::to_lowercase).eq(b.chars().flat_map(char::to_lowercase))
            }
            _ => expected == cell,
        }
    })
}

/// The distinct candidate values of one column.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChoiceSet {
    items: IndexSet<Choice>,
}

impl ChoiceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a choice, returning false if it was already present.
    pub fn insert(&mut self, choice: impl Into<Choice>) -> bool {
        self.items.insert(choice.into())
    }

    pub fn contains(&self, choice: &Choice) -> bool {
        self.items.contains(choice)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Choice> {
        self.items.iter()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Plain values held, in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.items.iter().filter_map(Choice::as_value)
    }

    /// Display order: custom choices by precedence then label, then values by
    /// `comparator` (or their natural order).
    pub fn sorted(&self, comparator: Option<&ValueComparator>) -> Vec<Choice> {
        let mut custom: Vec<&CustomChoice> = Vec::new();
        let mut values: Vec<&Value> = Vec::new();
        for item in &self.items {
            match item {
                Choice::Custom(c) => custom.push(c),
                Choice::Value(v) => values.push(v),
            }
        }
        custom.sort_by(|a, b| a.precedence.cmp(&b.precedence).then_with(|| a.label.cmp(&b.label)));
        match comparator {
            Some(cmp) => values.sort_by(|a, b| cmp(a, b)),
            None => values.sort(),
        }
        custom
            .into_iter()
            .cloned()
            .map(Choice::Custom)
            .chain(values.into_iter().cloned().map(Choice::Value))
            .collect()
    }

    /// Closest candidate to `hint`, searched in display order.
    pub fn closest_match(
        &self,
        hint: &Choice,
        comparison: Option<TextComparison>,
        comparator: Option<&ValueComparator>,
    ) -> ChoiceMatch {
        let sorted = self.sorted(comparator);
        closest_in(sorted.iter(), hint, comparison)
    }
}

impl<C: Into<Choice>> FromIterator<C> for ChoiceSet {
    fn from_iter<I: IntoIterator<Item = C>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<C: Into<Choice>> Extend<C> for ChoiceSet {
    fn extend<I: IntoIterator<Item = C>>(&mut self, iter: I) {
        self.items.extend(iter.into_iter().map(Into::into));
    }
}

/// Serializes a full-match expression as the pattern the user wrote.
mod anchored_pattern {
    use regex::Regex;
    use serde::{Deserialize, Deserializer, Serializer};

    const PREFIX: &str = "^(?:";
    const SUFFIX: &str = ")$";

    pub fn compile(source: &str) -> Result<Regex, regex::Error> {
        Regex::new(&format!("{}{}{}", PREFIX, source, SUFFIX))
    }

    fn source(regex: &Regex) -> &str {
        let full = regex.as_str();
        full.strip_prefix(PREFIX)
            .and_then(|s| s.strip_suffix(SUFFIX))
            .unwrap_or(full)
    }

    pub fn serialize<S: Serializer>(regex: &Regex, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(source(regex))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Regex, D::Error> {
        let source = String::deserialize(deserializer)?;
        compile(&source).map_err(serde::de::Error::custom)
    }
}
