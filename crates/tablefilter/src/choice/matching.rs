//! Longest-matching-prefix search used for autocompletion.

use super::Choice;
use crate::value::Value;

/// Character equality rule for prefix matching.
#[derive(Clone, Copy, Debug, Default)]
pub enum TextComparison {
    #[default]
    CaseSensitive,
    IgnoreCase,
    Custom(fn(char, char) -> bool),
}

impl TextComparison {
    pub fn for_ignore_case(ignore_case: bool) -> Self {
        if ignore_case {
            TextComparison::IgnoreCase
        } else {
            TextComparison::CaseSensitive
        }
    }

    pub fn chars_eq(self, a: char, b: char) -> bool {
        if a == b {
            return true;
        }
        match self {
            TextComparison::CaseSensitive => false,
            TextComparison::IgnoreCase => a.to_lowercase().eq(b.to_lowercase()),
            TextComparison::Custom(eq) => eq(a, b),
        }
    }

    /// Whether two rules behave identically.
    pub fn same_as(self, other: TextComparison) -> bool {
        match (self, other) {
            (TextComparison::CaseSensitive, TextComparison::CaseSensitive)
            | (TextComparison::IgnoreCase, TextComparison::IgnoreCase) => true,
            (TextComparison::Custom(a), TextComparison::Custom(b)) => a as usize == b as usize,
            _ => false,
        }
    }
}

/// Number of leading characters `a` and `b` share under `comparison`.
pub fn matching_length(a: &str, b: &str, comparison: TextComparison) -> usize {
    a.chars()
        .zip(b.chars())
        .take_while(|&(x, y)| comparison.chars_eq(x, y))
        .count()
}

/// Closest known entry for one query.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChoiceMatch {
    /// The entry equals the query.
    pub exact: bool,
    pub content: Option<Choice>,
    /// Position of the entry in the searched list, `None` when nothing matched.
    pub index: Option<usize>,
    /// Leading characters shared with the query.
    pub len: usize,
}

impl ChoiceMatch {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_match(&self) -> bool {
        self.index.is_some()
    }
}

/// Searches `items` in order for the entry closest to `hint`.
///
/// With a text comparison and a text hint, the entry sharing the longest
/// prefix wins; on ties the first one seen is kept, and an entry equal to the
/// query ends the search. An empty query resolves to the first entry with a
/// matched length of zero. Otherwise only an identical entry matches.
pub(crate) fn closest_in<'a>(
    items: impl Iterator<Item = &'a Choice>,
    hint: &Choice,
    comparison: Option<TextComparison>,
) -> ChoiceMatch {
    let (Some(comparison), Choice::Value(Value::Text(query))) = (comparison, hint) else {
        return exact_in(items, hint);
    };

    let query_len = query.chars().count();
    let mut best = ChoiceMatch::none();
    for (index, item) in items.enumerate() {
        let text = item.to_string();
        let len = matching_length(query, &text, comparison);
        if len == query_len && text.chars().count() == query_len {
            return ChoiceMatch {
                exact: true,
                content: Some(item.clone()),
                index: Some(index),
                len,
            };
        }
        if len > best.len || (query_len == 0 && best.index.is_none()) {
            best = ChoiceMatch {
                exact: false,
                content: Some(item.clone()),
                index: Some(index),
                len,
            };
        }
    }
    best
}

fn exact_in<'a>(items: impl Iterator<Item = &'a Choice>, hint: &Choice) -> ChoiceMatch {
    items
        .enumerate()
        .find(|(_, item)| *item == hint)
        .map(|(index, item)| ChoiceMatch {
            exact: true,
            content: Some(item.clone()),
            index: Some(index),
            len: item.to_string().chars().count(),
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(items: &[&str]) -> Vec<Choice> {
        items.iter().map(|s| Choice::from(*s)).collect()
    }

    #[test]
    fn matching_length_counts_shared_prefix() {
        assert_eq!(matching_length("abc", "abd", TextComparison::CaseSensitive), 2);
        assert_eq!(matching_length("abc", "ABC", TextComparison::CaseSensitive), 0);
        assert_eq!(matching_length("abc", "ABC", TextComparison::IgnoreCase), 3);
        assert_eq!(matching_length("", "abc", TextComparison::IgnoreCase), 0);
    }

    #[test]
    fn custom_char_rule() {
        fn digits_alike(a: char, b: char) -> bool {
            a.is_ascii_digit() && b.is_ascii_digit()
        }
        let rule = TextComparison::Custom(digits_alike);
        assert_eq!(matching_length("a12x", "a99y", rule), 3);
        assert!(rule.same_as(TextComparison::Custom(digits_alike)));
        assert!(!rule.same_as(TextComparison::IgnoreCase));
    }

    #[test]
    fn first_longest_prefix_wins() {
        let items = texts(&["abc", "abd", "xy"]);
        let m = closest_in(
            items.iter(),
            &Choice::from("ab"),
            Some(TextComparison::CaseSensitive),
        );
        assert!(!m.exact);
        assert_eq!(m.index, Some(0));
        assert_eq!(m.len, 2);
        assert_eq!(m.content, Some(Choice::from("abc")));
    }

    #[test]
    fn exact_match_stops_search() {
        let items = texts(&["ab", "abc", "abc"]);
        let m = closest_in(
            items.iter(),
            &Choice::from("abc"),
            Some(TextComparison::CaseSensitive),
        );
        assert!(m.exact);
        assert_eq!(m.index, Some(1));
        assert_eq!(m.len, 3);
    }

    #[test]
    fn ignore_case_exact_match() {
        let items = texts(&["Madrid"]);
        let m = closest_in(
            items.iter(),
            &Choice::from("madrid"),
            Some(TextComparison::IgnoreCase),
        );
        assert!(m.exact);
    }

    #[test]
    fn no_shared_prefix_is_no_match() {
        let items = texts(&["xy", "zz"]);
        let m = closest_in(
            items.iter(),
            &Choice::from("ab"),
            Some(TextComparison::CaseSensitive),
        );
        assert_eq!(m, ChoiceMatch::none());
        assert!(!m.is_match());
    }

    #[test]
    fn empty_query_resolves_to_first_entry() {
        let items = texts(&["Paris", "Madrid"]);
        let m = closest_in(
            items.iter(),
            &Choice::from(""),
            Some(TextComparison::IgnoreCase),
        );
        assert!(!m.exact);
        assert_eq!(m.index, Some(0));
        assert_eq!(m.len, 0);
        assert_eq!(m.content, Some(Choice::from("Paris")));
    }

    #[test]
    fn empty_list_is_no_match() {
        let m = closest_in(
            std::iter::empty(),
            &Choice::from("ab"),
            Some(TextComparison::IgnoreCase),
        );
        assert!(!m.is_match());
    }

    #[test]
    fn identity_mode_requires_equality() {
        let items = vec![Choice::from(Value::Int(3)), Choice::from(Value::Int(30))];
        let m = closest_in(items.iter(), &Choice::from(Value::Int(3)), Some(TextComparison::CaseSensitive));
        assert!(m.exact);
        assert_eq!(m.index, Some(0));

        let miss = closest_in(items.iter(), &Choice::from("3"), None);
        assert!(!miss.is_match());
    }
}
