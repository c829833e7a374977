//! Cell values and column typing.
//!
//! Every cell the filters look at is a [`Value`]. Values are hashable (floats
//! hash by bit pattern) so they can live in choice sets, and totally ordered so
//! a choice popup can present them sorted.
//!
//! A column's [`ColumnType`] decides whether its candidate values come from a
//! fixed domain (booleans, tag enumerations) or have to be harvested from the
//! live data.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// A single cell value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Int(_) | Value::Float(_) => 2,
            Value::Text(_) => 3,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Text(a), Value::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            Value::Null => {}
            Value::Bool(b) => b.hash(state),
            Value::Int(i) => {
                0u8.hash(state);
                i.hash(state);
            }
            Value::Float(f) => {
                1u8.hash(state);
                f.to_bits().hash(state);
            }
            Value::Text(s) => s.hash(state),
        }
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Float(a), Value::Float(b)) => a.total_cmp(b),
            // Numerically equal ints sort before floats to stay consistent with Eq.
            (Value::Int(a), Value::Float(b)) => (*a as f64).total_cmp(b).then(Ordering::Less),
            (Value::Float(a), Value::Int(b)) => a.total_cmp(&(*b as f64)).then(Ordering::Greater),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::Text(s),
            other => Value::Text(other.to_string()),
        }
    }
}

/// The declared type of a column.
///
/// `Bool` and `Enum` columns are *enumerable*: their candidate values are a
/// small closed set known without looking at the rows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ColumnType {
    Bool,
    Int,
    Float,
    #[default]
    Text,
    /// A closed set of tags, stored in cells as `Value::Text`.
    Enum(Vec<String>),
}

impl ColumnType {
    pub fn is_enumerable(&self) -> bool {
        matches!(self, ColumnType::Bool | ColumnType::Enum(_))
    }

    /// The fixed domain of an enumerable column, `None` for free-form columns.
    pub fn domain(&self) -> Option<Vec<Value>> {
        match self {
            ColumnType::Bool => Some(vec![Value::Bool(true), Value::Bool(false)]),
            ColumnType::Enum(tags) => Some(tags.iter().map(|t| Value::Text(t.clone())).collect()),
            _ => None,
        }
    }

    /// Best-effort type of a column holding `value`.
    pub fn infer(value: &Value) -> ColumnType {
        match value {
            Value::Bool(_) => ColumnType::Bool,
            Value::Int(_) => ColumnType::Int,
            Value::Float(_) => ColumnType::Float,
            Value::Null | Value::Text(_) => ColumnType::Text,
        }
    }
}

/// Converts a value into the text an editor shows and matches against.
pub trait ValueFormat {
    fn format(&self, value: &Value) -> String;
}

impl<F> ValueFormat for F
where
    F: Fn(&Value) -> String,
{
    fn format(&self, value: &Value) -> String {
        self(value)
    }
}

/// Shared handle to a format, as stored in editor configuration.
pub type FormatRef = Rc<dyn ValueFormat>;

/// Formats `value` with `format`, or with its `Display` form when unset.
pub fn format_value(format: Option<&FormatRef>, value: &Value) -> String {
    match format {
        Some(f) => f.format(value),
        None => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn floats_compare_by_bits() {
        assert_eq!(Value::Float(1.5), Value::Float(1.5));
        assert_eq!(Value::Float(f64::NAN), Value::Float(f64::NAN));
        assert_ne!(Value::Int(1), Value::Float(1.0));
    }

    #[test]
    fn hash_set_deduplicates_values() {
        let set: HashSet<Value> = [Value::from(1), Value::from(1), Value::from("a"), Value::from("a")]
            .into_iter()
            .collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn ordering_groups_by_kind_then_value() {
        let mut values = vec![
            Value::from("b"),
            Value::from(3),
            Value::Null,
            Value::from(true),
            Value::from(1.5),
            Value::from("a"),
        ];
        values.sort();
        assert_eq!(
            values,
            vec![
                Value::Null,
                Value::from(true),
                Value::from(1.5),
                Value::from(3),
                Value::from("a"),
                Value::from("b"),
            ]
        );
    }

    #[test]
    fn int_sorts_before_equal_float() {
        assert_eq!(Value::Int(2).cmp(&Value::Float(2.0)), Ordering::Less);
        assert_eq!(Value::Float(2.0).cmp(&Value::Int(2)), Ordering::Greater);
    }

    #[test]
    fn display_of_null_is_empty() {
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(Value::from(42).to_string(), "42");
    }

    #[test]
    fn json_values_convert() {
        let json: serde_json::Value = serde_json::json!([1, 2.5, "x", true, null]);
        let values: Vec<Value> = json
            .as_array()
            .unwrap()
            .iter()
            .cloned()
            .map(Value::from)
            .collect();
        assert_eq!(
            values,
            vec![
                Value::Int(1),
                Value::Float(2.5),
                Value::from("x"),
                Value::Bool(true),
                Value::Null
            ]
        );
    }

    #[test]
    fn enumerable_domains() {
        assert_eq!(
            ColumnType::Bool.domain(),
            Some(vec![Value::Bool(true), Value::Bool(false)])
        );
        let tags = ColumnType::Enum(vec!["low".into(), "high".into()]);
        assert!(tags.is_enumerable());
        assert_eq!(tags.domain().unwrap().len(), 2);
        assert!(ColumnType::Text.domain().is_none());
        assert!(!ColumnType::Int.is_enumerable());
    }

    #[test]
    fn closure_formats() {
        let fmt: FormatRef = Rc::new(|v: &Value| format!("<{}>", v));
        assert_eq!(format_value(Some(&fmt), &Value::from(7)), "<7>");
        assert_eq!(format_value(None, &Value::from(7)), "7");
    }
}
