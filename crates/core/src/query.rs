//! Query builder.
//!
//! Turns a declarative [`QueryOptions`] intent into a [`BuiltQuery`] the
//! record store can execute: equality conditions, a field projection, a sort
//! order, skip/limit and count-vs-fetch mode. Building never fails; anything
//! malformed falls back to its default.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::store::Document;

/// Equality filters, field name to expected value.
pub type Conditions = serde_json::Map<String, Value>;

/// Sentinel accepted in `fieldsToReturn` meaning "every field".
pub const ALL_FIELDS: &str = "*";

// ---------------------------------------------------------------------------
// QueryOptions
// ---------------------------------------------------------------------------

/// Caller-facing query intent. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QueryOptions {
    pub conditions: Conditions,
    /// Space-delimited field list, or [`ALL_FIELDS`] / absent for all fields.
    pub fields_to_return: Option<String>,
    /// Space-delimited sort keys, `-` prefix for descending (`"-createdOn brand"`).
    pub sort_condition: Option<String>,
    pub skip: Option<u64>,
    pub limit: Option<u64>,
    pub count: Option<bool>,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lenient constructor from an arbitrary JSON value; anything that does
    /// not deserialize yields the defaults.
    pub fn from_value(value: &Value) -> Self {
        serde_json::from_value(value.clone()).unwrap_or_default()
    }

    pub fn with_condition(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.insert(field.into(), value.into());
        self
    }

    pub fn with_fields(mut self, fields: impl Into<String>) -> Self {
        self.fields_to_return = Some(fields.into());
        self
    }

    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        self.sort_condition = Some(sort.into());
        self
    }

    pub fn with_count(mut self, count: bool) -> Self {
        self.count = Some(count);
        self
    }
}

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

/// Which fields of a record to return.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Projection {
    #[default]
    All,
    Fields(Vec<String>),
}

impl Projection {
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty() && *s != ALL_FIELDS) else {
            return Projection::All;
        };

        let fields: Vec<String> = raw
            .split_whitespace()
            .filter(|f| is_field_name(f))
            .map(str::to_string)
            .collect();

        if fields.is_empty() {
            Projection::All
        } else {
            Projection::Fields(fields)
        }
    }

    /// Copy of `doc` restricted to the projected fields.
    pub fn apply(&self, doc: &Document) -> Document {
        match self {
            Projection::All => doc.clone(),
            Projection::Fields(fields) => fields
                .iter()
                .filter_map(|f| doc.get(f).map(|v| (f.clone(), v.clone())))
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Sort
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub direction: SortDirection,
}

/// Ordered list of sort keys. Empty means store order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortCondition(pub Vec<SortKey>);

impl SortCondition {
    pub fn parse(raw: Option<&str>) -> Self {
        let keys = raw
            .unwrap_or_default()
            .split_whitespace()
            .filter_map(|token| {
                let (field, direction) = match token.strip_prefix('-') {
                    Some(rest) => (rest, SortDirection::Descending),
                    None => (token.trim_start_matches('+'), SortDirection::Ascending),
                };
                is_field_name(field).then(|| SortKey {
                    field: field.to_string(),
                    direction,
                })
            })
            .collect();
        SortCondition(keys)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Compare two documents by these keys.
    pub fn compare(&self, a: &Document, b: &Document) -> Ordering {
        for key in &self.0 {
            let ord = compare_values(a.get(&key.field), b.get(&key.field));
            let ord = match key.direction {
                SortDirection::Ascending => ord,
                SortDirection::Descending => ord.reverse(),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }
}

/// Total order over JSON scalars: missing/null < bool < number < string < other.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(v: Option<&Value>) -> u8 {
        match v {
            None | Some(Value::Null) => 0,
            Some(Value::Bool(_)) => 1,
            Some(Value::Number(_)) => 2,
            Some(Value::String(_)) => 3,
            Some(_) => 4,
        }
    }

    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

/// Field names are restricted to `[A-Za-z0-9_]+`.
fn is_field_name(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

// ---------------------------------------------------------------------------
// BuiltQuery
// ---------------------------------------------------------------------------

/// Store-ready query produced by [`build_query`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuiltQuery {
    pub seek_conditions: Conditions,
    pub fields_to_return: Projection,
    pub sort_condition: SortCondition,
    pub skip: u64,
    /// `None` means unbounded.
    pub limit: Option<u64>,
    pub count: bool,
}

impl BuiltQuery {
    /// Merge extra conditions; on a key clash the extra value wins.
    pub fn with_extra_conditions(mut self, extra: Conditions) -> Self {
        self.seek_conditions.extend(extra);
        self
    }

    /// Whether `doc` satisfies every equality condition.
    pub fn matches(&self, doc: &Document) -> bool {
        self.seek_conditions
            .iter()
            .all(|(field, expected)| doc.get(field) == Some(expected))
    }
}

pub fn build_query(options: &QueryOptions) -> BuiltQuery {
    BuiltQuery {
        seek_conditions: options.conditions.clone(),
        fields_to_return: Projection::parse(options.fields_to_return.as_deref()),
        sort_condition: SortCondition::parse(options.sort_condition.as_deref()),
        skip: options.skip.unwrap_or(0),
        limit: options.limit.filter(|l| *l > 0),
        count: options.count.unwrap_or(false),
    }
}
