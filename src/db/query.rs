//! Structured query builder for PostgREST-style table access.
//!
//! A [`Filter`] is a conjunction of `(field, operator, value)` conditions. It
//! renders to `field=op.value` query pairs, which the HTTP client encodes, and it
//! can also be evaluated directly against a JSON row by in-process backends.

use std::cmp::Ordering;
use std::fmt;

use serde_json::Value;

use crate::db::timestamp::parse_timestamp;

/// Comparison operator supported by the REST filter syntax.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FilterOp {
    /// Equal.
    Eq,
    /// Strictly less than.
    Lt,
    /// Case-insensitive pattern match with `%` wildcards.
    ILike,
}

impl FilterOp {
    /// Operator keyword as used in query strings.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Lt => "lt",
            Self::ILike => "ilike",
        }
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single `field op value` condition.
#[derive(Clone, Debug, PartialEq)]
pub struct Condition {
    /// Column name.
    pub field: String,
    /// Comparison operator.
    pub op: FilterOp,
    /// Operand.
    pub value: Value,
}

impl Condition {
    /// Render the right-hand side of the query pair, e.g. `eq.42`.
    #[must_use]
    pub fn operand(&self) -> String {
        format!("{}.{}", self.op, render_value(&self.value))
    }

    /// Evaluate the condition against a JSON row.
    ///
    /// Missing columns behave as SQL `NULL`: they never satisfy an ordering
    /// comparison.
    #[must_use]
    pub fn matches(&self, row: &Value) -> bool {
        let actual = row.get(&self.field).unwrap_or(&Value::Null);
        match self.op {
            FilterOp::Eq => values_equal(actual, &self.value),
            FilterOp::Lt => compare_values(actual, &self.value) == Some(Ordering::Less),
            FilterOp::ILike => match (actual.as_str(), self.value.as_str()) {
                (Some(text), Some(pattern)) => ilike_matches(text, pattern),
                _ => false,
            },
        }
    }
}

/// Conjunction of conditions (`AND` semantics).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    /// Create an empty filter that matches every row.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            conditions: Vec::new(),
        }
    }

    /// Append an arbitrary condition.
    #[must_use]
    pub fn condition(
        mut self,
        field: impl Into<String>,
        op: FilterOp,
        value: impl Into<Value>,
    ) -> Self {
        self.conditions.push(Condition {
            field: field.into(),
            op,
            value: value.into(),
        });
        self
    }

    /// `field = value`.
    #[must_use]
    pub fn eq(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.condition(field, FilterOp::Eq, value)
    }

    /// `field < value`.
    #[must_use]
    pub fn lt(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.condition(field, FilterOp::Lt, value)
    }

    /// `field ILIKE pattern`.
    #[must_use]
    pub fn ilike(self, field: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.condition(field, FilterOp::ILike, pattern.into())
    }

    /// Query pairs for the HTTP client, e.g. `("user_id", "eq.abc")`.
    #[must_use]
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        self.conditions
            .iter()
            .map(|c| (c.field.clone(), c.operand()))
            .collect()
    }

    /// Evaluate every condition against a row.
    #[must_use]
    pub fn matches(&self, row: &Value) -> bool {
        self.conditions.iter().all(|c| c.matches(row))
    }
}

impl fmt::Display for Filter {
    /// Render as an encoded query string, e.g. `user_id=eq.abc&created_at=lt.2025-01-01`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for condition in &self.conditions {
            if !first {
                f.write_str("&")?;
            }
            first = false;
            write!(
                f,
                "{}={}.{}",
                urlencoding::encode(&condition.field),
                condition.op,
                urlencoding::encode(&render_value(&condition.value))
            )?;
        }
        Ok(())
    }
}

/// Sort specification.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Order {
    /// Column to sort on.
    pub column: String,
    /// Descending when true.
    pub descending: bool,
}

impl Order {
    /// Descending order on a column.
    #[must_use]
    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: true,
        }
    }

    /// Value for the `order` query parameter.
    #[must_use]
    pub fn to_param(&self) -> String {
        let direction = if self.descending { "desc" } else { "asc" };
        format!("{}.{direction}", self.column)
    }

    /// Compare two rows according to this order. `NULL` sorts first ascending.
    #[must_use]
    pub fn compare_rows(&self, a: &Value, b: &Value) -> Ordering {
        let left = a.get(&self.column).unwrap_or(&Value::Null);
        let right = b.get(&self.column).unwrap_or(&Value::Null);
        let ordering = match (left.is_null(), right.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => compare_values(left, right).unwrap_or(Ordering::Equal),
        };
        if self.descending {
            ordering.reverse()
        } else {
            ordering
        }
    }
}

/// A `SELECT` against one table.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SelectQuery {
    /// Projected columns; `None` selects `*`.
    pub columns: Option<Vec<String>>,
    /// Row filter.
    pub filter: Filter,
    /// Optional sort.
    pub order: Option<Order>,
    /// Optional row limit.
    pub limit: Option<usize>,
}

impl SelectQuery {
    /// Select every column of every row.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            columns: None,
            filter: Filter::new(),
            order: None,
            limit: None,
        }
    }

    /// Restrict the projection.
    #[must_use]
    pub fn columns(mut self, columns: &[&str]) -> Self {
        self.columns = Some(columns.iter().map(|c| (*c).to_string()).collect());
        self
    }

    /// Set the filter.
    #[must_use]
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    /// Set the sort order.
    #[must_use]
    pub fn order(mut self, order: Order) -> Self {
        self.order = Some(order);
        self
    }

    /// Set the row limit.
    #[must_use]
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Value for the `select` query parameter.
    #[must_use]
    pub fn select_param(&self) -> String {
        self.columns
            .as_ref()
            .map_or_else(|| "*".to_string(), |cols| cols.join(","))
    }

    /// Full set of query pairs: projection, filters, order, limit.
    #[must_use]
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![("select".to_string(), self.select_param())];
        pairs.extend(self.filter.to_query_pairs());
        if let Some(order) = &self.order {
            pairs.push(("order".to_string(), order.to_param()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        pairs
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

fn values_equal(actual: &Value, expected: &Value) -> bool {
    if actual.is_null() || expected.is_null() {
        return actual.is_null() && expected.is_null();
    }
    actual == expected || render_value(actual) == render_value(expected)
}

fn compare_values(actual: &Value, expected: &Value) -> Option<Ordering> {
    match (actual, expected) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => {
            match (parse_timestamp(a), parse_timestamp(b)) {
                (Some(ta), Some(tb)) => Some(ta.cmp(&tb)),
                _ => Some(a.cmp(b)),
            }
        }
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

fn ilike_matches(text: &str, pattern: &str) -> bool {
    let text = text.to_lowercase();
    let pattern = pattern.to_lowercase();
    let parts: Vec<&str> = pattern.split('%').collect();
    let Some((first, rest)) = parts.split_first() else {
        return text.is_empty();
    };
    let Some((last, middle)) = rest.split_last() else {
        return text == *first;
    };

    let Some(mut remaining) = text.strip_prefix(first) else {
        return false;
    };
    for part in middle {
        match remaining.find(part) {
            Some(idx) => remaining = &remaining[idx + part.len()..],
            None => return false,
        }
    }
    remaining.ends_with(last)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_filter_renders_conjunction() {
        let filter = Filter::new()
            .eq("user_id", "u-1")
            .lt("created_at", "2025-01-01T00:00:00.000000Z");

        assert_eq!(
            filter.to_query_pairs(),
            vec![
                ("user_id".to_string(), "eq.u-1".to_string()),
                (
                    "created_at".to_string(),
                    "lt.2025-01-01T00:00:00.000000Z".to_string()
                ),
            ]
        );
        assert_eq!(
            filter.to_string(),
            "user_id=eq.u-1&created_at=lt.2025-01-01T00%3A00%3A00.000000Z"
        );
    }

    #[test]
    fn test_filter_values_are_encoded() {
        let filter = Filter::new().eq("user_id", "a&b=c");
        assert_eq!(filter.to_string(), "user_id=eq.a%26b%3Dc");
        assert!(filter.matches(&json!({"user_id": "a&b=c"})));
        assert!(!filter.matches(&json!({"user_id": "a"})));
    }

    #[test]
    fn test_ordering_comparisons_use_timestamps() {
        let row = json!({"created_at": "2025-01-01T10:00:00+00:00"});
        assert!(Filter::new().lt("created_at", "2025-01-01T10:00:01.000000Z").matches(&row));
        assert!(!Filter::new().lt("created_at", "2025-01-01T10:00:00.000000Z").matches(&row));
        assert!(!Filter::new().lt("missing", 1).matches(&row));
    }

    #[test]
    fn test_eq_tolerates_number_strings() {
        let row = json!({"life_stage_id": 3, "is_featured": true});
        assert!(Filter::new().eq("life_stage_id", 3).matches(&row));
        assert!(Filter::new().eq("life_stage_id", "3").matches(&row));
        assert!(Filter::new().eq("is_featured", true).matches(&row));
        assert!(!Filter::new().eq("life_stage_id", 4).matches(&row));
    }

    #[test]
    fn test_ilike_wildcards() {
        assert!(ilike_matches("Healthy Pregnancy Diet", "%pregnancy%"));
        assert!(ilike_matches("Healthy Pregnancy Diet", "healthy%"));
        assert!(ilike_matches("Healthy Pregnancy Diet", "%diet"));
        assert!(ilike_matches("abc", "abc"));
        assert!(!ilike_matches("abc", "%bc%c"));
        assert!(!ilike_matches("Sleep tips", "%pregnancy%"));
    }

    #[test]
    fn test_select_query_pairs() {
        let query = SelectQuery::new()
            .columns(&["created_at"])
            .filter(Filter::new().eq("user_id", "u"))
            .order(Order::desc("created_at"))
            .limit(50);

        assert_eq!(
            query.to_query_pairs(),
            vec![
                ("select".to_string(), "created_at".to_string()),
                ("user_id".to_string(), "eq.u".to_string()),
                ("order".to_string(), "created_at.desc".to_string()),
                ("limit".to_string(), "50".to_string()),
            ]
        );
        assert_eq!(SelectQuery::new().select_param(), "*");
    }

    #[test]
    fn test_order_compares_rows() {
        let older = json!({"created_at": "2025-01-01T00:00:00Z"});
        let newer = json!({"created_at": "2025-01-02T00:00:00Z"});
        let missing = json!({});

        let desc = Order::desc("created_at");
        assert_eq!(desc.compare_rows(&newer, &older), Ordering::Less);
        assert_eq!(desc.compare_rows(&missing, &older), Ordering::Greater);
    }
}
