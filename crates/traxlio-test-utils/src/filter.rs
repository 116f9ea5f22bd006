use std::cmp::Ordering;

use serde_json::Value;

/// The subset of PostgREST query parameters the adapter sends.
#[derive(Debug, Default)]
pub(crate) struct RowQuery {
    pub filters: Vec<(String, Condition)>,
    pub order: Option<(String, bool)>,
    pub limit: Option<usize>,
}

#[derive(Debug, PartialEq)]
pub(crate) enum Condition {
    Eq(String),
    In(Vec<String>),
}

impl RowQuery {
    pub fn parse(params: &[(String, String)]) -> Result<Self, String> {
        let mut query = RowQuery::default();
        for (key, value) in params {
            match key.as_str() {
                "select" => {}
                "order" => {
                    let (column, direction) =
                        value.split_once('.').unwrap_or((value.as_str(), "asc"));
                    query.order = Some((column.to_string(), direction == "desc"));
                }
                "limit" => {
                    let limit = value
                        .parse()
                        .map_err(|_| format!("invalid limit `{}`", value))?;
                    query.limit = Some(limit);
                }
                column => {
                    query
                        .filters
                        .push((column.to_string(), Condition::parse(value)?));
                }
            }
        }
        Ok(query)
    }

    pub fn matches(&self, row: &Value) -> bool {
        self.filters.iter().all(|(column, condition)| {
            let Some(field) = row.get(column).and_then(scalar) else {
                return false;
            };
            match condition {
                Condition::Eq(expected) => &field == expected,
                Condition::In(options) => options.contains(&field),
            }
        })
    }

    /// Filter, order and limit `rows`.
    pub fn select(&self, rows: &[Value]) -> Vec<Value> {
        let mut selected: Vec<Value> = rows.iter().filter(|r| self.matches(r)).cloned().collect();

        if let Some((column, descending)) = &self.order {
            selected.sort_by(|a, b| {
                let ordering = compare(a.get(column), b.get(column));
                if *descending { ordering.reverse() } else { ordering }
            });
        }
        if let Some(limit) = self.limit {
            selected.truncate(limit);
        }
        selected
    }
}

impl Condition {
    fn parse(value: &str) -> Result<Self, String> {
        if let Some(rest) = value.strip_prefix("eq.") {
            return Ok(Condition::Eq(rest.to_string()));
        }
        if let Some(list) = value
            .strip_prefix("in.(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            return Ok(Condition::In(split_list(list)));
        }
        Err(format!("unsupported filter `{}`", value))
    }
}

/// Split `"a","b,c",d` into its members, honouring quotes and backslash escapes.
fn split_list(list: &str) -> Vec<String> {
    let mut values = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut chars = list.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' if quoted => {
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            }
            '"' => quoted = !quoted,
            ',' if !quoted => values.push(std::mem::take(&mut current)),
            c => current.push(c),
        }
    }
    if !list.is_empty() {
        values.push(current);
    }
    values
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(x), Some(y)) => scalar(x).cmp(&scalar(y)),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn parses_quoted_in_lists() {
        assert_eq!(split_list(r#""a","b,c","d\"e""#), ["a", "b,c", "d\"e"]);
        assert_eq!(split_list("x,y"), ["x", "y"]);
        assert!(split_list("").is_empty());
    }

    #[test]
    fn filters_orders_and_limits() {
        let rows = vec![
            json!({"id": "1", "user_id": "u1", "updated_at": "2024-01-01T00:00:00Z"}),
            json!({"id": "2", "user_id": "u2", "updated_at": "2024-01-03T00:00:00Z"}),
            json!({"id": "3", "user_id": "u1", "updated_at": "2024-01-02T00:00:00Z"}),
        ];
        let query = RowQuery::parse(&params(&[
            ("select", "*"),
            ("user_id", "eq.u1"),
            ("order", "updated_at.desc"),
            ("limit", "5"),
        ]))
        .unwrap();

        let ids: Vec<_> = query.select(&rows).iter().map(|r| r["id"].clone()).collect();
        assert_eq!(ids, [json!("3"), json!("1")]);
    }

    #[test]
    fn rejects_unknown_operators() {
        assert!(RowQuery::parse(&params(&[("name", "like.*x*")])).is_err());
    }
}
