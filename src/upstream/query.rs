//! Table queries against the data API.
//!
//! A [`Query`] is rendered to the data API's query-string dialect
//! (`column=eq.value`, `order=column.asc`, `limit=n`). The same description
//! can be evaluated against in-memory rows with [`Query::apply`], which is
//! how alternative [`Upstream`](crate::upstream::Upstream) implementations
//! stay consistent with the HTTP one.

use std::cmp::Ordering;

use serde_json::Value;

/// Equality filter on a single column.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub value: Value,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

/// Sort key.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub column: String,
    pub direction: Direction,
}

/// A read against one table.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    table: String,
    columns: String,
    filters: Vec<Filter>,
    order: Vec<Order>,
    limit: Option<usize>,
}

impl Query {
    /// Start a query selecting every column of `table`.
    pub fn from(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: "*".to_string(),
            filters: Vec::new(),
            order: Vec::new(),
            limit: None,
        }
    }

    pub fn select(mut self, columns: impl Into<String>) -> Self {
        self.columns = columns.into();
        self
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(Filter {
            column: column.into(),
            value: value.into(),
        });
        self
    }

    pub fn order_asc(mut self, column: impl Into<String>) -> Self {
        self.order.push(Order {
            column: column.into(),
            direction: Direction::Asc,
        });
        self
    }

    pub fn order_desc(mut self, column: impl Into<String>) -> Self {
        self.order.push(Order {
            column: column.into(),
            direction: Direction::Desc,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Query-string parameters in the data API dialect.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![("select".to_string(), self.columns.clone())];
        for filter in &self.filters {
            params.push((filter.column.clone(), format!("eq.{}", render_value(&filter.value))));
        }
        if !self.order.is_empty() {
            let order = self
                .order
                .iter()
                .map(|o| match o.direction {
                    Direction::Asc => format!("{}.asc", o.column),
                    Direction::Desc => format!("{}.desc", o.column),
                })
                .collect::<Vec<_>>()
                .join(",");
            params.push(("order".to_string(), order));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        params
    }

    /// Whether a row satisfies every filter.
    pub fn matches(&self, row: &Value) -> bool {
        self.filters
            .iter()
            .all(|f| row.get(&f.column).map(|v| loosely_equal(v, &f.value)).unwrap_or(false))
    }

    /// Evaluate the query over in-memory rows: filter, stable sort, limit.
    pub fn apply(&self, rows: &[Value]) -> Vec<Value> {
        let mut selected: Vec<Value> = rows.iter().filter(|r| self.matches(r)).cloned().collect();
        if !self.order.is_empty() {
            selected.sort_by(|a, b| {
                for order in &self.order {
                    let ord = compare_values(a.get(&order.column), b.get(&order.column));
                    let ord = match order.direction {
                        Direction::Asc => ord,
                        Direction::Desc => ord.reverse(),
                    };
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                Ordering::Equal
            });
        }
        if let Some(limit) = self.limit {
            selected.truncate(limit);
        }
        selected
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

// The data API compares on text, so `"5"` and `5` name the same key.
fn loosely_equal(a: &Value, b: &Value) -> bool {
    a == b || render_value(a) == render_value(b)
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        // Nulls sort last, as the data API does for ascending order.
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        (None | Some(Value::Null), _) => Ordering::Greater,
        (_, None | Some(Value::Null)) => Ordering::Less,
        _ => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_params_rendering() {
        let query = Query::from("cursos")
            .select("id,nombre")
            .eq("activo", true)
            .eq("nivel_id", 3)
            .order_asc("orden_curso")
            .limit(10);

        assert_eq!(
            query.to_params(),
            vec![
                ("select".to_string(), "id,nombre".to_string()),
                ("activo".to_string(), "eq.true".to_string()),
                ("nivel_id".to_string(), "eq.3".to_string()),
                ("order".to_string(), "orden_curso.asc".to_string()),
                ("limit".to_string(), "10".to_string()),
            ]
        );
    }

    #[test]
    fn test_string_values_are_not_quoted() {
        let query = Query::from("instituciones").eq("codigo_acceso", "ABC-123");
        assert_eq!(query.to_params()[1].1, "eq.ABC-123");
    }

    #[test]
    fn test_apply_filters_sorts_and_limits() {
        let rows = vec![
            json!({"id": 1, "orden": 3, "activo": true}),
            json!({"id": 2, "orden": 1, "activo": true}),
            json!({"id": 3, "orden": 2, "activo": false}),
            json!({"id": 4, "orden": 2, "activo": true}),
        ];
        let result = Query::from("t").eq("activo", true).order_asc("orden").apply(&rows);
        let ids: Vec<i64> = result.iter().map(|r| r["id"].as_i64().unwrap()).collect();
        assert_eq!(ids, vec![2, 4, 1]);

        let limited = Query::from("t").order_desc("orden").limit(1).apply(&rows);
        assert_eq!(limited[0]["id"], 1);
    }

    #[test]
    fn test_matches_compares_as_text() {
        let row = json!({"curso_id": 7});
        assert!(Query::from("lecciones").eq("curso_id", "7").matches(&row));
        assert!(!Query::from("lecciones").eq("curso_id", 8).matches(&row));
        assert!(!Query::from("lecciones").eq("missing", 1).matches(&row));
    }
}
