//! Row filters for the BaaS REST query interface.
//!
//! Filters render as `column=operator.value` query pairs.

use std::fmt::Display;

/// Query builder for table reads and filtered writes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    select: Option<String>,
    filters: Vec<(String, String)>,
    order: Vec<String>,
    limit: Option<u64>,
    offset: Option<u64>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Columns to return (defaults to `*`)
    pub fn select(mut self, columns: &str) -> Self {
        self.select = Some(columns.to_string());
        self
    }

    fn filter(mut self, column: &str, op: &str, value: impl Display) -> Self {
        self.filters
            .push((column.to_string(), format!("{}.{}", op, value)));
        self
    }

    pub fn eq(self, column: &str, value: impl Display) -> Self {
        self.filter(column, "eq", value)
    }

    pub fn gte(self, column: &str, value: impl Display) -> Self {
        self.filter(column, "gte", value)
    }

    pub fn lte(self, column: &str, value: impl Display) -> Self {
        self.filter(column, "lte", value)
    }

    /// `column IN (values)`
    pub fn is_in<I, V>(self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Display,
    {
        let list = values
            .into_iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(",");
        self.filter(column, "in", format!("({})", list))
    }

    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        let direction = if ascending { "asc" } else { "desc" };
        self.order.push(format!("{}.{}", column, direction));
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Value of the first filter on `column`, e.g. `eq.42`
    pub fn filter_value(&self, column: &str) -> Option<&str> {
        self.filters
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_filters(&self) -> bool {
        !self.filters.is_empty()
    }

    /// Render as URL query pairs.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(self.filters.len() + 4);
        pairs.push((
            "select".to_string(),
            self.select.clone().unwrap_or_else(|| "*".to_string()),
        ));
        pairs.extend(self.filters.iter().cloned());
        if !self.order.is_empty() {
            pairs.push(("order".to_string(), self.order.join(",")));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(offset) = self.offset {
            pairs.push(("offset".to_string(), offset.to_string()));
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(k: &str, v: &str) -> (String, String) {
        (k.to_string(), v.to_string())
    }

    #[test]
    fn renders_filters_in_order() {
        let q = Query::new()
            .eq("store_id", "abc")
            .gte("date", "2024-01-01")
            .order("date", true)
            .order("name", false)
            .limit(10)
            .offset(20);

        assert_eq!(
            q.to_pairs(),
            vec![
                pair("select", "*"),
                pair("store_id", "eq.abc"),
                pair("date", "gte.2024-01-01"),
                pair("order", "date.asc,name.desc"),
                pair("limit", "10"),
                pair("offset", "20"),
            ]
        );
    }

    #[test]
    fn in_filter_joins_values() {
        let q = Query::new().select("id,name").is_in("id", [1, 2, 3]);
        assert_eq!(q.to_pairs()[0], pair("select", "id,name"));
        assert_eq!(q.filter_value("id"), Some("in.(1,2,3)"));
    }

    #[test]
    fn empty_query_selects_everything() {
        let q = Query::new();
        assert!(!q.has_filters());
        assert_eq!(q.to_pairs(), vec![pair("select", "*")]);
    }
}
