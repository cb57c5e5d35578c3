use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterOp {
    Eq,
    Gte,
    Lte,
    /// Case-insensitive substring match
    Contains,
}

/// Predicates, sort and window for one listing query.
///
/// The `where_*` helpers take an `Option` so optional query parameters can be
/// chained without branching; `None` adds no predicate.
#[derive(Debug, Clone, Default)]
pub struct FilterData {
    pub where_clause: Vec<FilterWhereInfo>,
    pub order: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl FilterData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn where_eq<V: Into<Value>>(self, column: &str, value: Option<V>) -> Self {
        self.push(column, FilterOp::Eq, value)
    }

    pub fn where_gte<V: Into<Value>>(self, column: &str, value: Option<V>) -> Self {
        self.push(column, FilterOp::Gte, value)
    }

    pub fn where_lte<V: Into<Value>>(self, column: &str, value: Option<V>) -> Self {
        self.push(column, FilterOp::Lte, value)
    }

    pub fn where_contains<V: Into<Value>>(self, column: &str, value: Option<V>) -> Self {
        self.push(column, FilterOp::Contains, value)
    }

    pub fn order_by(mut self, order: Option<String>) -> Self {
        self.order = order.filter(|o| !o.trim().is_empty());
        self
    }

    pub fn paginate(mut self, offset: i64, limit: i64) -> Self {
        self.offset = Some(offset);
        self.limit = Some(limit);
        self
    }

    fn push<V: Into<Value>>(mut self, column: &str, operator: FilterOp, value: Option<V>) -> Self {
        if let Some(v) = value {
            self.where_clause.push(FilterWhereInfo {
                column: column.to_string(),
                operator,
                data: v.into(),
            });
        }
        self
    }
}

#[derive(Debug, Clone)]
pub struct FilterWhereInfo {
    pub column: String,
    pub operator: FilterOp,
    pub data: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterOrderInfo {
    pub column: String,
    pub sort: SortDirection,
}

#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<Value>,
}
