use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::types::{FilterData, FilterOrderInfo, FilterWhereInfo, SqlResult};

/// Single-table SELECT generator.
///
/// `columns` is the whitelist of names that may appear in predicates and in
/// the ORDER BY clause; everything interpolated into SQL comes from it or from
/// the validated table name, values are always bound.
pub struct Filter {
    table_name: String,
    columns: &'static [&'static str],
    where_data: Vec<FilterWhereInfo>,
    order_data: Option<FilterOrderInfo>,
    limit: Option<i64>,
    offset: Option<i64>,
}

impl Filter {
    pub fn new(table_name: impl Into<String>, columns: &'static [&'static str]) -> Result<Self, FilterError> {
        let table_name = table_name.into();
        Self::validate_table_name(&table_name)?;
        Ok(Self {
            table_name,
            columns,
            where_data: vec![],
            order_data: None,
            limit: None,
            offset: None,
        })
    }

    pub fn assign(&mut self, data: FilterData) -> Result<&mut Self, FilterError> {
        self.where_data = data.where_clause;
        if let Some(order) = data.order {
            self.order(&order);
        }
        if let Some(limit) = data.limit {
            self.limit(limit, data.offset)?;
        }
        Ok(self)
    }

    pub fn order(&mut self, order_spec: &str) -> &mut Self {
        self.order_data = FilterOrder::parse(order_spec, self.columns);
        self
    }

    pub fn limit(&mut self, limit: i64, offset: Option<i64>) -> Result<&mut Self, FilterError> {
        if limit < 0 {
            return Err(FilterError::InvalidLimit("Limit must be non-negative".to_string()));
        }
        if let Some(off) = offset {
            if off < 0 {
                return Err(FilterError::InvalidOffset("Offset must be non-negative".to_string()));
            }
        }
        self.limit = Some(limit);
        self.offset = offset;
        Ok(self)
    }

    pub fn to_sql(&self) -> Result<SqlResult, FilterError> {
        let where_result = self.to_where_sql()?;
        let order_clause = FilterOrder::generate(self.order_data.as_ref());
        let limit_clause = self.build_limit_clause();

        let query = [
            "SELECT *".to_string(),
            format!("FROM \"{}\"", self.table_name),
            if where_result.query.is_empty() { String::new() } else { format!("WHERE {}", where_result.query) },
            order_clause,
            limit_clause,
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        Ok(SqlResult { query, params: where_result.params })
    }

    pub fn to_where_sql(&self) -> Result<SqlResult, FilterError> {
        let (query, params) = FilterWhere::generate(&self.where_data, self.columns)?;
        Ok(SqlResult { query, params })
    }

    pub fn to_count_sql(&self) -> Result<SqlResult, FilterError> {
        let where_result = self.to_where_sql()?;
        let query = if where_result.query.is_empty() {
            format!("SELECT COUNT(*) as count FROM \"{}\"", self.table_name)
        } else {
            format!("SELECT COUNT(*) as count FROM \"{}\" WHERE {}", self.table_name, where_result.query)
        };
        Ok(SqlResult { query, params: where_result.params })
    }

    fn validate_table_name(name: &str) -> Result<(), FilterError> {
        let mut chars = name.chars();
        let valid_start = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_');
        if !valid_start || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(FilterError::InvalidTableName(format!("Invalid table name format: {}", name)));
        }
        Ok(())
    }

    fn build_limit_clause(&self) -> String {
        match (self.limit, self.offset) {
            (Some(l), Some(o)) => format!("LIMIT {} OFFSET {}", l, o),
            (Some(l), None) => format!("LIMIT {}", l),
            // SQLite only accepts OFFSET after a LIMIT; -1 means unbounded
            (None, Some(o)) => format!("LIMIT -1 OFFSET {}", o),
            (None, None) => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLUMNS: &[&str] = &["id", "country", "sector", "date", "value"];

    #[test]
    fn builds_full_select() {
        let mut filter = Filter::new("co2_emissions_by_sector", COLUMNS).unwrap();
        filter
            .assign(
                FilterData::new()
                    .where_eq("country", Some("France"))
                    .where_eq("sector", Some("Power"))
                    .order_by(Some("-value".to_string()))
                    .paginate(20, 10),
            )
            .unwrap();

        let sql = filter.to_sql().unwrap();
        assert_eq!(
            sql.query,
            "SELECT * FROM \"co2_emissions_by_sector\" WHERE \"country\" = ? AND \"sector\" = ? ORDER BY \"value\" DESC LIMIT 10 OFFSET 20"
        );
        assert_eq!(sql.params.len(), 2);
    }

    #[test]
    fn unknown_order_is_dropped() {
        let mut filter = Filter::new("sources", COLUMNS).unwrap();
        filter.assign(FilterData::new().order_by(Some("bogus".to_string()))).unwrap();
        assert_eq!(filter.to_sql().unwrap().query, "SELECT * FROM \"sources\"");
    }

    #[test]
    fn count_sql_ignores_window() {
        let mut filter = Filter::new("sources", COLUMNS).unwrap();
        filter.assign(FilterData::new().where_eq("country", Some("Chile")).paginate(5, 5)).unwrap();
        assert_eq!(
            filter.to_count_sql().unwrap().query,
            "SELECT COUNT(*) as count FROM \"sources\" WHERE \"country\" = ?"
        );
    }

    #[test]
    fn rejects_bad_table_and_window() {
        assert!(Filter::new("users; --", COLUMNS).is_err());
        assert!(Filter::new("", COLUMNS).is_err());

        let mut filter = Filter::new("sources", COLUMNS).unwrap();
        assert!(filter.limit(-1, None).is_err());
        assert!(filter.limit(10, Some(-3)).is_err());
    }
}
