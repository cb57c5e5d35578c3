use serde_json::Value;

use super::error::FilterError;
use super::types::{FilterOp, FilterWhereInfo};

pub struct FilterWhere {
    param_values: Vec<Value>,
}

impl FilterWhere {
    /// Render conditions as an AND-joined predicate with positional `?`
    /// parameters. An empty condition list renders as an empty string.
    pub fn generate(conditions: &[FilterWhereInfo], columns: &[&str]) -> Result<(String, Vec<Value>), FilterError> {
        let mut filter_where = Self { param_values: vec![] };
        let mut sql_conditions = Vec::with_capacity(conditions.len());
        for condition in conditions {
            if !columns.contains(&condition.column.as_str()) {
                return Err(FilterError::InvalidColumn(condition.column.clone()));
            }
            sql_conditions.push(filter_where.build_sql_condition(condition)?);
        }
        Ok((sql_conditions.join(" AND "), filter_where.param_values))
    }

    fn build_sql_condition(&mut self, condition: &FilterWhereInfo) -> Result<String, FilterError> {
        let quoted_column = format!("\"{}\"", condition.column);
        match condition.operator {
            FilterOp::Eq => {
                if condition.data.is_null() {
                    Ok(format!("{} IS NULL", quoted_column))
                } else {
                    Ok(format!("{} = {}", quoted_column, self.param(condition.data.clone())))
                }
            }
            FilterOp::Gte => Ok(format!("{} >= {}", quoted_column, self.param(condition.data.clone()))),
            FilterOp::Lte => Ok(format!("{} <= {}", quoted_column, self.param(condition.data.clone()))),
            FilterOp::Contains => {
                let needle = condition.data.as_str().ok_or_else(|| {
                    FilterError::InvalidOperatorData(format!("substring match on {} requires a string", condition.column))
                })?;
                let pattern = Value::String(format!("%{}%", needle.to_lowercase()));
                Ok(format!("LOWER({}) LIKE {}", quoted_column, self.param(pattern)))
            }
        }
    }

    fn param(&mut self, value: Value) -> &'static str {
        self.param_values.push(value);
        "?"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterData;
    use serde_json::json;

    const COLUMNS: &[&str] = &["city", "country", "date"];

    #[test]
    fn joins_conditions_with_and() {
        let data = FilterData::new()
            .where_eq("country", Some("France"))
            .where_gte("date", Some("2023-01-01"))
            .where_lte("date", Some("2023-12-31"));
        let (sql, params) = FilterWhere::generate(&data.where_clause, COLUMNS).unwrap();
        assert_eq!(sql, "\"country\" = ? AND \"date\" >= ? AND \"date\" <= ?");
        assert_eq!(params, vec![json!("France"), json!("2023-01-01"), json!("2023-12-31")]);
    }

    #[test]
    fn contains_lowercases_and_wraps_pattern() {
        let data = FilterData::new().where_contains("city", Some("PAR"));
        let (sql, params) = FilterWhere::generate(&data.where_clause, COLUMNS).unwrap();
        assert_eq!(sql, "LOWER(\"city\") LIKE ?");
        assert_eq!(params, vec![json!("%par%")]);
    }

    #[test]
    fn none_values_add_no_predicate() {
        let data = FilterData::new().where_eq::<String>("country", None);
        let (sql, params) = FilterWhere::generate(&data.where_clause, COLUMNS).unwrap();
        assert!(sql.is_empty());
        assert!(params.is_empty());
    }

    #[test]
    fn rejects_unknown_columns() {
        let data = FilterData::new().where_eq("password", Some("x"));
        assert!(matches!(
            FilterWhere::generate(&data.where_clause, COLUMNS),
            Err(FilterError::InvalidColumn(_))
        ));
    }
}
