use super::types::{FilterOrderInfo, SortDirection};

pub struct FilterOrder;

impl FilterOrder {
    /// Parse an `order_by` value such as `date` or `-value`.
    ///
    /// A leading `-` selects descending order. Names outside `columns` yield
    /// `None` so callers fall back to the natural row order.
    pub fn parse(order: &str, columns: &[&str]) -> Option<FilterOrderInfo> {
        let trimmed = order.trim();
        let (column, sort) = match trimmed.strip_prefix('-') {
            Some(rest) => (rest.trim_start_matches('-'), SortDirection::Desc),
            None => (trimmed, SortDirection::Asc),
        };

        if !columns.contains(&column) {
            tracing::debug!("Ignoring unknown sort field: {}", column);
            return None;
        }

        Some(FilterOrderInfo { column: column.to_string(), sort })
    }

    pub fn generate(info: Option<&FilterOrderInfo>) -> String {
        match info {
            Some(i) => format!("ORDER BY \"{}\" {}", i.column, i.sort.to_sql()),
            None => String::new(),
        }
    }
}
