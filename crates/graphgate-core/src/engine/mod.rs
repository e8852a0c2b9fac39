//! # Engine Seam
//!
//! The gateway never talks to Kùzu directly. Everything above this module
//! sees only two object-safe traits:
//!
//! - [`GraphEngine`]: an opened database that hands out connections
//! - [`EngineConnection`]: a single session that can run one statement at a time
//!
//! Engine calls are blocking. Callers on an async runtime are expected to
//! move them onto a blocking thread.

#[cfg(feature = "kuzu")]
pub mod kuzu;

use crate::{AccessMode, GatewayError};
use serde_json::{Map, Value};

/// Named parameters bound to a statement.
pub type Params = Map<String, Value>;

/// One result row keyed by column name, in column order.
pub type Record = Map<String, Value>;

// =============================================================================
// QUERY ROWS
// =============================================================================

/// A fully materialized result set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryRows {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl QueryRows {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First column of the first row, if any.
    pub fn first_value(&self) -> Option<&Value> {
        self.rows.first().and_then(|row| row.first())
    }

    /// Convert every row to a [`Record`].
    ///
    /// Keys follow the column order. A row shorter than the header gets
    /// `null` for the missing columns; extra values are dropped.
    pub fn into_records(self) -> Vec<Record> {
        let columns = self.columns;
        self.rows
            .into_iter()
            .map(|row| {
                let mut values = row.into_iter();
                columns
                    .iter()
                    .map(|column| (column.clone(), values.next().unwrap_or(Value::Null)))
                    .collect()
            })
            .collect()
    }
}

// =============================================================================
// TRAITS
// =============================================================================

/// A single session with the engine.
pub trait EngineConnection {
    /// Run one statement with the given parameters and collect every row.
    fn query(&mut self, statement: &str, params: &Params) -> Result<QueryRows, GatewayError>;
}

/// An opened embedded database.
pub trait GraphEngine: Send + Sync {
    /// Open a new session.
    fn connect(&self) -> Result<Box<dyn EngineConnection + '_>, GatewayError>;

    /// Hand a session back. The default simply closes it.
    fn disconnect(&self, connection: Box<dyn EngineConnection + '_>) {
        drop(connection);
    }

    /// Mode the engine was opened in.
    fn access_mode(&self) -> AccessMode;

    /// On-disk storage format version, when the engine reports one.
    fn storage_version(&self) -> Option<u64> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_records_preserve_column_order() {
        let rows = QueryRows::new(
            vec!["z".into(), "a".into(), "m".into()],
            vec![vec![json!(1), json!(2), json!(3)]],
        );
        let records = rows.into_records();
        let keys: Vec<&String> = records[0].keys().collect();
        assert_eq!(keys, ["z", "a", "m"]);
    }

    #[test]
    fn test_short_rows_are_padded_with_null() {
        let rows = QueryRows::new(vec!["a".into(), "b".into()], vec![vec![json!("x")]]);
        let records = rows.into_records();
        assert_eq!(records[0].get("b"), Some(&Value::Null));
    }

    #[test]
    fn test_first_value() {
        let rows = QueryRows::new(vec!["version".into()], vec![vec![json!("0.11.2")]]);
        assert_eq!(rows.first_value(), Some(&json!("0.11.2")));
        assert_eq!(QueryRows::default().first_value(), None);
    }
}
