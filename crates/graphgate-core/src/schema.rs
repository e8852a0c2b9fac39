//! # Schema Introspection
//!
//! Builds a description of the node and relationship tables from the
//! engine's catalog procedures:
//!
//! 1. `CALL show_tables()` lists every table and its kind
//! 2. `CALL table_info('<table>')` lists a table's properties
//! 3. `CALL show_connection('<table>')` lists a rel table's FROM/TO pairs
//!
//! All calls run on the single connection passed in by the caller.

use crate::GatewayError;
use crate::database::Connection;
use crate::engine::{Params, Record};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const SHOW_TABLES_QUERY: &str = "CALL show_tables() RETURN *;";

const TABLE_KIND_NODE: &str = "NODE";
const TABLE_KIND_REL: &str = "REL";

// =============================================================================
// TYPES
// =============================================================================

/// The whole graph schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    pub node_tables: Vec<NodeTable>,
    pub rel_tables: Vec<RelTable>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeTable {
    pub name: String,
    pub comment: String,
    pub primary_key: Option<String>,
    pub properties: Vec<Property>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelTable {
    pub name: String,
    pub comment: String,
    pub properties: Vec<Property>,
    pub connectivity: Vec<Connectivity>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
    pub is_primary_key: bool,
}

/// One FROM/TO pair of a relationship table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connectivity {
    pub src: String,
    pub dst: String,
}

// =============================================================================
// QUERIES
// =============================================================================

/// Quote a table name for use inside a single-quoted procedure argument.
fn quote(name: &str) -> String {
    name.replace('\\', "\\\\").replace('\'', "\\'")
}

pub fn table_info_query(table: &str) -> String {
    format!("CALL table_info('{}') RETURN *;", quote(table))
}

pub fn show_connection_query(table: &str) -> String {
    format!("CALL show_connection('{}') RETURN *;", quote(table))
}

fn text(record: &Record, column: &str) -> String {
    match record.get(column) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn flag(record: &Record, column: &str) -> bool {
    matches!(record.get(column), Some(Value::Bool(true)))
}

fn run(conn: &mut Connection<'_>, statement: &str) -> Result<Vec<Record>, GatewayError> {
    Ok(conn.query(statement, &Params::new())?.into_records())
}

fn properties(conn: &mut Connection<'_>, table: &str) -> Result<Vec<Property>, GatewayError> {
    Ok(run(conn, &table_info_query(table))?
        .iter()
        .map(|row| Property {
            name: text(row, "name"),
            data_type: text(row, "type"),
            is_primary_key: flag(row, "primary key"),
        })
        .collect())
}

// =============================================================================
// INTROSPECTION
// =============================================================================

/// Read the full schema over one connection.
///
/// Tables of kinds other than `NODE` and `REL` are skipped.
pub fn introspect(conn: &mut Connection<'_>) -> Result<Schema, GatewayError> {
    let mut schema = Schema::default();

    for table in run(conn, SHOW_TABLES_QUERY)? {
        let name = text(&table, "name");
        let comment = text(&table, "comment");

        match text(&table, "type").as_str() {
            TABLE_KIND_NODE => {
                let properties = properties(conn, &name)?;
                let primary_key = properties
                    .iter()
                    .find(|p| p.is_primary_key)
                    .map(|p| p.name.clone());
                schema.node_tables.push(NodeTable {
                    name,
                    comment,
                    primary_key,
                    properties,
                });
            }
            TABLE_KIND_REL => {
                let properties = properties(conn, &name)?;
                let connectivity = run(conn, &show_connection_query(&name))?
                    .iter()
                    .map(|row| Connectivity {
                        src: text(row, "source table name"),
                        dst: text(row, "destination table name"),
                    })
                    .collect();
                schema.rel_tables.push(RelTable {
                    name,
                    comment,
                    properties,
                    connectivity,
                });
            }
            other => {
                tracing::debug!("Skipping table '{}' of kind {}", name, other);
            }
        }
    }

    Ok(schema)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::database::Database;
    use crate::engine::{EngineConnection, GraphEngine, QueryRows};
    use crate::AccessMode;
    use serde_json::json;

    struct CatalogEngine;

    struct CatalogConnection;

    fn rows(columns: &[&str], rows: Vec<Vec<Value>>) -> QueryRows {
        QueryRows::new(columns.iter().map(|c| c.to_string()).collect(), rows)
    }

    impl EngineConnection for CatalogConnection {
        fn query(&mut self, statement: &str, _: &Params) -> Result<QueryRows, GatewayError> {
            let result = match statement {
                SHOW_TABLES_QUERY => rows(
                    &["id", "name", "type", "database name", "comment"],
                    vec![
                        vec![json!(0), json!("User"), json!("NODE"), json!("local"), json!("")],
                        vec![json!(1), json!("Follows"), json!("REL"), json!("local"), json!("who follows whom")],
                        vec![json!(2), json!("Ext"), json!("FOREIGN"), json!("other"), json!("")],
                    ],
                ),
                "CALL table_info('User') RETURN *;" => rows(
                    &["property id", "name", "type", "default expression", "primary key"],
                    vec![
                        vec![json!(0), json!("name"), json!("STRING"), json!("NULL"), json!(true)],
                        vec![json!(1), json!("age"), json!("INT64"), json!("NULL"), json!(false)],
                    ],
                ),
                "CALL table_info('Follows') RETURN *;" => rows(
                    &["property id", "name", "type", "default expression", "storage_direction"],
                    vec![vec![json!(1), json!("since"), json!("INT64"), json!("NULL"), json!("both")]],
                ),
                "CALL show_connection('Follows') RETURN *;" => rows(
                    &["source table name", "destination table name"],
                    vec![vec![json!("User"), json!("User")]],
                ),
                other => return Err(GatewayError::Query(format!("unexpected {}", other))),
            };
            Ok(result)
        }
    }

    impl GraphEngine for CatalogEngine {
        fn connect(&self) -> Result<Box<dyn EngineConnection + '_>, GatewayError> {
            Ok(Box::new(CatalogConnection))
        }

        fn access_mode(&self) -> AccessMode {
            AccessMode::ReadWrite
        }
    }

    #[test]
    fn test_introspect_builds_node_and_rel_tables() {
        let db = Database::new(CatalogEngine);
        let schema = db.with_connection(introspect).unwrap();

        assert_eq!(schema.node_tables.len(), 1);
        let user = &schema.node_tables[0];
        assert_eq!(user.name, "User");
        assert_eq!(user.primary_key.as_deref(), Some("name"));
        assert_eq!(user.properties.len(), 2);
        assert!(!user.properties[1].is_primary_key);

        assert_eq!(schema.rel_tables.len(), 1);
        let follows = &schema.rel_tables[0];
        assert_eq!(follows.comment, "who follows whom");
        assert_eq!(follows.properties[0].data_type, "INT64");
        assert_eq!(
            follows.connectivity,
            vec![Connectivity {
                src: "User".into(),
                dst: "User".into()
            }]
        );
    }

    #[test]
    fn test_table_names_are_quoted() {
        assert_eq!(
            table_info_query("it's"),
            "CALL table_info('it\\'s') RETURN *;"
        );
    }

    #[test]
    fn test_schema_json_shape() {
        let schema = Schema {
            node_tables: vec![NodeTable {
                name: "User".into(),
                comment: String::new(),
                primary_key: Some("name".into()),
                properties: vec![Property {
                    name: "name".into(),
                    data_type: "STRING".into(),
                    is_primary_key: true,
                }],
            }],
            rel_tables: vec![],
        };
        let json = serde_json::to_value(&schema).unwrap();
        assert_eq!(json["nodeTables"][0]["primaryKey"], "name");
        assert_eq!(json["nodeTables"][0]["properties"][0]["type"], "STRING");
        assert_eq!(json["nodeTables"][0]["properties"][0]["isPrimaryKey"], true);
        assert!(json["relTables"].as_array().unwrap().is_empty());
    }
}
