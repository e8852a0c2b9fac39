//! # Kùzu Engine
//!
//! [`GraphEngine`] implementation backed by the embedded Kùzu database.
//! One `kuzu::Connection` is opened per acquisition and closed on release.

use super::{EngineConnection, GraphEngine, Params, QueryRows};
use crate::{AccessMode, EngineConfig, GatewayError};
use kuzu::{Connection, Database, LogicalType, NodeVal, RelVal, SystemConfig, Value};
use serde_json::{Map, Number, Value as Json};

const IN_MEMORY_PATH: &str = ":memory:";

// =============================================================================
// ENGINE
// =============================================================================

pub struct KuzuEngine {
    database: Database,
    access_mode: AccessMode,
}

impl KuzuEngine {
    /// Open (or create) the database described by `config`.
    pub fn open(config: &EngineConfig) -> Result<Self, GatewayError> {
        let mut system = SystemConfig::default().read_only(config.access_mode.is_read_only());
        if let Some(size) = config.buffer_pool_size {
            system = system.buffer_pool_size(size);
        }

        let database = if config.in_memory {
            tracing::info!("Opening in-memory Kùzu database");
            Database::new(IN_MEMORY_PATH, system)
        } else {
            tracing::info!("Opening Kùzu database at {}", config.path.display());
            Database::new(&config.path, system)
        }
        .map_err(|e| GatewayError::Connection(format!("Failed to open database: {}", e)))?;

        Ok(Self {
            database,
            access_mode: config.access_mode,
        })
    }
}

impl GraphEngine for KuzuEngine {
    fn connect(&self) -> Result<Box<dyn EngineConnection + '_>, GatewayError> {
        let connection =
            Connection::new(&self.database).map_err(|e| GatewayError::Connection(e.to_string()))?;
        Ok(Box::new(KuzuConnection { connection }))
    }

    fn access_mode(&self) -> AccessMode {
        self.access_mode
    }

    fn storage_version(&self) -> Option<u64> {
        Some(kuzu::get_storage_version())
    }
}

// =============================================================================
// CONNECTION
// =============================================================================

struct KuzuConnection<'db> {
    connection: Connection<'db>,
}

impl EngineConnection for KuzuConnection<'_> {
    fn query(&mut self, statement: &str, params: &Params) -> Result<QueryRows, GatewayError> {
        let result = if params.is_empty() {
            self.connection
                .query(statement)
                .map_err(|e| GatewayError::Query(e.to_string()))?
        } else {
            let bound = params
                .iter()
                .map(|(name, value)| Ok((name.as_str(), to_kuzu(name, value)?)))
                .collect::<Result<Vec<_>, GatewayError>>()?;
            let mut prepared = self
                .connection
                .prepare(statement)
                .map_err(|e| GatewayError::Query(e.to_string()))?;
            self.connection
                .execute(&mut prepared, bound)
                .map_err(|e| GatewayError::Query(e.to_string()))?
        };

        let columns = result.get_column_names();
        let rows = result
            .map(|row| row.iter().map(to_json).collect())
            .collect();
        Ok(QueryRows::new(columns, rows))
    }
}

// =============================================================================
// VALUE CONVERSION
// =============================================================================

/// JSON parameter → engine value. Only scalars can be bound.
fn to_kuzu(name: &str, value: &Json) -> Result<Value, GatewayError> {
    let unsupported = |kind: &str| GatewayError::InvalidParameter {
        name: name.to_string(),
        reason: format!("{} values cannot be bound", kind),
    };

    match value {
        Json::Null => Ok(Value::Null(LogicalType::Any)),
        Json::Bool(b) => Ok(Value::Bool(*b)),
        Json::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Int64(i))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::UInt64(u))
            } else {
                n.as_f64()
                    .map(Value::Double)
                    .ok_or_else(|| unsupported("non-finite number"))
            }
        }
        Json::String(s) => Ok(Value::String(s.clone())),
        Json::Array(_) => Err(unsupported("array")),
        Json::Object(_) => Err(unsupported("object")),
    }
}

fn float(value: f64) -> Json {
    Number::from_f64(value).map_or(Json::Null, Json::Number)
}

fn properties(target: &mut Map<String, Json>, properties: &[(String, Value)]) {
    for (key, value) in properties {
        target.insert(key.clone(), to_json(value));
    }
}

fn internal_id(offset: u64, table: u64) -> Json {
    serde_json::json!({ "offset": offset, "table": table })
}

fn node_to_json(node: &NodeVal) -> Json {
    let id = node.get_node_id();
    let mut object = Map::new();
    object.insert("_id".to_string(), internal_id(id.offset, id.table_id));
    object.insert("_label".to_string(), Json::String(node.get_label_name().clone()));
    properties(&mut object, node.get_properties());
    Json::Object(object)
}

fn rel_to_json(rel: &RelVal) -> Json {
    let src = rel.get_src_node();
    let dst = rel.get_dst_node();
    let mut object = Map::new();
    object.insert("_src".to_string(), internal_id(src.offset, src.table_id));
    object.insert("_dst".to_string(), internal_id(dst.offset, dst.table_id));
    object.insert("_label".to_string(), Json::String(rel.get_label_name().clone()));
    properties(&mut object, rel.get_properties());
    Json::Object(object)
}

/// Engine value → JSON. Types without a natural JSON form use their
/// display string.
fn to_json(value: &Value) -> Json {
    match value {
        Value::Null(_) => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Int8(v) => Json::from(*v),
        Value::Int16(v) => Json::from(*v),
        Value::Int32(v) => Json::from(*v),
        Value::Int64(v) => Json::from(*v),
        Value::UInt8(v) => Json::from(*v),
        Value::UInt16(v) => Json::from(*v),
        Value::UInt32(v) => Json::from(*v),
        Value::UInt64(v) => Json::from(*v),
        Value::Float(v) => float(f64::from(*v)),
        Value::Double(v) => float(*v),
        Value::String(s) => Json::String(s.clone()),
        Value::List(_, items) | Value::Array(_, items) => {
            Json::Array(items.iter().map(to_json).collect())
        }
        Value::Struct(fields) => {
            let mut object = Map::new();
            properties(&mut object, fields);
            Json::Object(object)
        }
        Value::Map(_, entries) => Json::Array(
            entries
                .iter()
                .map(|(k, v)| serde_json::json!({ "key": to_json(k), "value": to_json(v) }))
                .collect(),
        ),
        Value::Node(node) => node_to_json(node),
        Value::Rel(rel) => rel_to_json(rel),
        Value::RecursiveRel { nodes, rels } => serde_json::json!({
            "_nodes": nodes.iter().map(node_to_json).collect::<Vec<_>>(),
            "_rels": rels.iter().map(rel_to_json).collect::<Vec<_>>(),
        }),
        Value::InternalID(id) => internal_id(id.offset, id.table_id),
        other => Json::String(other.to_string()),
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(all(test, feature = "kuzu"))]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::{KuzuEngine, to_json, to_kuzu};
    use crate::database::Database as Gateway;
    use crate::{EngineConfig, GatewayError, Params, QueryRows, schema};
    use kuzu::{LogicalType, Value};
    use serde_json::json;

    fn memory_database() -> Gateway {
        let config = EngineConfig {
            in_memory: true,
            ..EngineConfig::default()
        };
        Gateway::new(KuzuEngine::open(&config).unwrap())
    }

    fn run(db: &Gateway, statement: &str, params: Params) -> Result<QueryRows, GatewayError> {
        db.with_connection(|conn| conn.query(statement, &params))
    }

    fn users(db: &Gateway) {
        for statement in [
            "CREATE NODE TABLE User(name STRING, age INT64, PRIMARY KEY(name));",
            "CREATE REL TABLE Follows(FROM User TO User, since INT64);",
            "CREATE (:User {name: 'Adam', age: 30});",
            "CREATE (:User {name: 'Karissa', age: 40});",
            "MATCH (a:User {name: 'Adam'}), (b:User {name: 'Karissa'}) \
             CREATE (a)-[:Follows {since: 2020}]->(b);",
        ] {
            run(db, statement, Params::new()).unwrap();
        }
    }

    #[test]
    fn test_scalar_parameters_bind() {
        assert!(matches!(to_kuzu("p", &json!(null)).unwrap(), Value::Null(_)));
        assert_eq!(to_kuzu("p", &json!(true)).unwrap(), Value::Bool(true));
        assert_eq!(to_kuzu("p", &json!(-3)).unwrap(), Value::Int64(-3));
        assert_eq!(
            to_kuzu("p", &json!(u64::MAX)).unwrap(),
            Value::UInt64(u64::MAX)
        );
        assert_eq!(to_kuzu("p", &json!(1.5)).unwrap(), Value::Double(1.5));
        assert_eq!(
            to_kuzu("p", &json!("Adam")).unwrap(),
            Value::String("Adam".to_string())
        );
    }

    #[test]
    fn test_composite_parameters_are_rejected() {
        for value in [json!([1, 2]), json!({ "a": 1 })] {
            match to_kuzu("p", &value) {
                Err(GatewayError::InvalidParameter { name, .. }) => assert_eq!(name, "p"),
                other => panic!("expected InvalidParameter, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_values_to_json() {
        assert_eq!(to_json(&Value::Null(LogicalType::Int64)), json!(null));
        assert_eq!(to_json(&Value::Int32(7)), json!(7));
        assert_eq!(to_json(&Value::Double(0.25)), json!(0.25));
        assert_eq!(to_json(&Value::Double(f64::NAN)), json!(null));
        assert_eq!(
            to_json(&Value::List(
                LogicalType::Int64,
                vec![Value::Int64(1), Value::Int64(2)]
            )),
            json!([1, 2])
        );
        assert_eq!(
            to_json(&Value::Struct(vec![
                ("name".to_string(), Value::String("Adam".to_string())),
                ("age".to_string(), Value::Int64(30)),
            ])),
            json!({ "name": "Adam", "age": 30 })
        );
    }

    #[test]
    fn test_return_one() {
        let db = memory_database();

        let rows = run(&db, "RETURN 1;", Params::new()).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows.columns.len(), 1);
        assert_eq!(rows.first_value(), Some(&json!(1)));
    }

    #[test]
    fn test_db_version_is_reported() {
        let db = memory_database();

        let version = db.db_version().unwrap();

        assert!(!version.version.is_empty());
        assert_eq!(version.storage_version, Some(kuzu::get_storage_version()));
    }

    #[test]
    fn test_syntax_error_is_a_query_error() {
        let db = memory_database();

        let err = run(&db, "RETURN;;; nonsense", Params::new()).unwrap_err();

        assert!(matches!(err, GatewayError::Query(_)));
        assert!(err.is_client_error());
    }

    #[test]
    fn test_parameterized_query() {
        let db = memory_database();
        users(&db);

        let mut params = Params::new();
        params.insert("min".to_string(), json!(35));
        let records = run(
            &db,
            "MATCH (u:User) WHERE u.age > $min RETURN u.name AS name;",
            params,
        )
        .unwrap()
        .into_records();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["name"], "Karissa");
    }

    #[test]
    fn test_array_parameter_never_reaches_the_engine() {
        let db = memory_database();

        let mut params = Params::new();
        params.insert("xs".to_string(), json!([1, 2]));
        let err = run(&db, "RETURN $xs;", params).unwrap_err();

        assert!(matches!(err, GatewayError::InvalidParameter { .. }));
    }

    #[test]
    fn test_graph_values_to_json() {
        let db = memory_database();
        users(&db);

        let node = run(
            &db,
            "MATCH (u:User {name: 'Adam'}) RETURN u;",
            Params::new(),
        )
        .unwrap()
        .into_records();
        let node = &node[0]["u"];
        assert_eq!(node["_label"], "User");
        assert_eq!(node["name"], "Adam");
        assert_eq!(node["age"], 30);
        assert!(node["_id"]["offset"].is_u64());
        assert!(node["_id"]["table"].is_u64());

        let rel = run(&db, "MATCH ()-[f:Follows]->() RETURN f;", Params::new())
            .unwrap()
            .into_records();
        let rel = &rel[0]["f"];
        assert_eq!(rel["_label"], "Follows");
        assert_eq!(rel["since"], 2020);
        assert_eq!(rel["_src"]["table"], node["_id"]["table"]);
    }

    #[test]
    fn test_schema_introspection() {
        let db = memory_database();
        users(&db);

        let schema = db.with_connection(schema::introspect).unwrap();

        assert_eq!(schema.node_tables.len(), 1);
        let user = &schema.node_tables[0];
        assert_eq!(user.name, "User");
        assert_eq!(user.primary_key.as_deref(), Some("name"));
        assert!(
            user.properties
                .iter()
                .any(|p| p.name == "age" && p.data_type == "INT64")
        );

        assert_eq!(schema.rel_tables.len(), 1);
        let follows = &schema.rel_tables[0];
        assert_eq!(follows.name, "Follows");
        assert_eq!(follows.connectivity.len(), 1);
        assert_eq!(follows.connectivity[0].src, "User");
        assert_eq!(follows.connectivity[0].dst, "User");
    }
}
