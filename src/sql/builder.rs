//! Builds parameterized SELECT, INSERT, UPDATE and CREATE TABLE statements from a registered model.
//!
//! Columns and parameters are always pushed together, so placeholder `n` binds `params[n - 1]`.

use crate::model::Model;
use serde_json::Value;
use std::collections::HashMap;

/// Quote identifier for SQLite (safe: only from registered metadata).
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

#[derive(Clone, Debug, PartialEq)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<Value>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: Value) {
        self.params.push(v);
    }
}

fn column_list(columns: &[&str]) -> String {
    columns.iter().map(|c| quoted(c)).collect::<Vec<_>>().join(", ")
}

/// SELECT list-visible columns, optionally filtered by `LIKE %q%` over every searchable column.
pub fn select_list(model: &Model, q: Option<&str>) -> QueryBuf {
    let mut buf = QueryBuf::new();
    let table = quoted(model.table_name());
    let id = quoted(model.identifier().column_name());
    let cols = column_list(&model.list_table_columns());

    let term = q.map(str::trim).filter(|s| !s.is_empty());
    let searchable = model.searchable_columns();
    let where_clause = match term {
        Some(term) if !searchable.is_empty() => {
            let pattern = Value::String(format!("%{}%", term));
            let parts: Vec<String> = searchable
                .iter()
                .map(|col| {
                    buf.push_param(pattern.clone());
                    format!("{} LIKE ?", quoted(col))
                })
                .collect();
            format!(" WHERE {}", parts.join(" OR "))
        }
        _ => String::new(),
    };

    buf.sql = format!("SELECT {} FROM {}{} ORDER BY {}", cols, table, where_clause, id);
    buf
}

/// SELECT every column of one row by identifier.
pub fn select_by_id(model: &Model, id: i64) -> QueryBuf {
    let mut buf = QueryBuf::new();
    buf.sql = format!(
        "SELECT {} FROM {} WHERE {} = ?",
        column_list(&model.table_columns()),
        quoted(model.table_name()),
        quoted(model.identifier().column_name())
    );
    buf.push_param(Value::Number(id.into()));
    buf
}

/// SELECT 1 for one row by identifier.
pub fn select_exists(model: &Model, id: i64) -> QueryBuf {
    let mut buf = QueryBuf::new();
    buf.sql = format!(
        "SELECT 1 FROM {} WHERE {} = ?",
        quoted(model.table_name()),
        quoted(model.identifier().column_name())
    );
    buf.push_param(Value::Number(id.into()));
    buf
}

/// Submitted (column, value) pairs in field declaration order, identifier excluded.
fn submitted_columns<'a>(model: &'a Model, data: &HashMap<String, Value>) -> Vec<(&'a str, Value)> {
    model
        .editable_fields()
        .iter()
        .filter_map(|f| data.get(f.name()).map(|v| (f.column_name(), v.clone())))
        .collect()
}

/// INSERT the submitted fields; omitted fields take the storage default.
pub fn insert(model: &Model, data: &HashMap<String, Value>) -> QueryBuf {
    let mut buf = QueryBuf::new();
    let table = quoted(model.table_name());
    let submitted = submitted_columns(model, data);
    if submitted.is_empty() {
        buf.sql = format!("INSERT INTO {} DEFAULT VALUES", table);
        return buf;
    }
    let mut cols = Vec::with_capacity(submitted.len());
    let mut placeholders = Vec::with_capacity(submitted.len());
    for (col, val) in submitted {
        cols.push(quoted(col));
        placeholders.push("?");
        buf.push_param(val);
    }
    buf.sql = format!(
        "INSERT INTO {}({}) VALUES({})",
        table,
        cols.join(", "),
        placeholders.join(", ")
    );
    buf
}

/// UPDATE the submitted fields of one row. None when nothing was submitted.
pub fn update(model: &Model, id: i64, data: &HashMap<String, Value>) -> Option<QueryBuf> {
    let submitted = submitted_columns(model, data);
    if submitted.is_empty() {
        return None;
    }
    let mut buf = QueryBuf::new();
    let mut sets = Vec::with_capacity(submitted.len());
    for (col, val) in submitted {
        sets.push(format!("{} = ?", quoted(col)));
        buf.push_param(val);
    }
    buf.push_param(Value::Number(id.into()));
    buf.sql = format!(
        "UPDATE {} SET {} WHERE {} = ?",
        quoted(model.table_name()),
        sets.join(", "),
        quoted(model.identifier().column_name())
    );
    Some(buf)
}

/// CREATE TABLE IF NOT EXISTS with the identifier as the integer primary key.
pub fn create_table(model: &Model) -> String {
    let mut defs = Vec::with_capacity(model.fields().len());
    defs.push(format!(
        "{} INTEGER PRIMARY KEY AUTOINCREMENT",
        quoted(model.identifier().column_name())
    ));
    for field in model.editable_fields() {
        let mut def = format!("{} {}", quoted(field.column_name()), field.sql_type());
        if !field.default_value().is_empty() {
            def.push_str(&format!(" DEFAULT '{}'", field.default_value().replace('\'', "''")));
        }
        if let Some(target) = field.foreign_key().and_then(|fk| fk.target()) {
            def.push_str(&format!(" REFERENCES {}", quoted(&target.table_name)));
        }
        defs.push(def);
    }
    format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        quoted(model.table_name()),
        defs.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AdminModel, FieldDescriptor};
    use crate::registry::{AdminBuilder, Registry};
    use serde_json::json;

    struct Person;
    impl AdminModel for Person {
        fn fields() -> Vec<FieldDescriptor> {
            vec![
                FieldDescriptor::of::<i64>("id"),
                FieldDescriptor::of::<String>("name").tag("search,list"),
                FieldDescriptor::of::<i32>("age").tag("list"),
                FieldDescriptor::of::<String>("email").tag("search"),
            ]
        }
    }

    struct Team;
    impl AdminModel for Team {
        fn fields() -> Vec<FieldDescriptor> {
            vec![
                FieldDescriptor::of::<i64>("id"),
                FieldDescriptor::of::<String>("name").tag("default=Unnamed"),
                FieldDescriptor::foreign_key::<Person>("lead"),
            ]
        }
    }

    fn registry() -> Registry {
        let mut builder = AdminBuilder::new();
        let g = builder.group("Main");
        builder.register::<Person>(g).unwrap();
        builder.register::<Team>(g).unwrap();
        builder.build().unwrap()
    }

    #[test]
    fn list_without_search() {
        let r = registry();
        let q = select_list(r.model("person").unwrap(), None);
        assert_eq!(q.sql, "SELECT \"id\", \"name\", \"age\" FROM \"Person\" ORDER BY \"id\"");
        assert!(q.params.is_empty());
        let blank = select_list(r.model("person").unwrap(), Some("  "));
        assert_eq!(blank, q);
    }

    #[test]
    fn search_references_only_searchable_columns() {
        let r = registry();
        let q = select_list(r.model("person").unwrap(), Some("bob"));
        assert_eq!(
            q.sql,
            "SELECT \"id\", \"name\", \"age\" FROM \"Person\" WHERE \"name\" LIKE ? OR \"email\" LIKE ? ORDER BY \"id\""
        );
        assert_eq!(q.params, vec![json!("%bob%"), json!("%bob%")]);
        assert!(!q.sql.contains("\"age\" LIKE"));
    }

    #[test]
    fn search_on_model_without_searchable_fields_is_unfiltered() {
        let r = registry();
        let q = select_list(r.model("team").unwrap(), Some("x"));
        assert!(!q.sql.contains("WHERE"));
    }

    #[test]
    fn select_by_id_binds_identifier() {
        let r = registry();
        let q = select_by_id(r.model("person").unwrap(), 7);
        assert_eq!(
            q.sql,
            "SELECT \"id\", \"name\", \"age\", \"email\" FROM \"Person\" WHERE \"id\" = ?"
        );
        assert_eq!(q.params, vec![json!(7)]);
    }

    #[test]
    fn exists_selects_by_identifier() {
        let r = registry();
        let q = select_exists(r.model("team").unwrap(), 4);
        assert_eq!(q.sql, "SELECT 1 FROM \"Team\" WHERE \"id\" = ?");
        assert_eq!(q.params, vec![json!(4)]);
    }

    #[test]
    fn insert_keeps_columns_and_params_aligned() {
        let r = registry();
        let data: HashMap<String, Value> = [
            ("email".to_string(), json!("ann@example.com")),
            ("name".to_string(), json!("Ann")),
            ("id".to_string(), json!(99)),
        ]
        .into_iter()
        .collect();
        let q = insert(r.model("person").unwrap(), &data);
        assert_eq!(q.sql, "INSERT INTO \"Person\"(\"name\", \"email\") VALUES(?, ?)");
        assert_eq!(q.params, vec![json!("Ann"), json!("ann@example.com")]);
    }

    #[test]
    fn insert_without_values_uses_defaults() {
        let r = registry();
        let q = insert(r.model("person").unwrap(), &HashMap::new());
        assert_eq!(q.sql, "INSERT INTO \"Person\" DEFAULT VALUES");
        assert!(q.params.is_empty());
    }

    #[test]
    fn update_binds_id_last() {
        let r = registry();
        let data: HashMap<String, Value> = [
            ("age".to_string(), json!(31)),
            ("name".to_string(), json!("Ann")),
        ]
        .into_iter()
        .collect();
        let q = update(r.model("person").unwrap(), 3, &data).unwrap();
        assert_eq!(q.sql, "UPDATE \"Person\" SET \"name\" = ?, \"age\" = ? WHERE \"id\" = ?");
        assert_eq!(q.params, vec![json!("Ann"), json!(31), json!(3)]);
        assert!(update(r.model("person").unwrap(), 3, &HashMap::new()).is_none());
    }

    #[test]
    fn create_table_uses_variant_types_and_references() {
        let r = registry();
        assert_eq!(
            create_table(r.model("team").unwrap()),
            "CREATE TABLE IF NOT EXISTS \"Team\" (\"id\" INTEGER PRIMARY KEY AUTOINCREMENT, \
             \"name\" TEXT DEFAULT 'Unnamed', \"leadId\" INTEGER REFERENCES \"Person\")"
        );
    }
}
