//! Replacement injection tests.

use super::*;
use crate::bind::map_bind_parameters;
use crate::dialect::{DialectOptions, MsSql, MySql, Postgres, Sqlite};

fn named(sql: &str, dialect: &dyn Dialect, pairs: &[(&str, Value)]) -> WeaveResult<String> {
    let replacements = Replacements::named(pairs.iter().cloned());
    inject_replacements(sql, dialect, &replacements)
}

fn positional(sql: &str, dialect: &dyn Dialect, values: &[Value]) -> WeaveResult<String> {
    inject_replacements(sql, dialect, &Replacements::positional(values.to_vec()))
}

#[test]
fn test_named_replacements() {
    let pg = Postgres::new();
    assert_eq!(
        named(
            "select :one as foo, :two as bar",
            &pg,
            &[("one", 1.into()), ("two", 2.into())]
        )
        .unwrap(),
        "select 1 as foo, 2 as bar"
    );

    let sql = r#"SELECT ":id" FROM users WHERE id = ':id' OR id = :id OR id = ''':id'''"#;
    assert_eq!(
        named(sql, &pg, &[("id", 1.into())]).unwrap(),
        r#"SELECT ":id" FROM users WHERE id = ':id' OR id = 1 OR id = ''':id'''"#
    );

    let sql = "SELECT [:id] FROM users WHERE id = :id";
    assert_eq!(
        named(sql, &MsSql, &[("id", 1.into())]).unwrap(),
        "SELECT [:id] FROM users WHERE id = 1"
    );
}

#[test]
fn test_named_lookup_uses_own_keys_only() {
    let err = named(
        "SELECT * FROM users WHERE id = :toString",
        &Postgres::new(),
        &[("id", 1.into())],
    )
    .unwrap_err();
    assert!(err.is_missing_replacement());
    assert_eq!(
        err.to_string(),
        "Named replacement \":toString\" has no entry in the replacement map."
    );
}

#[test]
fn test_named_replacement_boundaries() {
    let pg = Postgres::new();
    let id = [("id", Value::from(1))];
    assert_eq!(
        named("SELECT * FROM users WHERE id = :id::string", &pg, &id).unwrap(),
        "SELECT * FROM users WHERE id = 1::string"
    );
    assert_eq!(
        named("SELECT * FROM users WHERE id = :id;", &pg, &id).unwrap(),
        "SELECT * FROM users WHERE id = 1;"
    );
    assert_eq!(
        named(
            "SELECT * FROM users WHERE id = fn(:id) OR id = fn('a',:id) OR id=:id OR id = :id",
            &pg,
            &id
        )
        .unwrap(),
        "SELECT * FROM users WHERE id = fn(1) OR id = fn('a',1) OR id=1 OR id = 1"
    );
    assert_eq!(
        named("SELECT z$$ :id x$$ * FROM users", &pg, &id).unwrap(),
        "SELECT z$$ 1 x$$ * FROM users"
    );

    let key = [("key", Value::from("name"))];
    assert_eq!(
        named("SELECT * FROM users WHERE json_col->>:key", &pg, &key).unwrap(),
        "SELECT * FROM users WHERE json_col->>'name'"
    );
    assert_eq!(
        named("SELECT * FROM users WHERE json_col->>:key", &MsSql, &key).unwrap(),
        "SELECT * FROM users WHERE json_col->>N'name'"
    );
}

#[test]
fn test_named_replacements_inside_array() {
    let sql = "SELECT * FROM users WHERE id = ARRAY[:id1]::int[] OR id = ARRAY[:id1,:id2]::int[] OR id = ARRAY[:id1, :id2]::int[];";
    assert_eq!(
        named(
            sql,
            &Postgres::new(),
            &[("id1", 1.into()), ("id2", 4.into())]
        )
        .unwrap(),
        "SELECT * FROM users WHERE id = ARRAY[1]::int[] OR id = ARRAY[1,4]::int[] OR id = ARRAY[1, 4]::int[];"
    );
}

#[test]
fn test_skips_quoted_regions() {
    let pg = Postgres::new();
    let id = [("id", Value::from(1))];
    for sql in [
        "SELECT * FROM users WHERE id = $tag$ :id $tag$ OR id = $$ :id $$",
        "SELECT * FROM users WHERE id = $tag1$ $tag2$ :id $tag2$ $tag1$",
        "SELECT * FROM users -- WHERE id = :id",
        "SELECT * FROM users -- '\nWHERE id = ' :id '",
        "SELECT * FROM users /*\nWHERE id = :id\n*/",
    ] {
        assert_eq!(named(sql, &pg, &id).unwrap(), sql);
    }

    assert_eq!(
        named("SELECT $$ abc $$ AS string FROM users WHERE id = :id", &pg, &id).unwrap(),
        "SELECT $$ abc $$ AS string FROM users WHERE id = 1"
    );
    assert_eq!(
        named("SELECT * FROM users -- WHERE id = :id\nWHERE id = :id", &pg, &id).unwrap(),
        "SELECT * FROM users -- WHERE id = :id\nWHERE id = 1"
    );
}

#[test]
fn test_backslash_escapes_per_dialect() {
    let sql = r"SELECT * FROM users WHERE id = '\' :id' OR id = :id";
    let id = [("id", Value::from(1))];

    let err = named(sql, &Postgres::new(), &id).unwrap_err();
    assert!(err.is_unterminated_string());
    assert!(named(sql, &Sqlite, &id).unwrap_err().is_unterminated_string());

    let expected = r"SELECT * FROM users WHERE id = '\' :id' OR id = 1";
    assert_eq!(named(sql, &MySql, &id).unwrap(), expected);
    let legacy = Postgres::with_options(DialectOptions::new().standard_conforming_strings(false));
    assert_eq!(named(sql, &legacy, &id).unwrap(), expected);

    let e_string = r"SELECT * FROM users WHERE id = E'\' :id' OR id = :id";
    assert_eq!(
        named(e_string, &Postgres::new(), &id).unwrap(),
        r"SELECT * FROM users WHERE id = E'\' :id' OR id = 1"
    );
    assert_eq!(
        named(e_string, &MySql, &id).unwrap(),
        r"SELECT * FROM users WHERE id = E'\' :id' OR id = 1"
    );

    let escaped_backslash = r"SELECT * FROM users WHERE id = '\\' OR id = :id";
    assert_eq!(
        named(escaped_backslash, &MySql, &id).unwrap(),
        r"SELECT * FROM users WHERE id = '\\' OR id = 1"
    );
    assert_eq!(
        named(escaped_backslash, &Postgres::new(), &id).unwrap(),
        r"SELECT * FROM users WHERE id = '\\' OR id = 1"
    );

    let tricky = r"SELECT * FROM users WHERE id = '\\\' :id' OR id = :id";
    assert_eq!(
        named(tricky, &MySql, &id).unwrap(),
        r"SELECT * FROM users WHERE id = '\\\' :id' OR id = 1"
    );
    assert!(named(tricky, &Postgres::new(), &id).is_err());
}

#[test]
fn test_positional_replacements() {
    let pg = Postgres::new();
    let sql = r#"SELECT "?" FROM users WHERE id = '?' OR id = ? OR id = '''?''' OR id2 = ?"#;
    assert_eq!(
        positional(sql, &pg, &[1.into(), 2.into()]).unwrap(),
        r#"SELECT "?" FROM users WHERE id = '?' OR id = 1 OR id = '''?''' OR id2 = 2"#
    );

    assert_eq!(
        positional(
            "SELECT * FROM users WHERE id = fn(?) OR id = fn('a',?) OR id=? OR id = ?",
            &pg,
            &[2.into(), 1.into(), 3.into(), 4.into()]
        )
        .unwrap(),
        "SELECT * FROM users WHERE id = fn(2) OR id = fn('a',1) OR id=3 OR id = 4"
    );
    assert_eq!(
        positional(
            "SELECT * FROM users WHERE id = ARRAY[?]::int[] OR ARRAY[?,?]::int[] OR ARRAY[?, ?]::int[];",
            &pg,
            &[1.into(), 1.into(), 4.into(), 1.into(), 4.into()]
        )
        .unwrap(),
        "SELECT * FROM users WHERE id = ARRAY[1]::int[] OR ARRAY[1,4]::int[] OR ARRAY[1, 4]::int[];"
    );
}

#[test]
fn test_positional_edge_cases() {
    let pg = Postgres::new();
    assert_eq!(positional("foo = ?", &pg, &[0.into()]).unwrap(), "foo = 0");
    assert_eq!(
        positional("('foo')::string", &pg, &[0.into()]).unwrap(),
        "('foo')::string"
    );
    assert_eq!(positional("SELECT $$ ? $$", &pg, &[1.into()]).unwrap(), "SELECT $$ ? $$");
    assert_eq!(
        positional(
            "SELECT * FROM products WHERE tags ?& ARRAY[1] AND tags ?| ARRAY[1] AND id = ?;",
            &pg,
            &[1.into()]
        )
        .unwrap(),
        "SELECT * FROM products WHERE tags ?& ARRAY[1] AND tags ?| ARRAY[1] AND id = 1;"
    );
    assert_eq!(
        positional("SELECT * FROM users WHERE id = ?::string", &pg, &[1.into()]).unwrap(),
        "SELECT * FROM users WHERE id = 1::string"
    );
}

#[test]
fn test_positional_list_exhausted() {
    let err = positional("SELECT ?, ?", &Postgres::new(), &[1.into()]).unwrap_err();
    assert!(matches!(
        err,
        WeaveError::MissingPositionalReplacement { index: 1 }
    ));
    assert_eq!(
        err.to_string(),
        "Positional replacement (?) 1 has no entry in the replacement map (replacements[1] is undefined)."
    );
}

#[test]
fn test_named_mode_ignores_question_marks() {
    assert_eq!(
        named("SELECT ? FROM t WHERE a = :a", &MySql, &[("a", "x".into())]).unwrap(),
        "SELECT ? FROM t WHERE a = 'x'"
    );
    assert_eq!(
        positional("SELECT :a FROM t WHERE a = ?", &MySql, &["x".into()]).unwrap(),
        "SELECT :a FROM t WHERE a = 'x'"
    );
}

#[test]
fn test_list_values_build_rows() {
    let rows = Value::Array(vec![
        Value::list([
            "john",
            "john@gmail.com",
            "2012-01-01 10:10:10",
            "2012-01-01 10:10:10",
        ]),
        Value::list([
            "michael",
            "michael@gmail.com",
            "2012-01-01 10:10:10",
            "2012-01-01 10:10:10",
        ]),
    ]);
    let sql = "INSERT INTO users (username, email, created_at, updated_at) VALUES ?;";

    assert_eq!(
        positional(sql, &Postgres::new(), std::slice::from_ref(&rows)).unwrap(),
        "INSERT INTO users (username, email, created_at, updated_at) VALUES \
         ('john', 'john@gmail.com', '2012-01-01 10:10:10', '2012-01-01 10:10:10'), \
         ('michael', 'michael@gmail.com', '2012-01-01 10:10:10', '2012-01-01 10:10:10');"
    );
    assert_eq!(
        positional(sql, &MsSql, std::slice::from_ref(&rows)).unwrap(),
        "INSERT INTO users (username, email, created_at, updated_at) VALUES \
         (N'john', N'john@gmail.com', N'2012-01-01 10:10:10', N'2012-01-01 10:10:10'), \
         (N'michael', N'michael@gmail.com', N'2012-01-01 10:10:10', N'2012-01-01 10:10:10');"
    );
}

#[test]
fn test_plain_arrays_use_array_literal() {
    assert_eq!(
        named(
            "SELECT * FROM t WHERE tags = :tags",
            &Postgres::new(),
            &[("tags", Value::array(["a", "b"]))]
        )
        .unwrap(),
        "SELECT * FROM t WHERE tags = ARRAY['a','b']"
    );
    let err = named(
        "SELECT :tags",
        &MySql,
        &[("tags", Value::array(["a", "b"]))],
    )
    .unwrap_err();
    assert!(matches!(err, WeaveError::Unsupported(_)));
}

#[test]
fn test_replacements_from_json() {
    assert_eq!(Replacements::from_json(serde_json::Value::Null).unwrap(), None);
    assert_eq!(
        Replacements::from_json(serde_json::json!([1, "a"])).unwrap(),
        Some(Replacements::positional([Value::Int(1), Value::from("a")]))
    );
    assert_eq!(
        Replacements::from_json(serde_json::json!({"id": 1})).unwrap(),
        Some(Replacements::named([("id", 1)]))
    );

    let err = Replacements::from_json(serde_json::json!(5)).unwrap_err();
    assert_eq!(
        err.to_string(),
        "\"replacements\" must be an array or a plain object, but received 5 instead."
    );
}

/// Binding `$name` and then splicing values in bind order gives the same SQL
/// as injecting `:name` replacements directly.
#[test]
fn test_bind_then_inline_matches_injection() {
    let values = Replacements::named([("a", Value::from("x'y")), ("b", Value::from(2))]);
    let Replacements::Named(map) = &values else {
        unreachable!()
    };

    for dialect in [&MySql as &dyn Dialect, &Postgres::new(), &MsSql] {
        let template = "SELECT * FROM t WHERE a = {a} AND (b = {b} OR c = {a})";
        let with_binds = template.replace("{a}", "$a").replace("{b}", "$b");
        let with_names = template.replace("{a}", ":a").replace("{b}", ":b");

        let injected = inject_replacements(&with_names, dialect, &values).unwrap();

        // Rewrite binds to positional markers, then inline in bind order.
        let mapping = map_bind_parameters(&with_binds, &MySql).unwrap();
        let ordered: Vec<Value> = mapping
            .bind_order
            .unwrap()
            .iter()
            .map(|name| map[name].clone())
            .collect();
        let inlined = inject_replacements(
            &mapping.sql,
            dialect,
            &Replacements::Positional(ordered),
        )
        .unwrap();

        assert_eq!(inlined, injected, "dialect {}", dialect.name());
    }
}
