use serde_json::json;

use super::*;
use crate::bind::{BindParamGenerator, Binds, BoundValues, map_bind_parameters, resolve_bind_values};
use crate::dialect::{MsSql, MySql, Postgres};
use crate::error::WeaveResult;
use crate::value::Value;

fn pg_json(tree: serde_json::Value) -> String {
    let pg = Postgres::new();
    let tree = Where::from_json(&tree).unwrap();
    compile_where(&tree, &pg).unwrap()
}

fn pg_err(tree: serde_json::Value) -> String {
    let pg = Postgres::new();
    let tree = Where::from_json(&tree).unwrap();
    let err = compile_where(&tree, &pg).unwrap_err();
    assert!(err.is_invalid_where(), "unexpected error: {err}");
    err.to_string()
}

#[test]
fn or_of_two_leaves() {
    let pg = Postgres::new();
    let compiler = WhereCompiler::with_config(&pg, CompilerConfig::new().quote_identifiers(false));
    let tree = Where::from_json(&json!({ "$or": [{ "a": 1 }, { "b": 2 }] })).unwrap();
    assert_eq!(compiler.compile(&tree).unwrap(), "(a = 1 OR b = 2)");

    assert_eq!(
        pg_json(json!({ "$or": [{ "a": 1 }, { "b": null }] })),
        r#"("a" = 1 OR "b" IS NULL)"#
    );
}

#[test]
fn empty_trees_vanish() {
    assert_eq!(pg_json(json!({})), "");
    assert_eq!(pg_json(json!([])), "");
    assert_eq!(pg_json(json!({ "$or": [] })), "");
    assert_eq!(pg_json(json!({ "a": 1, "$or": [] })), r#""a" = 1"#);
    assert_eq!(pg_json(json!([{}, { "a": 1 }, {}])), r#""a" = 1"#);
    assert!(Where::empty().is_vacuous());
    assert!(!Where::eq("a", 1).is_vacuous());
}

#[test]
fn builder_trees_nest_parentheses() {
    let pg = Postgres::new();
    let tree = Where::all([
        Where::eq("status", "active"),
        Where::or([
            Where::leaf("age", Predicate::op(Op::Gte, 18)),
            Where::eq("role", "admin"),
        ]),
    ]);
    assert_eq!(
        compile_where(&tree, &pg).unwrap(),
        r#"("status" = 'active' AND ("age" >= 18 OR "role" = 'admin'))"#
    );
}

#[test]
fn attributes_are_quoted_per_dialect() {
    let tree = Where::eq("u.id", 1);
    assert_eq!(compile_where(&tree, &Postgres::new()).unwrap(), r#""u"."id" = 1"#);
    assert_eq!(compile_where(&tree, &MySql).unwrap(), "`u`.`id` = 1");
    assert_eq!(compile_where(&tree, &MsSql).unwrap(), "[u].[id] = 1");
}

#[test]
fn invalid_attribute_is_reported() {
    let pg = Postgres::new();
    let err = compile_where(&Where::eq("a b", 1), &pg).unwrap_err();
    assert!(err.is_invalid_where());
    assert!(err.to_string().contains("Invalid character in identifier"));
}

#[test]
fn not_wraps_once() {
    assert_eq!(pg_json(json!({ "$not": { "a": 1 } })), r#"NOT ("a" = 1)"#);
    assert_eq!(
        pg_json(json!({ "$not": { "a": 1, "b": 2 } })),
        r#"NOT ("a" = 1 AND "b" = 2)"#
    );
    assert_eq!(pg_json(json!({ "$not": {} })), "");
    assert_eq!(pg_json(json!({ "a": { "$not": 5 } })), r#"NOT ("a" = 5)"#);
}

#[test]
fn value_shape_picks_the_operator() {
    assert_eq!(pg_json(json!({ "a": [1, 2] })), r#""a" IN (1, 2)"#);
    assert_eq!(pg_json(json!({ "a": null })), r#""a" IS NULL"#);
    assert_eq!(pg_json(json!({ "a": "x" })), r#""a" = 'x'"#);
    assert_eq!(pg_json(json!({ "a": { "$eq": null } })), r#""a" IS NULL"#);
    assert_eq!(pg_json(json!({ "a": { "$ne": null } })), r#""a" IS NOT NULL"#);
    assert_eq!(pg_json(json!({ "a": { "$is": true } })), r#""a" IS true"#);
}

#[test]
fn empty_in_lists() {
    assert_eq!(pg_json(json!({ "a": { "$in": [] } })), r#""a" IN (NULL)"#);
    assert_eq!(pg_json(json!({ "a": { "$notIn": [] }, "b": 1 })), r#""b" = 1"#);
    assert_eq!(
        pg_json(json!({ "a": { "$in": { "$literal": "(SELECT id FROM t)" } } })),
        r#""a" IN (SELECT id FROM t)"#
    );
}

#[test]
fn operand_validation() {
    assert!(pg_err(json!({ "a": { "$in": 5 } })).contains("Operators in and notIn"));
    assert!(pg_err(json!({ "a": { "$is": 5 } })).contains("Operators is and isNot"));
    assert!(pg_err(json!({ "a": { "$between": [1] } })).contains("Operators between and notBetween"));
}

#[test]
fn between_ranges() {
    assert_eq!(
        pg_json(json!({ "a": { "$between": [1, 5] } })),
        r#""a" BETWEEN 1 AND 5"#
    );
    assert_eq!(
        pg_json(json!({ "a": { "$notBetween": [1, 5] } })),
        r#""a" NOT BETWEEN 1 AND 5"#
    );
}

#[test]
fn several_operators_on_one_attribute() {
    assert_eq!(
        pg_json(json!({ "age": { "$gte": 18, "$lt": 65 } })),
        r#"("age" >= 18 AND "age" < 65)"#
    );
    assert_eq!(
        pg_json(json!({ "a": { "$or": [5, 6] } })),
        r#"("a" = 5 OR "a" = 6)"#
    );
}

#[test]
fn substring_family_builds_like_patterns() {
    assert_eq!(
        pg_json(json!({ "name": { "$startsWith": "bo" } })),
        r#""name" LIKE 'bo%'"#
    );
    assert_eq!(
        pg_json(json!({ "name": { "$notSubstring": "x" } })),
        r#""name" NOT LIKE '%x%'"#
    );
    assert_eq!(
        pg_json(json!({ "name": { "$endsWith": { "$col": "other" } } })),
        r#""name" LIKE CONCAT('%', "other")"#
    );
}

#[test]
fn quantified_comparisons() {
    assert_eq!(
        pg_json(json!({ "a": { "$gt": { "$any": [1, 2] } } })),
        r#""a" > ANY (ARRAY[1,2])"#
    );
    assert_eq!(
        pg_json(json!({ "a": { "$any": { "$values": [1, 2] } } })),
        r#""a" = ANY (VALUES (1), (2))"#
    );
}

#[test]
fn key_existence_needs_array_support() {
    assert_eq!(
        pg_json(json!({ "a": { "$anyKeyExists": ["x", "y"] } })),
        r#""a" ?| ARRAY['x','y']"#
    );
    let tree = Where::from_json(&json!({ "a": { "$anyKeyExists": ["x"] } })).unwrap();
    let err = compile_where(&tree, &MySql).unwrap_err();
    assert!(err.to_string().contains("does not support the anyKeyExists operator"));
}

#[test]
fn literal_fragments() {
    assert_eq!(pg_json(json!({ "$literal": "x > 1" })), "x > 1");
    assert_eq!(
        pg_json(json!({ "$and": [{ "$literal": "x > 1" }, { "a": 1 }] })),
        r#"(x > 1 AND "a" = 1)"#
    );
}

#[test]
fn literal_fragments_keep_their_precedence() {
    let pg = Postgres::new();
    let tree = Where::all([Where::literal("a = 1 OR b = 2"), Where::eq("c", 3)]);
    assert_eq!(
        compile_where(&tree, &pg).unwrap(),
        r#"((a = 1 OR b = 2) AND "c" = 3)"#
    );

    let tree = Where::or([Where::literal("a = 1 AND b = 2"), Where::literal("(x OR y)")]);
    assert_eq!(
        compile_where(&tree, &pg).unwrap(),
        "((a = 1 AND b = 2) OR (x OR y))"
    );

    assert_eq!(
        pg_json(json!({ "$or": [{ "$literal": "note = 'x AND y'" }, { "a": 1 }] })),
        r#"(note = 'x AND y' OR "a" = 1)"#
    );
}

#[test]
fn document_key_order_is_kept() {
    assert_eq!(pg_json(json!({ "z": 1, "a": 2 })), r#"("z" = 1 AND "a" = 2)"#);
    assert_eq!(
        pg_json(json!({ "b": { "$lt": 5, "$gt": 1 }, "$or": [{ "y": 1 }, { "x": 2 }] })),
        r#"(("b" < 5 AND "b" > 1) AND ("y" = 1 OR "x" = 2))"#
    );
}

#[test]
fn compare_fragment() {
    let pg = Postgres::new();
    let tree = Where::Fragment(Fragment::Compare {
        left: Value::literal("lower(name)"),
        op: Op::Eq,
        right: "bob".into(),
    });
    assert_eq!(compile_where(&tree, &pg).unwrap(), "lower(name) = 'bob'");

    let mut binds = BindParamGenerator::new();
    let sql = WhereCompiler::new(&pg)
        .compile_with_binds(&tree, &mut binds)
        .unwrap();
    assert_eq!(sql, "lower(name) = $sqlweave_1");
    assert_eq!(binds.len(), 1);
}

#[test]
fn bind_mode_generates_parameters() {
    let pg = Postgres::new();
    let tree = Where::from_json(&json!({ "a": 1, "b": null, "c": { "$in": [2, 3] } })).unwrap();
    let mut binds = BindParamGenerator::new();
    let sql = WhereCompiler::new(&pg)
        .compile_with_binds(&tree, &mut binds)
        .unwrap();
    assert_eq!(
        sql,
        r#"("a" = $sqlweave_1 AND "b" IS NULL AND "c" IN ($sqlweave_2, $sqlweave_3))"#
    );

    let mapping = map_bind_parameters(&sql, &pg).unwrap();
    assert_eq!(mapping.sql, r#"("a" = $1 AND "b" IS NULL AND "c" IN ($2, $3))"#);
    let values = resolve_bind_values(&mapping, &Binds::Named(binds.into_binds())).unwrap();
    assert_eq!(
        values,
        BoundValues::Ordered(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
    );
}

#[test]
fn bind_mode_leaves_is_operands_inline() {
    let pg = Postgres::new();
    let tree = Where::leaf("flag", Predicate::op(Op::IsNot, true));
    let mut binds = BindParamGenerator::new();
    let sql = WhereCompiler::new(&pg)
        .compile_with_binds(&tree, &mut binds)
        .unwrap();
    assert_eq!(sql, r#""flag" IS NOT true"#);
    assert!(binds.is_empty());
}

#[test]
fn from_json_rejects_bad_shapes() {
    let err = Where::from_json(&json!("a = 1")).unwrap_err();
    assert!(err.is_invalid_where());
    assert!(err.to_string().contains("has been removed"));

    let err = Where::from_json(&json!({ "$gt": 1 })).unwrap_err();
    assert!(err.to_string().contains("includes the operator $gt"));

    let err = Where::from_json(&json!(5)).unwrap_err();
    assert!(err.to_string().contains("expected a plain object or an array"));

    let err = Where::from_json(&json!({ "a": { "$bogus": 1 } })).unwrap_err();
    assert!(err.to_string().contains("unknown operator $bogus"));
}

#[test]
fn to_json_parses_back() {
    let source = json!({ "a": { "$gt": { "$any": [1, 2] } }, "$not": { "b": { "$col": "c" } } });
    let tree = Where::from_json(&source).unwrap();
    assert_eq!(tree.to_json(), source);
    assert_eq!(Where::from_json(&tree.to_json()).unwrap(), tree);
}

#[test]
fn to_json_keeps_repeated_attributes() {
    let pg = Postgres::new();
    let tree = Where::group([
        Where::leaf("a", Predicate::op(Op::Gt, 1)),
        Where::leaf("a", Predicate::op(Op::Lt, 5)),
    ]);
    assert_eq!(
        tree.to_json(),
        json!({ "$and": [{ "a": { "$gt": 1 } }, { "a": { "$lt": 5 } }] })
    );
    let reparsed = Where::from_json(&tree.to_json()).unwrap();
    assert_eq!(
        compile_where(&reparsed, &pg).unwrap(),
        compile_where(&tree, &pg).unwrap()
    );

    let tree = Where::group([Where::or([Where::eq("x", 1)]), Where::or([Where::eq("y", 2)])]);
    let json = tree.to_json();
    assert_eq!(json["$and"].as_array().map(Vec::len), Some(2));

    let err = compile_where(
        &Where::group([
            Where::leaf("a", Predicate::op(Op::Gt, 1)),
            Where::leaf("a", Predicate::op(Op::Is, 5)),
        ]),
        &pg,
    )
    .unwrap_err();
    assert!(err.to_string().contains(r#"{"$and":[{"a":{"$gt":1}},{"a":{"$is":5}}]}"#));
}

#[test]
fn pool_buffers_come_back_after_errors() {
    let pg = Postgres::new();
    let compiler = WhereCompiler::new(&pg);
    let tree = Where::from_json(&json!({ "$and": [{ "a": 1 }, { "b": { "$is": 5 } }] })).unwrap();
    assert!(compiler.compile(&tree).is_err());
    assert_eq!(compiler.available_buffers(), DEFAULT_POOL_CAPACITY);

    let tree = Where::from_json(&json!({ "$and": [{ "a": 1 }, { "b": 2 }] })).unwrap();
    assert_eq!(compiler.compile(&tree).unwrap(), r#"("a" = 1 AND "b" = 2)"#);
    assert_eq!(compiler.available_buffers(), DEFAULT_POOL_CAPACITY);
}

struct Placeholders;

impl PartHandler for Placeholders {
    fn leaf(&mut self, attribute: &str, _predicate: &Predicate, out: &mut String) -> WeaveResult<()> {
        out.push_str(attribute);
        out.push_str(" = ?");
        Ok(())
    }

    fn fragment(&mut self, _fragment: &Fragment, out: &mut String) -> WeaveResult<()> {
        out.push_str("TRUE");
        Ok(())
    }
}

#[test]
fn custom_part_handler() {
    let pg = Postgres::new();
    let tree = Where::not(Where::or([Where::eq("a", 1), Where::literal("x")]));
    let sql = WhereCompiler::new(&pg)
        .compile_with(&tree, &mut Placeholders)
        .unwrap();
    assert_eq!(sql, "NOT (a = ? OR TRUE)");
}
