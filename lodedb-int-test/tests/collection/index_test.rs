use lodedb::common::FieldValue;
use lodedb::errors::ErrorKind;
use lodedb::query::Query;
use lodedb_int_test::test_util::{
    cleanup, create_test_context, insert_test_documents, insert_users, names, run_test,
};
use serde_json::json;
use std::collections::HashSet;

fn ids(docs: &[lodedb::collection::Document]) -> HashSet<String> {
    docs.iter().map(|doc| doc.id().to_string()).collect()
}

#[test]
fn test_index_lookup_scenario() {
    run_test(
        create_test_context,
        |ctx| {
            let users = ctx.db().collection("users")?;
            users.create_index("age")?;
            let user_ids = insert_users(&users)?;

            let query = Query::new().eq("age", 30);
            let plan = users.explain(&query)?;
            assert_eq!(plan.index_field(), Some("age"));
            assert_eq!(plan.candidates(), 1);

            let found = users.find(&query)?;
            assert_eq!(found.len(), 1);
            assert_eq!(found[0].id(), user_ids[1]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_update_does_not_leave_stale_entries() {
    run_test(
        create_test_context,
        |ctx| {
            let users = ctx.db().collection("users")?;
            users.create_index("age")?;
            let user_ids = insert_users(&users)?;
            let alice = &user_ids[0];

            assert!(users.update_by_id(alice, json!({"age": 26}))?);

            assert!(users.find(&Query::new().eq("age", 25))?.is_empty());
            let found = users.find(&Query::new().eq("age", 26))?;
            assert_eq!(found.len(), 1);
            assert_eq!(found[0].id(), alice.as_str());
            assert_eq!(users.explain(&Query::new().eq("age", 25))?.candidates(), 0);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_index_created_after_inserts() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.db().collection("test")?;
            insert_test_documents(&collection)?;
            collection.create_index("email")?;

            let query = Query::new().eq("email", "jane@example.com");
            assert!(collection.explain(&query)?.uses_index());
            assert_eq!(collection.find(&query)?[0].get("first_name"), FieldValue::from("fn2"));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_nested_field_index() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.db().collection("test")?;
            collection.create_index("address.city")?;
            insert_test_documents(&collection)?;

            let query = Query::new().eq("address.city", "berlin");
            assert_eq!(collection.explain(&query)?.candidates(), 2);
            assert_eq!(collection.find(&query)?.len(), 2);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_index_narrowing_is_rechecked() {
    run_test(
        create_test_context,
        |ctx| {
            let users = ctx.db().collection("users")?;
            users.create_index("name")?;
            insert_users(&users)?;
            users.insert(json!({"name": "bob", "age": 99}))?;

            let query = Query::new().eq("name", "BOB").lt("age", 50);
            assert_eq!(users.explain(&query)?.candidates(), 2);
            assert_eq!(names(&users.find(&query)?), vec!["Bob"]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_index_and_scan_equivalence() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            let indexed = db.collection("indexed")?;
            let plain = db.collection("plain")?;
            indexed.create_index("v")?;

            let values = vec![
                json!(1),
                json!(1.0),
                json!("1"),
                json!(1.5),
                json!("A"),
                json!("a"),
                json!(false),
                json!("False"),
                json!(null),
                json!([1]),
                json!({"x": 1}),
            ];
            for (i, value) in values.iter().enumerate() {
                let id = format!("d{}", i);
                indexed.insert_with_id(&id, json!({ "v": value }))?;
                plain.insert_with_id(&id, json!({ "v": value }))?;
            }
            indexed.insert_with_id("none", json!({}))?;
            plain.insert_with_id("none", json!({}))?;

            // churn some documents so the index has seen updates and deletes
            for collection in [&indexed, &plain] {
                collection.update_by_id("d0", json!({"v": 2}))?;
                collection.update_by_id("d0", json!({"v": 1}))?;
                collection.delete_by_id("d3")?;
            }

            let operands = values.iter().cloned().chain([json!("FALSE"), json!(2), json!("b")]);
            for operand in operands {
                let query = Query::new().eq("v", &operand);
                let from_index = ids(&indexed.find(&query)?);
                let from_scan = ids(&plain.find(&query)?);
                assert_eq!(from_index, from_scan, "results differ for {}", operand);
            }
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_index_management() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.db().collection("test")?;
            collection.create_index("email")?;
            collection.create_index("age")?;

            assert!(collection.has_index("email")?);
            assert_eq!(
                collection.list_indexes()?,
                HashSet::from(["email".to_string(), "age".to_string()])
            );

            let err = collection.create_index("email").unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::IndexAlreadyExists);

            collection.drop_index("email")?;
            assert!(!collection.has_index("email")?);
            let err = collection.drop_index("email").unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::IndexNotFound);

            let err = collection.create_index("").unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::InvalidFieldName);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_dropped_index_falls_back_to_scan() {
    run_test(
        create_test_context,
        |ctx| {
            let users = ctx.db().collection("users")?;
            users.create_index("age")?;
            insert_users(&users)?;
            users.drop_index("age")?;

            let query = Query::new().eq("age", 35);
            assert!(!users.explain(&query)?.uses_index());
            assert_eq!(names(&users.find(&query)?), vec!["Charlie"]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_rebuild_indexes() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            let users = db.collection("users")?;
            users.create_index("age")?;
            insert_users(&users)?;

            db.rebuild_indexes()?;
            let query = Query::new().eq("age", 25);
            assert_eq!(users.explain(&query)?.candidates(), 1);
            assert_eq!(names(&users.find(&query)?), vec!["Alice"]);
            Ok(())
        },
        cleanup,
    )
}
