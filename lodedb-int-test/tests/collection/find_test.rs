use lodedb::common::FieldValue;
use lodedb::query::Query;
use lodedb_int_test::test_util::{
    cleanup, create_test_context, insert_test_documents, insert_users, names, run_test,
};
use serde_json::json;
use std::collections::HashSet;

fn name_set(docs: &[lodedb::collection::Document]) -> HashSet<String> {
    names(docs).into_iter().collect()
}

#[test]
fn test_range_scenarios() {
    run_test(
        create_test_context,
        |ctx| {
            let users = ctx.db().collection("users")?;
            insert_users(&users)?;

            let young = users.find(&Query::new().lt("age", 30))?;
            assert_eq!(names(&young), vec!["Alice"]);

            let older = users.find(&Query::new().gte("age", 30))?;
            assert_eq!(
                name_set(&older),
                HashSet::from(["Bob".to_string(), "Charlie".to_string()])
            );

            let sorted = users.find(&Query::new().sort_desc("age"))?;
            assert_eq!(names(&sorted), vec!["Charlie", "Bob", "Alice"]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_find_with_and_conditions() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.db().collection("test")?;
            insert_test_documents(&collection)?;

            let docs = collection.find(&Query::new().gte("age", 25).lte("age", 30))?;
            assert_eq!(docs.len(), 2);

            let docs = collection.find(&Query::new().eq("active", true).gt("age", 25))?;
            assert_eq!(docs.len(), 1);
            assert_eq!(docs[0].get("first_name"), FieldValue::from("fn1"));

            let docs = collection.find(&Query::new().eq("last_name", "ln2").ne("age", 35))?;
            assert_eq!(docs.len(), 1);
            assert_eq!(docs[0].get("first_name"), FieldValue::from("fn2"));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_find_pattern_conditions() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.db().collection("test")?;
            insert_test_documents(&collection)?;

            assert_eq!(collection.count_matching(&Query::new().contains("email", "EXAMPLE"))?, 3);
            assert_eq!(collection.count_matching(&Query::new().ends_with("email", ".com"))?, 2);
            assert_eq!(collection.count_matching(&Query::new().starts_with("email", "Jo"))?, 1);
            assert_eq!(collection.count_matching(&Query::new().starts_with("age", 3))?, 2);
            assert_eq!(collection.count_matching(&Query::new().contains("missing", "x"))?, 0);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_find_membership_and_existence() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.db().collection("test")?;
            insert_test_documents(&collection)?;

            let docs = collection.find(&Query::new().in_values("age", [25, 35]))?;
            assert_eq!(docs.len(), 2);

            let docs = collection.find(&Query::new().not_in("first_name", ["fn1", "FN2"]))?;
            assert_eq!(docs.len(), 1);
            assert_eq!(docs[0].get("first_name"), FieldValue::from("fn3"));

            assert_eq!(collection.count_matching(&Query::new().exists("tags", true))?, 1);
            assert_eq!(collection.count_matching(&Query::new().exists("address.zip", false))?, 1);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_find_nested_fields_case_insensitively() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.db().collection("test")?;
            insert_test_documents(&collection)?;

            let docs = collection.find(&Query::new().eq("address.city", "BERLIN"))?;
            assert_eq!(docs.len(), 2);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_sort_by_multiple_keys() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.db().collection("test")?;
            insert_test_documents(&collection)?;

            let docs = collection.find(&Query::new().sort_asc("last_name").sort_desc("age"))?;
            let first_names: Vec<String> =
                docs.iter().map(|d| d.get("first_name").to_text()).collect();
            assert_eq!(first_names, vec!["fn1", "fn3", "fn2"]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_sort_puts_missing_values_first() {
    run_test(
        create_test_context,
        |ctx| {
            let users = ctx.db().collection("users")?;
            insert_users(&users)?;
            users.insert(json!({"name": "Nobody"}))?;

            let docs = users.find(&Query::new().sort_asc("age"))?;
            assert_eq!(names(&docs), vec!["Nobody", "Alice", "Bob", "Charlie"]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_pagination_law() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.db().collection("numbers")?;
            for i in 0..20 {
                collection.insert(json!({"n": i, "even": i % 2 == 0}))?;
            }

            let base = Query::new().eq("even", true).sort_asc("n");
            let full = collection.find(&base)?;
            assert_eq!(full.len(), 10);

            for skip in [0usize, 3, 9, 10, 15] {
                for limit in [0usize, 1, 4, 20] {
                    let page = collection.find(&base.clone().skip(skip).limit(limit))?;
                    assert!(page.len() <= limit);
                    let expected: Vec<_> = full.iter().skip(skip).take(limit).cloned().collect();
                    assert_eq!(page, expected);
                }
            }
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_find_one() {
    run_test(
        create_test_context,
        |ctx| {
            let users = ctx.db().collection("users")?;
            insert_users(&users)?;

            let oldest = users.find_one(&Query::new().sort_desc("age"))?.unwrap();
            assert_eq!(oldest.get("name"), FieldValue::from("Charlie"));
            assert!(users.find_one(&Query::new().eq("name", "Dave"))?.is_none());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_mixed_type_comparison() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.db().collection("mixed")?;
            collection.insert(json!({"v": 30}))?;
            collection.insert(json!({"v": "30"}))?;
            collection.insert(json!({"v": "9"}))?;

            assert_eq!(collection.count_matching(&Query::new().eq("v", 30))?, 2);
            // "9" sorts after "30" as text
            assert_eq!(collection.count_matching(&Query::new().gt("v", "30"))?, 1);
            Ok(())
        },
        cleanup,
    )
}
