use lodedb::errors::ErrorKind;
use lodedb::Database;
use lodedb_int_test::test_util::{cleanup, create_test_context, insert_test_documents, run_test};
use serde_json::json;
use std::collections::HashSet;

#[test]
fn test_list_collection_names() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            db.collection("users")?;
            db.collection("orders")?.insert(json!({"total": 1}))?;

            assert_eq!(
                db.list_collection_names()?,
                HashSet::from(["users".to_string(), "orders".to_string()])
            );
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_stats() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            insert_test_documents(&db.collection("a")?)?;
            db.collection("b")?.insert(json!({"x": 1}))?;
            db.collection("c")?;

            let stats = db.stats()?;
            assert_eq!(stats.collections(), 3);
            assert_eq!(stats.total_documents(), 4);
            if db.config().is_in_memory() {
                assert_eq!(stats.disk_size(), 0);
            } else {
                assert!(stats.disk_size() > 0);
            }
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_compact_keeps_data() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            let collection = db.collection("test")?;
            let ids = insert_test_documents(&collection)?;

            db.compact()?;
            assert_eq!(collection.count()?, 3);
            assert!(collection.find_by_id(&ids[2])?.is_some());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_close_twice() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            db.close()?;
            let err = db.close().unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::StoreAlreadyClosed);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_in_memory_sentinel() {
    let db = Database::open(":memory:").unwrap();
    assert!(db.config().is_in_memory());

    let users = db.collection("users").unwrap();
    users.insert(json!({"name": "Alice"})).unwrap();
    assert_eq!(db.stats().unwrap().disk_size(), 0);
    db.close().unwrap();
}

#[test]
fn test_builder_pretty_print() {
    let path = lodedb_int_test::test_util::random_path();
    let db = Database::builder().path(&path).pretty_print(true).open().unwrap();
    db.collection("users")
        .unwrap()
        .insert_with_id("u1", json!({"name": "Alice"}))
        .unwrap();

    let file = std::path::Path::new(&path)
        .join("collections")
        .join("users")
        .join("u1.json");
    let text = std::fs::read_to_string(file).unwrap();
    assert!(text.contains('\n'));

    db.close().unwrap();
    lodedb_int_test::test_util::remove_dir(&path);
}
