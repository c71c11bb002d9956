use lodedb::errors::LodeResult;
use lodedb::query::Query;
use lodedb::Database;
use lodedb_int_test::test_util::{
    cleanup, create_test_docs, insert_users, random_path, run_test, TestContext,
};
use serde_json::json;
use std::fs;
use std::path::Path;

// Always on disk, whichever context the crate is built for.
fn create_disk_context() -> LodeResult<TestContext> {
    let path = random_path();
    let db = Database::open(&path)?;
    Ok(TestContext::new(path, db))
}

fn reopen(ctx: &TestContext) -> LodeResult<Database> {
    ctx.db().close()?;
    Database::open(ctx.path())
}

#[test]
fn test_round_trip() {
    run_test(
        create_disk_context,
        |ctx| {
            let collection = ctx.db().collection("test")?;
            let ids = collection.insert_many(create_test_docs())?;
            let before: Vec<_> = ids
                .iter()
                .map(|id| collection.find_by_id(id))
                .collect::<LodeResult<_>>()?;

            let db = reopen(&ctx)?;
            let collection = db.collection("test")?;
            assert_eq!(collection.count()?, 3);
            for (id, doc) in ids.iter().zip(before) {
                assert_eq!(collection.find_by_id(id)?, doc);
            }
            db.close()
        },
        cleanup,
    )
}

#[test]
fn test_layout_on_disk() {
    run_test(
        create_disk_context,
        |ctx| {
            let users = ctx.db().collection("users")?;
            users.create_index("age")?;
            users.insert_with_id("bob", json!({"name": "Bob", "age": 30}))?;

            let root = Path::new(ctx.path());
            let doc_file = root.join("collections").join("users").join("bob.json");
            let envelope: serde_json::Value =
                serde_json::from_str(&fs::read_to_string(doc_file)?)?;
            assert_eq!(envelope["id"], json!("bob"));
            let payload: serde_json::Value =
                serde_json::from_str(envelope["payload"].as_str().unwrap_or_default())?;
            assert_eq!(payload, json!({"name": "Bob", "age": 30}));

            ctx.db().commit()?;
            let index_file = root.join("indexes").join("users").join("age.idx");
            let index: serde_json::Value =
                serde_json::from_str(&fs::read_to_string(index_file)?)?;
            assert_eq!(index, json!({"fieldName": "age", "entries": {"30": ["bob"]}}));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_indexes_survive_reopen() {
    run_test(
        create_disk_context,
        |ctx| {
            let users = ctx.db().collection("users")?;
            users.create_index("age")?;
            let ids = insert_users(&users)?;
            users.update_by_id(&ids[0], json!({"name": "Alice", "age": 26}))?;

            let db = reopen(&ctx)?;
            let users = db.collection("users")?;
            assert!(users.has_index("age")?);

            let query = Query::new().eq("age", 26);
            assert!(users.explain(&query)?.uses_index());
            assert_eq!(users.find(&query)?[0].id(), ids[0]);
            assert!(users.find(&Query::new().eq("age", 25))?.is_empty());
            db.close()
        },
        cleanup,
    )
}

#[test]
fn test_deletes_survive_reopen() {
    run_test(
        create_disk_context,
        |ctx| {
            let users = ctx.db().collection("users")?;
            let ids = insert_users(&users)?;
            users.delete_by_id(&ids[1])?;

            let db = reopen(&ctx)?;
            let users = db.collection("users")?;
            assert_eq!(users.count()?, 2);
            assert!(users.find_by_id(&ids[1])?.is_none());
            db.close()
        },
        cleanup,
    )
}

#[test]
fn test_empty_collection_survives_reopen() {
    run_test(
        create_disk_context,
        |ctx| {
            ctx.db().collection("empty")?;

            let db = reopen(&ctx)?;
            assert!(db.has_collection("empty")?);
            db.close()
        },
        cleanup,
    )
}

#[test]
fn test_corrupt_files_are_skipped() {
    run_test(
        create_disk_context,
        |ctx| {
            let users = ctx.db().collection("users")?;
            insert_users(&users)?;

            let db = reopen(&ctx)?;
            db.close()?;

            let users_dir = Path::new(ctx.path()).join("collections").join("users");
            fs::write(users_dir.join("corrupt.json"), "{ not json")?;
            fs::write(users_dir.join("notes.txt"), "ignored")?;

            let db = Database::open(ctx.path())?;
            assert_eq!(db.collection("users")?.count()?, 3);
            db.close()
        },
        cleanup,
    )
}

#[test]
fn test_drop_collection_removes_files() {
    run_test(
        create_disk_context,
        |ctx| {
            let db = ctx.db();
            let users = db.collection("users")?;
            users.create_index("age")?;
            insert_users(&users)?;

            let root = Path::new(ctx.path());
            assert!(root.join("collections").join("users").exists());
            assert!(root.join("indexes").join("users").exists());

            db.drop_collection("users")?;
            assert!(!root.join("collections").join("users").exists());
            assert!(!root.join("indexes").join("users").exists());

            let db = reopen(&ctx)?;
            assert!(!db.has_collection("users")?);
            db.close()
        },
        cleanup,
    )
}

#[test]
fn test_bulk_indexed_writes_survive_reopen() {
    run_test(
        create_disk_context,
        |ctx| {
            let records = ctx.db().collection("records")?;
            records.create_index("flag")?;
            for i in 0..2000 {
                records.insert_with_id(&format!("r{}", i), json!({"flag": i % 2 == 0}))?;
            }
            records.update_many(&Query::new().eq("flag", true), json!({"flag": false}))?;

            let db = reopen(&ctx)?;
            let records = db.collection("records")?;
            let query = Query::new().eq("flag", false);
            assert!(records.explain(&query)?.uses_index());
            assert_eq!(records.find(&query)?.len(), 2000);
            assert!(records.find(&Query::new().eq("flag", true))?.is_empty());
            db.close()
        },
        cleanup,
    )
}
