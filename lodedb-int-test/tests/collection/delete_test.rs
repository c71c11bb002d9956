use lodedb::query::Query;
use lodedb_int_test::test_util::{
    cleanup, create_test_context, insert_test_documents, insert_users, run_test,
};

#[test]
fn test_delete_by_id() {
    run_test(
        create_test_context,
        |ctx| {
            let users = ctx.db().collection("users")?;
            users.create_index("age")?;
            let ids = insert_users(&users)?;

            assert!(users.delete_by_id(&ids[0])?);
            assert!(users.find_by_id(&ids[0])?.is_none());
            assert_eq!(users.count()?, 2);
            assert!(users.find(&Query::new().eq("age", 25))?.is_empty());
            assert_eq!(users.explain(&Query::new().eq("age", 25))?.candidates(), 0);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_delete_missing_document() {
    run_test(
        create_test_context,
        |ctx| {
            let users = ctx.db().collection("users")?;
            insert_users(&users)?;

            assert!(!users.delete_by_id("no-such-id")?);
            assert_eq!(users.count()?, 3);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_delete_many() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.db().collection("test")?;
            collection.create_index("last_name")?;
            insert_test_documents(&collection)?;

            let deleted = collection.delete_many(&Query::new().eq("active", false))?;
            assert_eq!(deleted, 1);
            assert_eq!(collection.count()?, 2);

            let deleted = collection.delete_many(&Query::new().eq("last_name", "ln2"))?;
            assert_eq!(deleted, 1);
            assert_eq!(collection.explain(&Query::new().eq("last_name", "ln2"))?.candidates(), 0);

            assert_eq!(collection.delete_many(&Query::new())?, 1);
            assert_eq!(collection.count()?, 0);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_delete_then_reinsert_same_id() {
    run_test(
        create_test_context,
        |ctx| {
            let users = ctx.db().collection("users")?;
            users.create_index("name")?;
            users.insert_with_id("u1", serde_json::json!({"name": "Alice"}))?;
            users.delete_by_id("u1")?;
            users.insert_with_id("u1", serde_json::json!({"name": "Alicia"}))?;

            assert!(users.find(&Query::new().eq("name", "Alice"))?.is_empty());
            assert_eq!(users.find(&Query::new().eq("name", "alicia"))?.len(), 1);
            Ok(())
        },
        cleanup,
    )
}
