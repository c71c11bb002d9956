use lodedb::common::FieldValue;
use lodedb::errors::ErrorKind;
use lodedb::query::Query;
use lodedb_int_test::test_util::{
    cleanup, create_test_context, insert_test_documents, insert_users, run_test,
};
use serde_json::json;

#[test]
fn test_update_by_id() {
    run_test(
        create_test_context,
        |ctx| {
            let users = ctx.db().collection("users")?;
            let ids = insert_users(&users)?;

            assert!(users.update_by_id(&ids[1], json!({"name": "Robert", "age": 31}))?);
            let bob = users.find_by_id(&ids[1])?.unwrap();
            assert_eq!(bob.get("name"), FieldValue::from("Robert"));
            assert_eq!(bob.get("age"), FieldValue::from(31));
            assert_eq!(users.count()?, 3);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_update_replaces_whole_payload() {
    run_test(
        create_test_context,
        |ctx| {
            let users = ctx.db().collection("users")?;
            let ids = insert_users(&users)?;

            users.update_by_id(&ids[0], json!({"age": 26}))?;
            let alice = users.find_by_id(&ids[0])?.unwrap();
            assert_eq!(alice.value()?, json!({"age": 26}));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_update_missing_document() {
    run_test(
        create_test_context,
        |ctx| {
            let users = ctx.db().collection("users")?;
            insert_users(&users)?;

            assert!(!users.update_by_id("no-such-id", json!({"age": 1}))?);
            assert!(users.find_by_id("no-such-id")?.is_none());
            assert_eq!(users.count()?, 3);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_update_many() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.db().collection("test")?;
            collection.create_index("active")?;
            insert_test_documents(&collection)?;

            let updated =
                collection.update_many(&Query::new().eq("active", true), json!({"active": false, "archived": true}))?;
            assert_eq!(updated, 2);

            assert_eq!(collection.count_matching(&Query::new().eq("active", true))?, 0);
            assert_eq!(collection.count_matching(&Query::new().eq("active", false))?, 3);
            assert_eq!(collection.count_matching(&Query::new().exists("archived", true))?, 2);

            let jane = collection
                .find_one(&Query::new().eq("email", "jane@example.com"))?
                .unwrap();
            assert_eq!(jane.get("age"), FieldValue::from(25));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_update_many_rejects_non_object() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.db().collection("test")?;
            insert_test_documents(&collection)?;

            let err = collection.update_many(&Query::new(), json!("x")).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::InvalidOperation);
            Ok(())
        },
        cleanup,
    )
}
