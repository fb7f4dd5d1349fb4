use pocket::doc;
use pocket::filter::{all, field};
use pocket::Value;
use pocket_int_test::test_util::{cleanup, create_test_context, create_test_docs, ensure, run_test};
use rand::Rng;
use std::collections::HashSet;

#[test]
fn test_insert() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.db().get_collection("patients")?;

            let document = collection.insert(doc!{
                "forename": "Foo",
                "surname": "Bar",
                "tags": ["a", "b"],
                "address": { "city": "Qux" }
            })?;
            assert_eq!(collection.size(), 1);
            assert!(!document.id().as_str().is_empty());

            for document in collection.find(all())? {
                assert_eq!(document.get("forename"), Some(Value::from("Foo")));
                assert_eq!(document.get("surname"), Some(Value::from("Bar")));
                assert!(document.get("tags").is_some());
                assert!(document.get("address").is_some());
                assert!(document.get("_id").is_some());
            }
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_insert_many() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.db().get_collection("patients")?;
            let inserted = collection.insert_many(create_test_docs())?;
            assert_eq!(inserted.len(), 3);
            assert_eq!(collection.size(), 3);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_generated_ids_are_unique() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.db().get_collection("patients")?;
            let mut rng = rand::rng();
            for i in 0..200 {
                collection.insert(doc!{ "index": i, "age": (rng.random_range(0..100)) })?;
            }

            let ids: HashSet<String> = collection
                .find_all()?
                .iter()
                .map(|d| d.id().as_str().to_string())
                .collect();
            assert_eq!(ids.len(), 200);
            ensure(ids.iter().all(|id| !id.is_empty()), "empty identifier")
        },
        cleanup,
    )
}

#[test]
fn test_insert_then_find_one_by_id() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.db().get_collection("patients")?;
            let stored = collection.insert(doc!{ "forename": "Foo", "surname": "Bar", "age": 18 })?;

            let found = collection.find_one(field("_id").eq(stored.id().as_str()))?;
            let found = found.expect("document not found");
            assert_eq!(found, stored);
            assert_eq!(found.to_value(), stored.to_value());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_insert_keeps_caller_id() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.db().get_collection("patients")?;
            let stored = collection.insert(doc!{ "_id": "patient-1", "forename": "Foo" })?;
            assert_eq!(stored.id().as_str(), "patient-1");
            assert!(!stored.id().is_generated());

            let found = collection.find_one(doc!{ "_id": "patient-1" })?;
            assert!(found.is_some());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_insert_rejects_non_object() {
    run_test(
        create_test_context,
        |ctx| {
            let collection = ctx.db().get_collection("patients")?;
            assert!(collection.insert(serde_json::json!(["Foo"])).is_err());
            assert!(collection.insert_many(vec![doc!{ "forename": "Foo" }, Value::from(1)]).is_err());
            assert_eq!(collection.size(), 0);
            Ok(())
        },
        cleanup,
    )
}
