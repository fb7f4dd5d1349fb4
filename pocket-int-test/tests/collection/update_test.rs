use pocket::doc;
use pocket::errors::ErrorKind;
use pocket::Value;
use pocket_int_test::test_util::{cleanup, create_test_context, create_test_docs, run_test};

#[test]
fn test_update_replaces_matches() {
    run_test(
        create_test_context,
        |ctx| {
            let patients = ctx.db().get_collection("patients")?;
            patients.insert_many(create_test_docs())?;

            patients.update(doc!{ "surname": "Bar" }, doc!{ "forename": "New", "surname": "Baz" })?;

            assert_eq!(patients.size(), 3);
            assert!(patients.find(doc!{ "surname": "Bar" })?.is_empty());
            let replaced = patients.find(doc!{ "surname": "Baz" })?;
            assert_eq!(replaced.len(), 2);
            // replacements carry only the new fields
            assert!(replaced.iter().all(|d| d.get("age").is_none()));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_update_keeps_position() {
    run_test(
        create_test_context,
        |ctx| {
            let patients = ctx.db().get_collection("patients")?;
            patients.insert_many(create_test_docs())?;

            patients.update(doc!{ "forename": "Baz" }, doc!{ "forename": "Middle" })?;
            let names: Vec<Value> = patients
                .find_all()?
                .iter()
                .filter_map(|d| d.get("forename"))
                .collect();
            assert_eq!(
                names,
                vec![Value::from("Foo"), Value::from("Middle"), Value::from("Qux")]
            );
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_update_without_id_regenerates_id() {
    run_test(
        create_test_context,
        |ctx| {
            let patients = ctx.db().get_collection("patients")?;
            let original = patients.insert(doc!{ "forename": "Foo", "surname": "Bar" })?;

            patients.update(doc!{ "forename": "Foo" }, doc!{ "forename": "Foo", "surname": "Baz" })?;

            let replaced = patients.find_one(doc!{ "forename": "Foo" })?.expect("missing");
            assert_ne!(replaced.id(), original.id());
            assert!(patients.find_one(doc!{ "_id": (original.id().as_str()) })?.is_none());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_update_with_id_keeps_it() {
    run_test(
        create_test_context,
        |ctx| {
            let patients = ctx.db().get_collection("patients")?;
            let original = patients.insert(doc!{ "forename": "Foo", "surname": "Bar" })?;
            let id = original.id();

            patients.update(&original, doc!{ "_id": (id.as_str()), "forename": "Foo", "surname": "Baz" })?;

            let replaced = patients.find_one(doc!{ "_id": (id.as_str()) })?.expect("missing");
            assert_eq!(replaced.get("surname"), Some(Value::from("Baz")));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_update_no_match_changes_nothing() {
    run_test(
        create_test_context,
        |ctx| {
            let patients = ctx.db().get_collection("patients")?;
            let docs = patients.insert_many(create_test_docs())?;
            patients.update(doc!{ "surname": "Nobody" }, doc!{ "forename": "X" })?;
            assert_eq!(patients.find_all()?, docs);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_update_invalid_id_fails_before_replacing() {
    run_test(
        create_test_context,
        |ctx| {
            let patients = ctx.db().get_collection("patients")?;
            patients.insert_many(create_test_docs())?;
            let err = patients
                .update(doc!{ "surname": "Bar" }, doc!{ "_id": null, "forename": "X" })
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::InvalidId);
            assert_eq!(patients.find(doc!{ "surname": "Bar" })?.len(), 2);
            Ok(())
        },
        cleanup,
    )
}
