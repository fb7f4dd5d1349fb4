use pocket::collection::CollectionOptions;
use pocket::doc;
use pocket::errors::ErrorKind;
use pocket_int_test::test_util::{cleanup, create_test_context, create_test_docs, run_test};

#[test]
fn test_get_collection_is_lazy() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            assert!(!db.has_collection("patients"));
            let patients = db.get_collection("patients")?;
            assert!(db.has_collection("patients"));
            assert_eq!(patients.size(), 0);
            assert_eq!(patients.name(), "patients");

            patients.insert(doc!{ "forename": "Foo" })?;
            assert_eq!(db.add_collection("patients")?.size(), 1);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_collections_are_isolated() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            db.get_collection("patients")?.insert_many(create_test_docs())?;
            db.get_collection("staff")?.insert(doc!{ "forename": "Foo" })?;

            assert_eq!(db.get_collection("patients")?.size(), 3);
            assert_eq!(db.get_collection("staff")?.size(), 1);
            assert_eq!(db.collection_names(), vec!["patients", "staff"]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_invalid_collection_names() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            assert_eq!(db.get_collection("").unwrap_err().kind(), &ErrorKind::InvalidOperation);
            assert_eq!(
                db.get_collection("secure.patients").unwrap_err().kind(),
                &ErrorKind::InvalidOperation
            );
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_destroy() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            let patients = db.get_collection("patients")?;
            patients.insert_many(create_test_docs())?;

            patients.destroy();
            assert!(patients.is_destroyed());
            assert_eq!(patients.size(), 0);
            let err = patients.find_all().unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::CollectionDestroyed);

            // the registry hands out a fresh collection
            let fresh = db.get_collection("patients")?;
            assert!(!fresh.is_destroyed());
            assert_eq!(fresh.size(), 0);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_remove_collection() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            let patients = db.get_collection("patients")?;
            patients.insert_many(create_test_docs())?;

            db.remove_collection("patients")?;
            assert!(patients.is_destroyed());
            assert!(!db.has_collection("patients"));

            // idempotent
            db.remove_collection("patients")?.remove_collection("unknown")?;

            db.restore_store()?;
            assert!(!db.has_collection("patients"));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_default_options() {
    run_test(
        create_test_context,
        |ctx| {
            let patients = ctx.db().get_collection("patients")?;
            assert_eq!(patients.options(), CollectionOptions::new(true));
            Ok(())
        },
        cleanup,
    )
}
