use pocket::doc;
use pocket::errors::ErrorKind;
use pocket::{Document, StoreState};
use pocket_int_test::test_util::{cleanup, create_test_context, create_test_docs, run_test};

#[test]
fn test_lock_round_trip() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            db.get_collection("patients")?.insert_many(create_test_docs())?;
            db.get_collection("wards")?.insert(doc!{ "name": "A" })?;
            let patients: Vec<Document> = db.get_collection("patients")?.find_all()?;
            let wards: Vec<Document> = db.get_collection("wards")?.find_all()?;

            db.encrypt("correct horse")?;
            assert_eq!(db.state()?, StoreState::Locked);
            assert!(db.collection_names().is_empty());

            db.decrypt("correct horse")?;
            assert_eq!(db.state()?, StoreState::Loaded);
            assert_eq!(db.get_collection("patients")?.find_all()?, patients);
            assert_eq!(db.get_collection("wards")?.find_all()?, wards);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_locked_store_hides_plaintext() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            db.get_collection("patients")?.insert_many(create_test_docs())?;
            db.encrypt("secret")?;

            let fresh = ctx.open_fresh_store()?;
            fresh.restore_store()?;
            assert!(fresh.collection_names().is_empty());
            assert_eq!(fresh.state()?, StoreState::Locked);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_wrong_password() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            db.get_collection("patients")?.insert_many(create_test_docs())?;
            db.encrypt("secret")?;

            let err = db.decrypt("guess").unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::DecryptionFailure);
            assert!(!db.has_collection("patients"));
            assert_eq!(db.state()?, StoreState::Locked);

            db.decrypt("secret")?;
            assert_eq!(db.get_collection("patients")?.size(), 3);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_decrypt_leaves_plaintext_at_rest() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            db.get_collection("patients")?.insert_many(create_test_docs())?;
            db.encrypt("secret")?;
            db.decrypt("secret")?;

            // no re-lock happens, a fresh store reads the plaintext record
            let fresh = ctx.open_fresh_store()?;
            fresh.restore_store()?;
            assert_eq!(fresh.get_collection("patients")?.size(), 3);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_decrypt_stops_part_way() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            db.get_collection("a")?.insert(doc!{ "n": 1 })?;
            db.encrypt("first")?;
            db.get_collection("b")?.insert(doc!{ "n": 2 })?;
            db.encrypt("second")?;

            let err = db.decrypt("first").unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::DecryptionFailure);
            assert!(db.has_collection("a"));
            assert!(!db.has_collection("b"));

            db.decrypt("second")?;
            assert_eq!(db.collection_names(), vec!["a", "b"]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_collection_handles_die_on_encrypt() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            let patients = db.get_collection("patients")?;
            patients.insert_many(create_test_docs())?;
            db.encrypt("secret")?;

            assert!(patients.is_destroyed());
            let err = patients.insert(doc!{ "forename": "Late" }).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::CollectionDestroyed);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_remove_collection_deletes_secure_record() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            db.get_collection("patients")?.insert_many(create_test_docs())?;
            db.encrypt("secret")?;

            db.remove_collection("patients")?;
            assert_eq!(db.state()?, StoreState::Empty);
            db.decrypt("secret")?;
            assert!(!db.has_collection("patients"));
            Ok(())
        },
        cleanup,
    )
}
