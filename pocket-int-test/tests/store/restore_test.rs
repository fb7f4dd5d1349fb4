use pocket::doc;
use pocket::{Document, Value};
use pocket_int_test::test_util::{
    cleanup, create_test_context, create_test_docs, run_test, test_builder,
};
use rand::Rng;

#[test]
fn test_commit_then_restore_into_fresh_store() {
    run_test(
        create_test_context,
        |ctx| {
            let patients = ctx.db().get_collection("patients")?;
            let mut rng = rand::rng();
            for i in 0..25 {
                let age: u32 = rng.random_range(0..100);
                patients.insert(doc!{ "index": i, "age": age, "tags": ["x", i] })?;
            }
            patients.commit()?;
            let expected = patients.find_all()?;

            let fresh = ctx.open_fresh_store()?;
            assert!(!fresh.has_collection("patients"));
            fresh.restore_store()?;

            let restored = fresh.get_collection("patients")?.find_all()?;
            assert_eq!(restored, expected);
            let restored_ids: Vec<_> = restored.iter().map(Document::id).collect();
            let expected_ids: Vec<_> = expected.iter().map(Document::id).collect();
            assert_eq!(restored_ids, expected_ids);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_restore_multiple_collections() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            db.get_collection("patients")?.insert_many(create_test_docs())?;
            db.get_collection("wards")?.insert(doc!{ "name": "A", "beds": 12 })?;

            let fresh = ctx.open_fresh_store()?;
            fresh.restore_store()?;
            assert_eq!(fresh.collection_names(), vec!["patients", "wards"]);
            assert_eq!(fresh.get_collection("patients")?.size(), 3);
            let ward = fresh.get_collection("wards")?.find_one(doc!{ "name": "A" })?;
            assert_eq!(ward.and_then(|w| w.get("beds")), Some(Value::from(12)));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_restore_replaces_resident_collection() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            let patients = db.get_collection("patients")?;
            patients.insert_many(create_test_docs())?;

            let fresh = ctx.open_fresh_store()?;
            let stale = fresh.get_collection("patients")?;
            stale.insert(doc!{ "forename": "Stale" })?;
            // the stale insert overwrote the record, write the original back
            patients.commit()?;

            fresh.restore_store()?;
            assert!(stale.is_destroyed());
            let live = fresh.get_collection("patients")?;
            assert_eq!(live.size(), 3);
            assert!(live.find_one(doc!{ "forename": "Stale" })?.is_none());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_manual_commit() {
    run_test(
        create_test_context,
        |ctx| {
            let db = test_builder().auto_commit(false).substrate(ctx.substrate()).open()?;
            let staff = db.get_collection("staff")?;
            assert!(!staff.options().auto_commit());
            staff.insert(doc!{ "forename": "Foo" })?;

            let fresh = ctx.open_fresh_store()?;
            fresh.restore_store()?;
            assert!(!fresh.has_collection("staff"));

            db.commit(&staff)?;
            fresh.restore_store()?;
            assert_eq!(fresh.get_collection("staff")?.size(), 1);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_restore_empty_store() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            db.restore_store()?;
            assert!(db.collection_names().is_empty());
            Ok(())
        },
        cleanup,
    )
}
