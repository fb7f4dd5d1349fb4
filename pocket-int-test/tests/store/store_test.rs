use pocket::doc;
use pocket::errors::ErrorKind;
use pocket::StoreState;
use pocket_int_test::test_util::{cleanup, create_test_context, create_test_docs, run_test};

#[test]
fn test_state_transitions() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            assert_eq!(db.state()?, StoreState::Empty);
            db.get_collection("patients")?.insert_many(create_test_docs())?;
            assert_eq!(db.state()?, StoreState::Loaded);
            db.encrypt("secret")?;
            assert_eq!(db.state()?, StoreState::Locked);
            db.decrypt("secret")?;
            assert_eq!(db.state()?, StoreState::Loaded);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_closed_store() {
    run_test(
        create_test_context,
        |ctx| {
            let db = ctx.db();
            let patients = db.get_collection("patients")?;
            patients.insert(doc!{ "forename": "Foo" })?;

            db.close()?;
            assert!(db.is_closed());
            assert!(patients.is_destroyed());
            assert_eq!(db.get_collection("patients").unwrap_err().kind(), &ErrorKind::StoreClosed);
            assert_eq!(db.restore_store().unwrap_err().kind(), &ErrorKind::StoreClosed);
            // closing twice is harmless
            db.close()?;
            Ok(())
        },
        cleanup,
    )
}

#[cfg(all(feature = "fjall", not(feature = "memory")))]
#[test]
fn test_data_survives_reopen() {
    use pocket_fjall_adapter::FjallSubstrate;
    use pocket_int_test::test_util::{random_path, test_builder};
    use std::time::Duration;

    let path = random_path();
    let ids = {
        let substrate = FjallSubstrate::with_config().db_path(&path).build().unwrap();
        let db = test_builder().substrate(substrate).open().unwrap();
        let patients = db.get_collection("patients").unwrap();
        let ids: Vec<_> = patients
            .insert_many(create_test_docs())
            .unwrap()
            .iter()
            .map(|d| d.id())
            .collect();
        db.close().unwrap();
        ids
    };
    std::thread::sleep(Duration::from_millis(50));

    {
        let substrate = FjallSubstrate::with_config().db_path(&path).build().unwrap();
        let db = test_builder().substrate(substrate).open().unwrap();
        db.restore_store().unwrap();
        let restored: Vec<_> = db
            .get_collection("patients")
            .unwrap()
            .find_all()
            .unwrap()
            .iter()
            .map(|d| d.id())
            .collect();
        assert_eq!(restored, ids);
        db.close().unwrap();
    }

    let _ = std::fs::remove_dir_all(&path);
}

#[cfg(all(feature = "fjall", not(feature = "memory")))]
#[test]
fn test_encrypted_data_survives_reopen() {
    use pocket_fjall_adapter::FjallSubstrate;
    use pocket_int_test::test_util::{random_path, test_builder};
    use std::time::Duration;

    let path = random_path();
    {
        let substrate = FjallSubstrate::with_config().db_path(&path).build().unwrap();
        let db = test_builder().substrate(substrate).open().unwrap();
        db.get_collection("patients").unwrap().insert_many(create_test_docs()).unwrap();
        db.encrypt("secret").unwrap();
        db.close().unwrap();
    }
    std::thread::sleep(Duration::from_millis(50));

    {
        let substrate = FjallSubstrate::with_config().db_path(&path).build().unwrap();
        let db = test_builder().substrate(substrate).open().unwrap();
        assert_eq!(db.state().unwrap(), StoreState::Locked);
        db.decrypt("secret").unwrap();
        assert_eq!(db.get_collection("patients").unwrap().size(), 3);
        db.close().unwrap();
    }

    let _ = std::fs::remove_dir_all(&path);
}
