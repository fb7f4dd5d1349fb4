use pocket::doc;
use pocket::errors::ErrorKind;
use pocket::filter::field;
use pocket_int_test::test_util::{cleanup, create_test_context, create_test_docs, run_test};
use rand::Rng;

#[test]
fn test_remove() {
    run_test(
        create_test_context,
        |ctx| {
            let patients = ctx.db().get_collection("patients")?;
            patients.insert_many(create_test_docs())?;

            let matched = patients.find(doc!{ "surname": "Bar" })?.len();
            let before = patients.size();
            patients.remove(doc!{ "surname": "Bar" })?;

            assert_eq!(patients.size(), before - matched);
            assert!(patients.find(doc!{ "surname": "Bar" })?.is_empty());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_remove_random_ranges() {
    run_test(
        create_test_context,
        |ctx| {
            let patients = ctx.db().get_collection("patients")?;
            let mut rng = rand::rng();
            for _ in 0..100 {
                let age: u32 = rng.random_range(0..100);
                patients.insert(doc!{ "age": age })?;
            }

            let threshold: u32 = rng.random_range(0..100);
            let query = field("age").gte(threshold);
            let matched = patients.find(query.clone())?.len();
            patients.remove(&query)?;

            assert_eq!(patients.size(), 100 - matched);
            assert!(patients.find(&query)?.is_empty());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_remove_by_identity() {
    run_test(
        create_test_context,
        |ctx| {
            let patients = ctx.db().get_collection("patients")?;
            let first = patients.insert(doc!{ "_id": "dup", "forename": "Foo" })?;
            let second = patients.insert(doc!{ "_id": "dup", "forename": "Baz" })?;

            patients.remove(&first)?;
            let rest = patients.find_all()?;
            assert_eq!(rest.len(), 1);
            assert!(rest[0].ptr_eq(&second));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_remove_chains() {
    run_test(
        create_test_context,
        |ctx| {
            let patients = ctx.db().get_collection("patients")?;
            patients.insert_many(create_test_docs())?;
            patients
                .remove(doc!{ "forename": "Foo" })?
                .remove(doc!{ "forename": "Baz" })?;
            assert_eq!(patients.size(), 1);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_remove_invalid_query_removes_nothing() {
    run_test(
        create_test_context,
        |ctx| {
            let patients = ctx.db().get_collection("patients")?;
            patients.insert_many(create_test_docs())?;
            let err = patients
                .remove(doc!{ "surname": "Bar", "age": { "$exists": true } })
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::UnsupportedOperator);
            assert_eq!(patients.size(), 3);
            Ok(())
        },
        cleanup,
    )
}
