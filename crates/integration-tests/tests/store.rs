//! `PgClientStore` against a real `PostgreSQL` database.

use client_registry_core::TaxIdError;
use client_registry_integration_tests::{cleanup, random_cnpj, random_cpf, test_store, unique_name};
use client_registry_server::db::{ClientStore, ErrorKind, StoreError};
use client_registry_server::models::NewClient;

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_insert_then_exists() {
    let store = test_store().await;
    let cpf = random_cpf();

    assert!(!store.exists(cpf.as_str()).await.unwrap());

    let created = store
        .insert(&NewClient::new(unique_name("Alice"), cpf.as_str()))
        .await
        .unwrap();
    assert_eq!(created.tax_id, cpf);
    assert!(!created.blocklist);

    assert!(store.exists(cpf.as_str()).await.unwrap());

    cleanup(store.pool(), &[&cpf]).await;
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_formatted_identifier_is_stored_normalized() {
    let store = test_store().await;
    let cnpj = random_cnpj();
    let s = cnpj.as_str();
    let (head, rest) = s.split_at(2);
    let (mid, rest) = rest.split_at(3);
    let (tail, rest) = rest.split_at(3);
    let (branch, check) = rest.split_at(4);
    let formatted = format!("{head}.{mid}.{tail}/{branch}-{check}");

    let created = store
        .insert(&NewClient::new(unique_name("Padaria"), formatted.as_str()))
        .await
        .unwrap();

    assert_eq!(created.tax_id.as_str(), s);
    assert!(store.exists(&formatted).await.unwrap());

    cleanup(store.pool(), &[&cnpj]).await;
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_duplicate_insert_rejected() {
    let store = test_store().await;
    let cpf = random_cpf();

    store
        .insert(&NewClient::new(unique_name("First"), cpf.as_str()))
        .await
        .unwrap();

    let err = store
        .insert(&NewClient::new(unique_name("Second"), cpf.as_str()))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::DuplicateTaxId));

    let matching = store
        .get_all()
        .await
        .unwrap()
        .into_iter()
        .filter(|c| c.tax_id == cpf)
        .count();
    assert_eq!(matching, 1);

    cleanup(store.pool(), &[&cpf]).await;
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_concurrent_inserts_exactly_one_wins() {
    let store = test_store().await;
    let cpf = random_cpf();
    let a = NewClient::new(unique_name("Racer A"), cpf.as_str());
    let b = NewClient::new(unique_name("Racer B"), cpf.as_str());

    let (ra, rb) = tokio::join!(store.insert(&a), store.insert(&b));

    let outcomes = [ra, rb];
    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
    assert_eq!(
        outcomes
            .iter()
            .filter(|r| matches!(r, Err(StoreError::DuplicateTaxId)))
            .count(),
        1
    );

    cleanup(store.pool(), &[&cpf]).await;
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_invalid_identifiers_insert_nothing() {
    let store = test_store().await;
    for (raw, expected) in [
        ("123", TaxIdError::InvalidLength),
        ("11144477736", TaxIdError::InvalidCpf),
        ("11222333000182", TaxIdError::InvalidCnpj),
        ("00000000000", TaxIdError::InvalidCpf),
    ] {
        let err = store
            .insert(&NewClient::new(unique_name("Invalid"), raw))
            .await
            .unwrap_err();
        assert!(
            matches!(err, StoreError::InvalidTaxId(e) if e == expected),
            "{raw}"
        );
    }

    let err = store.exists("00000000000").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidCpf);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_get_by_name_case_insensitive_and_literal() {
    let store = test_store().await;
    let marker = unique_name("Zeta");
    let first = random_cpf();
    let second = random_cpf();

    store
        .insert(&NewClient::new(format!("{marker} Souza"), first.as_str()))
        .await
        .unwrap();
    store
        .insert(&NewClient::new(format!("{marker} 100% Lima"), second.as_str()))
        .await
        .unwrap();

    let found = store
        .get_by_name(&marker.to_uppercase())
        .await
        .unwrap();
    let names: Vec<_> = found.iter().map(|c| c.name.clone()).collect();
    assert_eq!(
        names,
        [format!("{marker} 100% Lima"), format!("{marker} Souza")]
    );

    let literal = store
        .get_by_name(&format!("{marker} 100%"))
        .await
        .unwrap();
    assert_eq!(literal.len(), 1);

    let wildcard = store.get_by_name(&format!("{marker}_")).await.unwrap();
    assert!(wildcard.is_empty());

    cleanup(store.pool(), &[&first, &second]).await;
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_ping() {
    let store = test_store().await;
    store.ping().await.unwrap();
}
