//! CSV bulk import against a real `PostgreSQL` database.

use std::io::Write;

use client_registry_integration_tests::{cleanup, random_cpf, test_store, unique_name};
use client_registry_server::db::{ClientStore, ErrorKind};
use client_registry_server::import::{FailurePolicy, ImportError, import_csv_file, import_rows, read_csv_rows};

fn write_csv(contents: &str) -> std::path::PathBuf {
    let path = std::env::temp_dir().join(format!("clients-{}.csv", uuid::Uuid::new_v4()));
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_import_best_effort_skips_duplicates() {
    let store = test_store().await;
    let alice = random_cpf();
    let bob = random_cpf();
    let path = write_csv(&format!(
        "cpf_cnpj,name\n{alice},{}\n{alice},{}\n{bob},{}\n",
        unique_name("Alice"),
        unique_name("Alice Again"),
        unique_name("Bob"),
    ));

    let report = import_csv_file(&store, &path, FailurePolicy::BestEffort)
        .await
        .unwrap();

    assert_eq!(report.inserted, 2);
    assert_eq!(report.failures.len(), 1);
    let failure = report.failures.first().unwrap();
    assert_eq!(failure.line, 3);
    assert_eq!(failure.error.kind(), ErrorKind::DuplicateTaxId);
    assert!(store.exists(bob.as_str()).await.unwrap());

    cleanup(store.pool(), &[&alice, &bob]).await;
    std::fs::remove_file(path).unwrap();
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_import_fail_fast_keeps_earlier_rows() {
    let store = test_store().await;
    let alice = random_cpf();
    let bob = random_cpf();
    let input = format!(
        "cpf_cnpj,name\n{alice},{}\n11144477736,Bad\n{bob},{}\n",
        unique_name("Alice"),
        unique_name("Bob"),
    );
    let rows = read_csv_rows(input.as_bytes()).unwrap();

    let err = import_rows(&store, &rows, FailurePolicy::FailFast)
        .await
        .unwrap_err();

    assert!(matches!(err, ImportError::Row { line: 3, .. }));
    assert_eq!(err.kind(), Some(ErrorKind::InvalidCpf));
    assert!(store.exists(alice.as_str()).await.unwrap());
    assert!(!store.exists(bob.as_str()).await.unwrap());

    cleanup(store.pool(), &[&alice, &bob]).await;
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_import_malformed_row_commits_nothing() {
    let store = test_store().await;
    let alice = random_cpf();
    let bob = random_cpf();
    let input = format!("cpf_cnpj,name\n{alice},Alice\nX\n{bob},Bob\n");
    let rows = read_csv_rows(input.as_bytes()).unwrap();

    for policy in [FailurePolicy::BestEffort, FailurePolicy::FailFast] {
        let err = import_rows(&store, &rows, policy).await.unwrap_err();
        assert!(matches!(
            err,
            ImportError::MalformedRow {
                row: 2,
                expected: 2,
                found: 1
            }
        ));
    }

    assert!(!store.exists(alice.as_str()).await.unwrap());
    assert!(!store.exists(bob.as_str()).await.unwrap());
}
