//! In-memory [`ClientStore`] used by unit tests.

#![allow(clippy::unwrap_used)]

use std::sync::Mutex;

use async_trait::async_trait;

use client_registry_core::{ClientId, TaxId};

use super::{ClientStore, StoreError};
use crate::models::{Client, NewClient};

/// Vector-backed store with the same uniqueness semantics as the `PostgreSQL`
/// store: a pre-check, then a re-check under the lock standing in for the
/// unique constraint.
#[derive(Debug, Default)]
pub struct MemoryClientStore {
    clients: Mutex<Vec<Client>>,
    unavailable: bool,
}

impl MemoryClientStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store whose every operation fails with `StoreUnavailable`.
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            clients: Mutex::default(),
            unavailable: true,
        }
    }

    /// Number of stored clients.
    pub fn len(&self) -> usize {
        self.clients.lock().unwrap().len()
    }

    fn check_available(&self, operation: &'static str) -> Result<(), StoreError> {
        if self.unavailable {
            return Err(StoreError::Unavailable {
                operation,
                source: sqlx::Error::PoolTimedOut,
            });
        }
        Ok(())
    }

    fn sorted(mut clients: Vec<Client>) -> Vec<Client> {
        clients.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.as_i32().cmp(&b.id.as_i32())));
        clients
    }
}

#[async_trait]
impl ClientStore for MemoryClientStore {
    async fn get_all(&self) -> Result<Vec<Client>, StoreError> {
        self.check_available("get all clients")?;
        let clients = self.clients.lock().unwrap().clone();
        Ok(Self::sorted(clients))
    }

    async fn get_by_name(&self, name: &str) -> Result<Vec<Client>, StoreError> {
        self.check_available("get clients by name")?;
        let needle = name.to_lowercase();
        let clients = self
            .clients
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.name.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        Ok(Self::sorted(clients))
    }

    async fn exists(&self, tax_id: &str) -> Result<bool, StoreError> {
        let tax_id = TaxId::parse(tax_id)?;
        self.check_available("check CPF/CNPJ existence")?;
        Ok(self
            .clients
            .lock()
            .unwrap()
            .iter()
            .any(|c| c.tax_id == tax_id))
    }

    async fn insert(&self, client: &NewClient) -> Result<Client, StoreError> {
        if self.exists(&client.tax_id).await? {
            return Err(StoreError::DuplicateTaxId);
        }
        let tax_id = TaxId::parse(&client.tax_id)?;

        // Yield so concurrent inserts can interleave between check and write.
        tokio::task::yield_now().await;

        let mut clients = self.clients.lock().unwrap();
        if clients.iter().any(|c| c.tax_id == tax_id) {
            return Err(StoreError::DuplicateTaxId);
        }
        let next_id = i32::try_from(clients.len()).unwrap() + 1;
        let created = Client {
            id: ClientId::new(next_id),
            name: client.name.clone(),
            tax_id,
            blocklist: client.blocklist,
        };
        clients.push(created.clone());
        Ok(created)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.check_available("ping database")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ErrorKind;

    #[tokio::test]
    async fn test_insert_then_exists() {
        let store = MemoryClientStore::new();
        store
            .insert(&NewClient::new("Alice", "11144477735"))
            .await
            .unwrap();

        assert!(store.exists("11144477735").await.unwrap());
        assert!(store.exists("111.444.777-35").await.unwrap());
        assert!(!store.exists("52998224725").await.unwrap());
    }

    #[tokio::test]
    async fn test_exists_propagates_validation_error() {
        let store = MemoryClientStore::new();
        let err = store.exists("00000000000").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidCpf);

        let err = store.exists("123").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidLength);
    }

    #[tokio::test]
    async fn test_duplicate_insert_rejected_and_size_unchanged() {
        let store = MemoryClientStore::new();
        store
            .insert(&NewClient::new("Alice", "11144477735"))
            .await
            .unwrap();

        let err = store
            .insert(&NewClient::new("Someone Else", "111.444.777-35"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateTaxId);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_inserts_exactly_one_wins() {
        let store = MemoryClientStore::new();
        let a = NewClient::new("A", "52998224725");
        let b = NewClient::new("B", "52998224725");

        let (ra, rb) = tokio::join!(store.insert(&a), store.insert(&b));

        let outcomes = [ra, rb];
        let committed = outcomes.iter().filter(|r| r.is_ok()).count();
        let duplicates = outcomes
            .iter()
            .filter(|r| matches!(r, Err(StoreError::DuplicateTaxId)))
            .count();
        assert_eq!(committed, 1);
        assert_eq!(duplicates, 1);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_get_by_name_case_insensitive() {
        let store = MemoryClientStore::new();
        store
            .insert(&NewClient::new("John Doe", "11144477735"))
            .await
            .unwrap();
        store
            .insert(&NewClient::new("Ann 100% Real", "52998224725"))
            .await
            .unwrap();

        let found = store.get_by_name("john").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found.first().unwrap().name, "John Doe");

        assert!(store.get_by_name("zzz").await.unwrap().is_empty());
        assert_eq!(store.get_by_name("100%").await.unwrap().len(), 1);
        assert_eq!(store.get_by_name("").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_get_all_ordered_by_name() {
        let store = MemoryClientStore::new();
        for (name, tax_id) in [
            ("Carla", "11144477735"),
            ("Alice", "52998224725"),
            ("Bruno", "11222333000181"),
        ] {
            store.insert(&NewClient::new(name, tax_id)).await.unwrap();
        }

        let names: Vec<_> = store
            .get_all()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, ["Alice", "Bruno", "Carla"]);
    }
}
