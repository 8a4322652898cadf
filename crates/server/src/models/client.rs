//! Client record types.

use serde::{Deserialize, Serialize};

use client_registry_core::{ClientId, TaxId};

/// A stored client.
///
/// Clients are created once and never updated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Client {
    /// Store-assigned identifier.
    pub id: ClientId,
    /// Free-text display name (not validated).
    pub name: String,
    /// Normalized, digits-only CPF or CNPJ. Unique across all clients.
    #[serde(rename = "cpf_cnpj")]
    #[sqlx(rename = "cpf_cnpj")]
    pub tax_id: TaxId,
    /// Whether the client is blocklisted.
    pub blocklist: bool,
}

/// Input for creating a client.
///
/// `tax_id` is the raw identifier as received; the store validates and
/// normalizes it before anything is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewClient {
    /// Display name.
    pub name: String,
    /// Raw CPF or CNPJ, optionally formatted.
    #[serde(rename = "cpf_cnpj")]
    pub tax_id: String,
    /// Whether the client is blocklisted.
    #[serde(default)]
    pub blocklist: bool,
}

impl NewClient {
    /// Create a non-blocklisted client input.
    pub fn new(name: impl Into<String>, tax_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tax_id: tax_id.into(),
            blocklist: false,
        }
    }
}
