//! Core types for the client registry.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod tax_id;

pub use id::*;
pub use tax_id::{TaxId, TaxIdError, TaxIdKind};
