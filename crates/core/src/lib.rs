//! Client Registry Core - Shared types library.
//!
//! This crate provides the domain types used across the client registry:
//! - `server` - HTTP service and client store
//! - `cli` - Command-line bulk import
//!
//! # Architecture
//!
//! The core crate contains only types and pure validation - no I/O, no
//! database access, no HTTP. Database encoding for the types is available
//! behind the `postgres` feature.
//!
//! # Modules
//!
//! - [`types`] - Tax identifier (CPF/CNPJ) validation and type-safe IDs

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
