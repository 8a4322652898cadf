//! Client registry server library.
//!
//! CPF/CNPJ client registry: a `PostgreSQL`-backed client store that
//! enforces identifier uniqueness, a CSV bulk loader and the JSON HTTP API.
//! Exposed as a library so the CLI and integration tests can reuse it.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod import;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
