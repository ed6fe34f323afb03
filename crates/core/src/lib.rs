//! Sales Dashboard Core - Shared domain types.
//!
//! This crate provides the types used across all sales dashboard components:
//! - `dashboard` - Read-only reporting web UI
//! - `cli` - Command-line status check and CSV export
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! database access, no HTTP. Rows fetched by the data access layer are
//! materialized into these types before any reporting happens.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, sales entities, money, age rules and navigation views

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
