//! Shoe Store Core - Shared domain types.
//!
//! This crate provides the types shared by every Shoe Store component:
//! - `api` - The REST backend
//! - `cli` - Migrations, seeding and user management
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP
//! clients. Database encode/decode support is opt-in via the `postgres`
//! feature.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, emails, money and status enums

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
