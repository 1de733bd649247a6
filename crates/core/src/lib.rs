//! Stationery Core - Shared types library.
//!
//! This crate provides the types shared by the storefront client library
//! and the `st-cli` command-line tool.
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no storage
//! access, no HTTP clients. This keeps it lightweight and allows it to be used
//! anywhere, including targets without a filesystem.
//!
//! # Modules
//!
//! - [`types`] - Product IDs, prices, cart line items and the cart itself

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
