//! Stationery storefront client runtime.
//!
//! Holds the shopper's cart in a key-value storage scope so it survives
//! restarts, talks JSON to the storefront server API, and debounces
//! search-box input into product search requests.
//!
//! [`state::StorefrontContext`] wires these together for one session.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod alerts;
pub mod api;
pub mod cart;
pub mod config;
pub mod error;
pub mod search;
pub mod state;
pub mod storage;

#[cfg(test)]
mod test_support;
