//! # Tillpoint API
//!
//! Authenticated HTTP access to the Tillpoint backend.
//!
//! The centerpiece is [`ApiClient`], which issues requests with the stored
//! bearer token and transparently recovers from an expired one: a `401`
//! triggers exactly one refresh-token exchange and one retry of the original
//! request. Everything else (other error statuses, transport failures) is
//! surfaced to the caller untouched.
//!
//! On top of the pipeline sit typed wrappers for the endpoints the register
//! uses: login, product listing and barcode lookup, sale submission, and the
//! cash-register session calls.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tillpoint_api::ApiClient;
//! use tillpoint_core::FileStore;
//!
//! let store = Arc::new(FileStore::new("/var/lib/tillpoint"));
//! let client = ApiClient::new("http://localhost:8000/api", store)?;
//!
//! client.login("cashier@example.com", "secret").await?;
//! let page = client.list_products().await?;
//! ```

mod auth;
mod client;
mod endpoints;
mod error;
mod sync;

pub use client::{ApiClient, RequestBody};
pub use error::ApiError;
pub use sync::{SyncError, sync_all_products};

// Re-exported so callers can drive `execute` without importing reqwest.
pub use reqwest::{Method, Response, StatusCode};
