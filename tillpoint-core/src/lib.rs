//! # Tillpoint Core
//!
//! Core library for the Tillpoint point-of-sale client.
//!
//! This crate provides:
//! - Domain types for products, sales, and cash-register state
//! - The credential store abstraction (host, access token, refresh token)
//! - File-backed, in-memory, and (optionally) keyring-backed store backends
//! - Client configuration loading
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tillpoint_core::{CredentialKey, CredentialStore, FileStore, Secret};
//!
//! async fn remember_host(store: &impl CredentialStore) -> Result<(), tillpoint_core::StoreError> {
//!     store.set(CredentialKey::Host, &Secret::new("shop.api.localhost")).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod model;
pub mod store;

// Re-export commonly used types at crate root
pub use config::{ClientConfig, load_config};

pub use model::{
    CashRegisterStatus,
    Product,
    ProductPage,
    SaleDraft,
    SaleError,
    SaleItem,
    SessionTokens,
};

pub use store::{
    CredentialKey,
    CredentialStore,
    FileStore,
    MemoryStore,
    Secret,
    StoreError,
    create_store,
};

#[cfg(feature = "keyring-store")]
pub use store::KeyringStore;
