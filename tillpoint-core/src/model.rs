//! Domain model types for the Tillpoint client.
//!
//! This module defines the wire and domain types shared across the workspace:
//! - [`Product`] - A catalog item, as served by the backend and cached locally
//! - [`ProductPage`] - The `/products` listing envelope
//! - [`SaleItem`] / [`SaleDraft`] - A sale under construction
//! - [`SessionTokens`] - The access/refresh pair returned by login and refresh
//! - [`CashRegisterStatus`] - The `/cash-register/status` payload

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::Secret;

/// A catalog product.
///
/// `id` is the backend identifier used when submitting sales; `barcode` is
/// what the cashier scans or types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    #[serde(default)]
    pub barcode: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub unit_price: f64,
}

/// One page of the `/products` listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductPage {
    #[serde(default)]
    pub items: Vec<Product>,
    #[serde(default)]
    pub total: u64,
}

/// A single line of a sale: which product, and how many units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleItem {
    pub product_id: i64,
    pub quantity: u32,
}

/// Error raised when a sale draft fails local validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SaleError {
    /// A sale must contain at least one item.
    #[error("a sale must contain at least one item")]
    EmptyItems,

    /// Every line must carry at least one unit.
    #[error("item for product {product_id} has zero quantity")]
    ZeroQuantity { product_id: i64 },
}

/// A validated sale ready for submission.
///
/// Construction enforces the caller-side checks the backend would otherwise
/// reject: a draft is never empty and never carries a zero-quantity line, so
/// no network call is wasted on an invalid sale.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaleDraft {
    items: Vec<SaleItem>,
}

impl SaleDraft {
    /// Validate the given items into a submittable draft.
    pub fn new(items: Vec<SaleItem>) -> Result<Self, SaleError> {
        if items.is_empty() {
            return Err(SaleError::EmptyItems);
        }
        if let Some(item) = items.iter().find(|item| item.quantity == 0) {
            return Err(SaleError::ZeroQuantity {
                product_id: item.product_id,
            });
        }
        Ok(Self { items })
    }

    /// The validated sale lines.
    pub fn items(&self) -> &[SaleItem] {
        &self.items
    }
}

/// The token pair handed out by `/auth/login` and `/auth/refresh`.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionTokens {
    pub access_token: Secret,
    pub refresh_token: Secret,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// The `/cash-register/status` payload.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct CashRegisterStatus {
    #[serde(default)]
    pub is_open: bool,
}
