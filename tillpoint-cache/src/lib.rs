//! # Tillpoint Cache
//!
//! Local product cache for the Tillpoint point-of-sale client.
//!
//! Products synchronized from the backend are kept in a small SQLite database
//! so barcode lookup keeps working while the register is offline. The cache
//! is a plain keyed upsert/lookup store where the last write wins; there is
//! no eviction policy.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tillpoint_cache::ProductCache;
//!
//! let cache = ProductCache::open("/var/lib/tillpoint/products.db")?;
//! if let Some(product) = cache.find_by_barcode("074312038228")? {
//!     println!("{} @ {}", product.name, product.unit_price);
//! }
//! ```

mod cache;
mod error;

pub use cache::ProductCache;
pub use error::CacheError;
