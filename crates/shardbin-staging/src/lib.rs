//! Staging store and catalog contracts.
//!
//! The staging store is the single source of truth during a chunked upload:
//! a key-value store with per-key TTL holding session records and raw chunk
//! bytes until completion or expiry. The catalog is the permanent metadata
//! collaborator that receives exactly one record per committed file.
//!
//! # Key layout
//!
//! - Session record: `upload:{session_id}`
//! - Chunk blob: `chunk:{session_id}:{index}`
//!
//! Key generation is centralized in the `keys` module so the ingestor and the
//! completion engine stay consistent.

pub mod catalog;
pub mod keys;
pub mod memory;
pub mod traits;

pub use catalog::{Catalog, CatalogError, CatalogResult, MemoryCatalog};
pub use memory::MemoryStagingStore;
pub use traits::{StagingError, StagingResult, StagingStore};
