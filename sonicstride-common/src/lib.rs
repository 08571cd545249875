//! # Sonicstride Common Library
//!
//! Shared code for the Sonicstride authoring backend:
//! - Database schema, models and entity repositories
//! - Relationship lookups across configs, tracks, events and actions
//! - Filesystem asset store for uploaded audio
//! - Configuration loading
//! - Field validation (genre/scene vocabularies, track identifiers)

pub mod assets;
pub mod config;
pub mod db;
pub mod error;
pub mod validation;

pub use assets::{AssetStore, StoredAsset};
pub use error::{Error, Result};
