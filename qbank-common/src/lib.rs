//! # Question Bank Common Library
//!
//! Shared code for the question bank tools:
//! - Error type
//! - Bootstrap configuration loading
//! - Topic taxonomy lookup
//! - Canonical question model
//! - Database schema initialization

pub mod config;
#[cfg(feature = "sqlx")]
pub mod db;
pub mod error;
pub mod question;
pub mod taxonomy;

pub use error::{Error, Result};
pub use taxonomy::{StaticTaxonomy, TaxonomyService, Topic};
