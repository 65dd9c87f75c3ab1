//! qbank-import library interface
//!
//! Imports legacy quiz-plugin exports into the question bank: loads the
//! export and its category spreadsheet, gates on category coverage, then
//! validates, transforms and (in live mode) persists each question.

pub mod config;
pub mod db;
pub mod error;
pub mod loaders;
pub mod models;
pub mod services;

pub use crate::error::{ImportError, Result};
