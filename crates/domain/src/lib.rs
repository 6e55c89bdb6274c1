//! # CardIssue Domain
//!
//! Business domain types for the staff ID card issuance client.
//!
//! This crate contains:
//! - Domain error type and Result definition
//! - Client configuration structures
//! - Backend data transfer types (employees, cards, issue history)
//! - Endpoint and storage-key constants
//!
//! ## Architecture
//! - No dependencies on other CardIssue crates
//! - Only external dependencies allowed
//! - Pure data structures, no I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
