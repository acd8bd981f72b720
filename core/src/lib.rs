//! # OTP Ledger Core
//!
//! Core business logic and domain layer for the OTP ledger backend.
//! This crate contains the passcode entity and its lifecycle rules, the
//! lifecycle service, repository interfaces for identity lookup and the
//! ledger store, and the error taxonomy shared by every layer.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use repositories::*;
pub use services::*;
