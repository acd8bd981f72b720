//! Database module - MySQL implementations using SQLx
//!
//! This module provides the database access layer:
//! - Connection pool management and health checks
//! - Identity and ledger repositories
//! - Embedded schema migrations (`infra/migrations`)

pub mod connection;
pub mod mysql;


// Re-export commonly used types
pub use connection::{DatabasePool, PoolStatistics};
pub use mysql::{MySqlIdentityRepository, MySqlOtpLedgerRepository};
