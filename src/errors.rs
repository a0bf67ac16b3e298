//! Unified error type for the provisioning planner.
//!
//! Expected absence (a day without headcount overrides, a month without a menu plan) is never
//! an error. Catalog drift seen during aggregation is reported as skipped references, not here.

use thiserror::Error;

/// All failures surfaced by the library.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration file or environment problem
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description
        message: String,
    },

    /// A product field failed validation at creation or edit time
    #[error("Invalid product {field}: {value}")]
    InvalidProduct {
        /// Name of the rejected field
        field: &'static str,
        /// Rejected value, rendered for display
        value: String,
    },

    /// A team or locality failed validation
    #[error("Invalid team: {message}")]
    InvalidTeam {
        /// Human-readable description
        message: String,
    },

    /// Malformed `YYYY-MM` or `YYYY-MM-DD` key
    #[error("Invalid date or month key: '{key}'")]
    InvalidKey {
        /// The offending key
        key: String,
    },

    /// Product id unknown or soft-deleted
    #[error("Product not found: {id}")]
    ProductNotFound {
        /// Product id
        id: i64,
    },

    /// Team id unknown
    #[error("Team not found: {id}")]
    TeamNotFound {
        /// Team id
        id: i64,
    },

    /// Locality id unknown
    #[error("Locality not found: {id}")]
    LocalityNotFound {
        /// Locality id
        id: i64,
    },

    /// Modification request id unknown
    #[error("Modification request not found: {id}")]
    RequestNotFound {
        /// Request id
        id: i64,
    },

    /// Locality still referenced by teams
    #[error("Locality {id} still has {team_count} team(s) assigned")]
    LocalityInUse {
        /// Locality id
        id: i64,
        /// Number of dependent teams
        team_count: u64,
    },

    /// Operation not allowed in the current workflow state
    #[error("Operation rejected: {message}")]
    StateViolation {
        /// Human-readable description
        message: String,
    },

    /// Stored row cannot be mapped back into the domain model
    #[error("Corrupt record: {message}")]
    CorruptRecord {
        /// Human-readable description
        message: String,
    },

    /// Database error from `SeaORM`
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
