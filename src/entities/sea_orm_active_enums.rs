//! Enumerations stored as integer columns.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One of the three meal slots of a day.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
#[serde(rename_all = "snake_case")]
pub enum MealSlot {
    /// Morning meal
    #[sea_orm(num_value = 0)]
    Breakfast,
    /// Midday meal
    #[sea_orm(num_value = 1)]
    Lunch,
    /// Evening meal
    #[sea_orm(num_value = 2)]
    Dinner,
}

impl MealSlot {
    /// All slots in day order.
    pub const ALL: [Self; 3] = [Self::Breakfast, Self::Lunch, Self::Dinner];

    /// Stable lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Breakfast => "breakfast",
            Self::Lunch => "lunch",
            Self::Dinner => "dinner",
        }
    }
}

impl std::fmt::Display for MealSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of a modification request. `Approved` and `Rejected` are terminal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    /// Waiting for an administrator decision
    #[sea_orm(num_value = 0)]
    Pending,
    /// Accepted; the month was unlocked
    #[sea_orm(num_value = 1)]
    Approved,
    /// Refused; no side effect
    #[sea_orm(num_value = 2)]
    Rejected,
}

impl RequestStatus {
    /// Whether no further transition is allowed.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Stable lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
