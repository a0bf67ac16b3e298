//! Modification request entity - A team lead's request to unlock a submitted month.
//!
//! References its team by id only; the request does not own the team.

use super::sea_orm_active_enums::RequestStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Modification request database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "modification_requests")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Team whose calendar is concerned
    pub team_id: i64,
    /// Id of the requesting user
    pub requester_id: i64,
    /// Display name of the requesting user
    pub requester_name: String,
    /// Locked month, `YYYY-MM`
    pub month_key: String,
    /// Free-text justification
    pub reason: String,
    /// Specific day concerned, `YYYY-MM-DD`
    pub date_key: Option<String>,
    /// Proposed new headcount
    pub proposed_headcount: Option<i64>,
    /// Workflow status
    pub status: RequestStatus,
    /// When the request was filed
    pub created_at: DateTimeUtc,
    /// When an administrator decided
    pub decided_at: Option<DateTimeUtc>,
    /// Administrator's comment
    pub admin_comment: Option<String>,
}

/// `ModificationRequest` has no declared relationships
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
