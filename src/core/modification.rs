//! Modification requests against submitted calendars.
//!
//! A team lead files a request once the team's month is submitted. An administrator then
//! approves it, which unlocks every row of that team and month, or rejects it with no
//! effect on the calendar. Both decisions are terminal.

use crate::{
    core::{calendar, period::MonthKey, period::date_key},
    entities::{ModificationRequest, RequestStatus, modification_request},
    errors::{Error, Result},
};
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

/// Data needed to file a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewModificationRequest {
    /// Team whose calendar is locked
    pub team_id: i64,
    /// Id of the requesting user
    pub requester_id: i64,
    /// Display name of the requesting user
    pub requester_name: String,
    /// Locked month
    pub month: MonthKey,
    /// Justification
    pub reason: String,
    /// Day concerned, for day-scoped requests
    pub date: Option<NaiveDate>,
    /// Proposed headcount, for headcount-scoped requests
    pub proposed_headcount: Option<u32>,
}

/// Administrator's verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    /// Unlock the month
    Approve,
    /// Leave the month locked
    Reject,
}

impl Decision {
    const fn status(self) -> RequestStatus {
        match self {
            Self::Approve => RequestStatus::Approved,
            Self::Reject => RequestStatus::Rejected,
        }
    }
}

/// A team and month pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMonth {
    /// Team id
    pub team_id: i64,
    /// Month
    pub month: MonthKey,
}

/// Result of deciding a request: the updated request, and the calendar to unlock if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionOutcome {
    /// Request with its new status, decision time and comment
    pub request: modification_request::Model,
    /// Set when the decision unlocks a calendar
    pub unlocked: Option<TeamMonth>,
}

/// Applies a decision to a pending request.
///
/// # Errors
/// Returns `StateViolation` when the request is already approved or rejected, and
/// `InvalidKey` when its month key is malformed.
pub fn decide(
    request: modification_request::Model,
    decision: Decision,
    comment: Option<String>,
    now: DateTime<Utc>,
) -> Result<DecisionOutcome> {
    if request.status.is_terminal() {
        return Err(Error::StateViolation {
            message: format!("request {} is already {}", request.id, request.status),
        });
    }

    let unlocked = match decision {
        Decision::Approve => Some(TeamMonth {
            team_id: request.team_id,
            month: request.month_key.parse()?,
        }),
        Decision::Reject => None,
    };

    Ok(DecisionOutcome {
        request: modification_request::Model {
            status: decision.status(),
            decided_at: Some(now),
            admin_comment: comment,
            ..request
        },
        unlocked,
    })
}

/// Files a request for a submitted month.
///
/// Callers should check [`has_pending_request`] first; duplicates are not blocked here.
///
/// # Errors
/// Returns `StateViolation` when the month is not submitted.
#[instrument(skip(db, new), fields(team_id = new.team_id, month = %new.month))]
pub async fn create_request(
    db: &DatabaseConnection,
    new: NewModificationRequest,
) -> Result<modification_request::Model> {
    if !calendar::is_calendar_submitted(db, new.team_id, new.month).await? {
        return Err(Error::StateViolation {
            message: format!(
                "calendar {} of team {} is not submitted",
                new.month, new.team_id
            ),
        });
    }

    let request = modification_request::ActiveModel {
        team_id: Set(new.team_id),
        requester_id: Set(new.requester_id),
        requester_name: Set(new.requester_name),
        month_key: Set(new.month.to_string()),
        reason: Set(new.reason),
        date_key: Set(new.date.map(date_key)),
        proposed_headcount: Set(new.proposed_headcount.map(i64::from)),
        status: Set(RequestStatus::Pending),
        created_at: Set(Utc::now()),
        decided_at: Set(None),
        admin_comment: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!("Filed modification request {}", request.id);
    Ok(request)
}

/// Records a decision and, on approval, unlocks the calendar in the same transaction.
///
/// # Errors
/// Returns `RequestNotFound` for an unknown id and `StateViolation` for a decided request.
#[instrument(skip(db, comment))]
pub async fn decide_request(
    db: &DatabaseConnection,
    request_id: i64,
    decision: Decision,
    comment: Option<String>,
) -> Result<DecisionOutcome> {
    let txn = db.begin().await?;

    let request = ModificationRequest::find_by_id(request_id)
        .one(&txn)
        .await?
        .ok_or(Error::RequestNotFound { id: request_id })?;
    let outcome = decide(request.clone(), decision, comment, Utc::now())?;

    let mut model: modification_request::ActiveModel = request.into();
    model.status = Set(outcome.request.status);
    model.decided_at = Set(outcome.request.decided_at);
    model.admin_comment = Set(outcome.request.admin_comment.clone());
    let request = model.update(&txn).await?;

    if let Some(target) = outcome.unlocked {
        let rows = calendar::unlock_calendar(&txn, target.team_id, target.month).await?;
        info!(
            "Unlocked {} rows of {} for team {}",
            rows, target.month, target.team_id
        );
    }

    txn.commit().await?;
    info!("Request {} is now {}", request.id, request.status);
    Ok(DecisionOutcome {
        request,
        unlocked: outcome.unlocked,
    })
}

/// Whether a pending request exists for a team and month.
pub async fn has_pending_request(
    db: &DatabaseConnection,
    team_id: i64,
    month: MonthKey,
) -> Result<bool> {
    let count = ModificationRequest::find()
        .filter(modification_request::Column::TeamId.eq(team_id))
        .filter(modification_request::Column::MonthKey.eq(month.to_string()))
        .filter(modification_request::Column::Status.eq(RequestStatus::Pending))
        .count(db)
        .await?;
    Ok(count > 0)
}

/// Pending requests of every team, oldest first.
pub async fn get_pending_requests(
    db: &DatabaseConnection,
) -> Result<Vec<modification_request::Model>> {
    ModificationRequest::find()
        .filter(modification_request::Column::Status.eq(RequestStatus::Pending))
        .order_by_asc(modification_request::Column::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Every request of a team, newest first.
pub async fn get_team_requests(
    db: &DatabaseConnection,
    team_id: i64,
) -> Result<Vec<modification_request::Model>> {
    ModificationRequest::find()
        .filter(modification_request::Column::TeamId.eq(team_id))
        .order_by_desc(modification_request::Column::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a request by id.
pub async fn get_request_by_id(
    db: &DatabaseConnection,
    request_id: i64,
) -> Result<Option<modification_request::Model>> {
    ModificationRequest::find_by_id(request_id)
        .one(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{
        core::calendar::{HeadcountUpdate, get_daily_need_row, set_daily_need, submit_calendar},
        test_utils::*,
    };

    fn pending() -> modification_request::Model {
        modification_request::Model {
            id: 1,
            team_id: 3,
            requester_id: 10,
            requester_name: "Lead".to_string(),
            month_key: "2025-12".to_string(),
            reason: "Headcount changed".to_string(),
            date_key: None,
            proposed_headcount: None,
            status: RequestStatus::Pending,
            created_at: Utc::now(),
            decided_at: None,
            admin_comment: None,
        }
    }

    fn new_request(team_id: i64, month: MonthKey) -> NewModificationRequest {
        NewModificationRequest {
            team_id,
            requester_id: 10,
            requester_name: "Lead".to_string(),
            month,
            reason: "Two more people arrive".to_string(),
            date: Some(month.first_day()),
            proposed_headcount: Some(12),
        }
    }

    #[test]
    fn test_decide_approve_unlocks_team_month() {
        let outcome = decide(pending(), Decision::Approve, Some("ok".into()), Utc::now()).unwrap();
        assert_eq!(outcome.request.status, RequestStatus::Approved);
        assert!(outcome.request.decided_at.is_some());
        assert_eq!(outcome.request.admin_comment.as_deref(), Some("ok"));
        assert_eq!(
            outcome.unlocked,
            Some(TeamMonth {
                team_id: 3,
                month: MonthKey::new(2025, 12).unwrap(),
            })
        );
    }

    #[test]
    fn test_decide_reject_has_no_side_effect() {
        let outcome = decide(pending(), Decision::Reject, None, Utc::now()).unwrap();
        assert_eq!(outcome.request.status, RequestStatus::Rejected);
        assert!(outcome.unlocked.is_none());
    }

    #[test]
    fn test_decide_terminal_request_is_rejected() {
        let decided = decide(pending(), Decision::Reject, None, Utc::now())
            .unwrap()
            .request;
        let result = decide(decided, Decision::Approve, None, Utc::now());
        assert!(matches!(result.unwrap_err(), Error::StateViolation { .. }));
    }

    #[tokio::test]
    async fn test_create_request_requires_submitted_month() -> Result<()> {
        let (db, team) = setup_with_team().await?;
        let month: MonthKey = "2025-12".parse()?;

        let result = create_request(&db, new_request(team.id, month)).await;
        assert!(matches!(result.unwrap_err(), Error::StateViolation { .. }));

        set_daily_need(&db, team.id, month.first_day(), HeadcountUpdate::all(10)).await?;
        let result = create_request(&db, new_request(team.id, month)).await;
        assert!(matches!(result.unwrap_err(), Error::StateViolation { .. }));

        submit_calendar(&db, team.id, month).await?;
        assert!(!has_pending_request(&db, team.id, month).await?);
        let request = create_request(&db, new_request(team.id, month)).await?;
        assert_eq!(request.status, RequestStatus::Pending);
        assert_eq!(request.date_key.as_deref(), Some("2025-12-01"));
        assert_eq!(request.proposed_headcount, Some(12));
        assert!(has_pending_request(&db, team.id, month).await?);

        // Filing a request does not touch the calendar.
        assert!(calendar::is_calendar_submitted(&db, team.id, month).await?);

        Ok(())
    }

    #[tokio::test]
    async fn test_approval_unlocks_only_that_team_month() -> Result<()> {
        let (db, team) = setup_with_team().await?;
        let other = create_test_team(&db, team.locality_id, "Other team", 8).await?;
        let december: MonthKey = "2025-12".parse()?;
        let january: MonthKey = "2026-01".parse()?;

        for (team_id, month) in [(team.id, december), (team.id, january), (other.id, december)] {
            set_daily_need(&db, team_id, month.first_day(), HeadcountUpdate::all(5)).await?;
            submit_calendar(&db, team_id, month).await?;
        }

        let request = create_request(&db, new_request(team.id, december)).await?;
        let outcome =
            decide_request(&db, request.id, Decision::Approve, Some("granted".into())).await?;
        assert_eq!(outcome.request.status, RequestStatus::Approved);
        assert!(outcome.unlocked.is_some());

        assert!(!calendar::is_calendar_submitted(&db, team.id, december).await?);
        assert!(calendar::is_calendar_submitted(&db, team.id, january).await?);
        assert!(calendar::is_calendar_submitted(&db, other.id, december).await?);

        let row = get_daily_need_row(&db, team.id, december.first_day())
            .await?
            .unwrap();
        assert!(row.submitted_at.is_some());

        let stored = get_request_by_id(&db, request.id).await?.unwrap();
        assert_eq!(stored.admin_comment.as_deref(), Some("granted"));
        assert!(!has_pending_request(&db, team.id, december).await?);

        let again = decide_request(&db, request.id, Decision::Reject, None).await;
        assert!(matches!(again.unwrap_err(), Error::StateViolation { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_rejection_keeps_calendar_locked() -> Result<()> {
        let (db, team) = setup_with_team().await?;
        let month: MonthKey = "2025-12".parse()?;
        set_daily_need(&db, team.id, month.first_day(), HeadcountUpdate::all(5)).await?;
        submit_calendar(&db, team.id, month).await?;

        let request = create_request(&db, new_request(team.id, month)).await?;
        assert_eq!(get_pending_requests(&db).await?.len(), 1);

        let outcome = decide_request(&db, request.id, Decision::Reject, None).await?;
        assert_eq!(outcome.request.status, RequestStatus::Rejected);
        assert!(outcome.unlocked.is_none());
        assert!(calendar::is_calendar_submitted(&db, team.id, month).await?);
        assert!(get_pending_requests(&db).await?.is_empty());
        assert_eq!(get_team_requests(&db, team.id).await?.len(), 1);

        let missing = decide_request(&db, 404, Decision::Approve, None).await;
        assert!(matches!(
            missing.unwrap_err(),
            Error::RequestNotFound { id: 404 }
        ));

        Ok(())
    }
}
