//! Skill event recording
//!
//! Writes skill events to the database inside an atomic transaction.
//! Approval-gated skills record a pending approval request instead of an
//! applied event. Recording is idempotent per
//! (project, skill, user, timestamp): a replayed event reports
//! already-recorded rather than failing.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use skillhub_common::{Error, Result};
use sqlx::SqlitePool;
use uuid::Uuid;

/// Approval parameters for one submission
///
/// Constructed once per submission from the presence of an approval
/// message in the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApprovalParams {
    /// No approval message supplied
    None,
    /// Message-bearing self-report approval request
    Message(String),
}

impl ApprovalParams {
    pub fn from_request(message: Option<&str>) -> Self {
        match message {
            Some(msg) => ApprovalParams::Message(msg.to_string()),
            None => ApprovalParams::None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            ApprovalParams::Message(msg) => Some(msg),
            ApprovalParams::None => None,
        }
    }
}

/// Outcome of one recording call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillEventResult {
    /// Whether the event was applied (earned points)
    pub skill_applied: bool,
    /// Points earned by this event
    pub points_earned: i64,
    /// User's cumulative points in the project after this event
    pub total_points: i64,
    /// Human-readable outcome description
    pub explanation: String,
}

/// Recording seam between the submission core and event storage
#[async_trait]
pub trait SkillRecorder: Send + Sync {
    async fn record(
        &self,
        project_id: &str,
        skill_id: &str,
        user_id: &str,
        notify_if_not_applied: bool,
        timestamp: Option<DateTime<Utc>>,
        approval: &ApprovalParams,
    ) -> Result<SkillEventResult>;
}

/// SQLite-backed skill recorder
pub struct SqliteSkillRecorder {
    db: SqlitePool,
}

impl SqliteSkillRecorder {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Cumulative applied points for a user within a project
    async fn total_points(
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        project_id: &str,
        user_id: &str,
    ) -> Result<i64> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(points), 0) FROM skill_events
             WHERE project_id = ? AND user_id = ?",
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_one(&mut **tx)
        .await?;

        Ok(total)
    }
}

#[async_trait]
impl SkillRecorder for SqliteSkillRecorder {
    async fn record(
        &self,
        project_id: &str,
        skill_id: &str,
        user_id: &str,
        notify_if_not_applied: bool,
        timestamp: Option<DateTime<Utc>>,
        approval: &ApprovalParams,
    ) -> Result<SkillEventResult> {
        let mut tx = self.db.begin().await?;

        let skill: Option<(String, i64, i64, Option<String>)> = sqlx::query_as(
            "SELECT name, point_increment, max_occurrences, self_report_type
             FROM skills WHERE project_id = ? AND skill_id = ?",
        )
        .bind(project_id)
        .bind(skill_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((skill_name, point_increment, max_occurrences, self_report_type)) = skill else {
            return Err(Error::skill_not_found(project_id, skill_id));
        };

        // Absent timestamp means "record at recording time"
        let event_time = timestamp.unwrap_or_else(Utc::now);
        let event_time_ms = event_time.timestamp_millis();

        // Approval-gated skill: queue a pending request instead of applying
        if self_report_type.as_deref() == Some("Approval") {
            let pending: bool = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM skill_approvals
                 WHERE project_id = ? AND skill_id = ? AND user_id = ? AND status = 'PENDING')",
            )
            .bind(project_id)
            .bind(skill_id)
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;

            let total_points = Self::total_points(&mut tx, project_id, user_id).await?;

            if pending {
                return Ok(SkillEventResult {
                    skill_applied: false,
                    points_earned: 0,
                    total_points,
                    explanation: format!(
                        "Skill [{}] was already submitted and is pending approval",
                        skill_name
                    ),
                });
            }

            sqlx::query(
                "INSERT INTO skill_approvals
                 (guid, project_id, skill_id, user_id, requested_at_ms, message, status)
                 VALUES (?, ?, ?, ?, ?, ?, 'PENDING')",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(project_id)
            .bind(skill_id)
            .bind(user_id)
            .bind(event_time_ms)
            .bind(approval.message())
            .execute(&mut *tx)
            .await?;

            tx.commit().await?;

            tracing::info!(
                project_id = %project_id,
                skill_id = %skill_id,
                user_id = %user_id,
                "Skill event queued for approval"
            );

            return Ok(SkillEventResult {
                skill_applied: false,
                points_earned: 0,
                total_points,
                explanation: format!("Skill [{}] was submitted for approval", skill_name),
            });
        }

        // Idempotent replay: an identical event was already recorded
        let already_recorded: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM skill_events
             WHERE project_id = ? AND skill_id = ? AND user_id = ? AND event_time_ms = ?)",
        )
        .bind(project_id)
        .bind(skill_id)
        .bind(user_id)
        .bind(event_time_ms)
        .fetch_one(&mut *tx)
        .await?;

        if already_recorded {
            let total_points = Self::total_points(&mut tx, project_id, user_id).await?;

            return Ok(SkillEventResult {
                skill_applied: false,
                points_earned: 0,
                total_points,
                explanation: "This skill event has already been recorded".to_string(),
            });
        }

        // Occurrence cap bounds applied events per user
        let applied_count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM skill_events
             WHERE project_id = ? AND skill_id = ? AND user_id = ? AND applied = 1",
        )
        .bind(project_id)
        .bind(skill_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        let (applied, points, explanation) = if applied_count >= max_occurrences {
            (
                false,
                0,
                format!("Skill [{}] has reached its maximum points", skill_name),
            )
        } else {
            (true, point_increment, "Skill event was applied".to_string())
        };

        sqlx::query(
            "INSERT INTO skill_events
             (guid, project_id, skill_id, user_id, event_time_ms, applied, points)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(project_id)
        .bind(skill_id)
        .bind(user_id)
        .bind(event_time_ms)
        .bind(applied)
        .bind(points)
        .execute(&mut *tx)
        .await?;

        let total_points = Self::total_points(&mut tx, project_id, user_id).await?;

        tx.commit().await?;

        if !applied && notify_if_not_applied {
            tracing::info!(
                project_id = %project_id,
                skill_id = %skill_id,
                user_id = %user_id,
                explanation = %explanation,
                "Skill event recorded but not applied"
            );
        }

        Ok(SkillEventResult {
            skill_applied: applied,
            points_earned: points,
            total_points,
            explanation,
        })
    }
}
