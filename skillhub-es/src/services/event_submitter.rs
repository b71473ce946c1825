//! Skill event submission orchestration
//!
//! One submission runs the validation checklist, resolves the effective
//! user, then wraps the recording call in a fixed-count retry loop.
//! Terminal failures are classified by error variant: an unknown-skill
//! failure triggers a best-effort invalid-skill report before the error
//! propagates; every other kind propagates without compensation.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use skillhub_common::{Error, Result};

use super::identity::{IdentityResolver, RequestIdentity};
use super::project_errors::InvalidSkillReporter;
use super::skill_recorder::{ApprovalParams, SkillEventResult, SkillRecorder};

/// Total recording attempts per submission (3 attempts, not 3 retries)
pub const MAX_RECORD_ATTEMPTS: u32 = 3;

/// Forward clock-drift allowance for caller-supplied timestamps
pub const CLOCK_DRIFT_TOLERANCE_MS: i64 = 30_000;

/// Event-specific data supplied with a submission; every field optional
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SkillEventRequest {
    /// Report on behalf of this user instead of the caller
    pub user_id: Option<String>,
    /// Event time in epoch milliseconds; absent, zero, or negative means
    /// "use recording time"
    pub timestamp: Option<i64>,
    /// Request a notification when the event is recorded but not applied
    pub notify_if_skill_not_applied: Option<bool>,
    /// Advisory flag set by clients replaying a failed submission
    pub is_retry: Option<bool>,
    /// Message accompanying a self-report approval request
    pub approval_requested_msg: Option<String>,
}

/// Runtime limits read once per submission and passed in explicitly
#[derive(Debug, Clone, Copy)]
pub struct SubmitLimits {
    pub max_self_report_message_length: usize,
}

/// Submission orchestrator
///
/// Holds no per-submission state; every call constructs its context from
/// scratch, so concurrent submissions never interfere.
pub struct EventSubmitter {
    recorder: Arc<dyn SkillRecorder>,
    identity: Arc<dyn IdentityResolver>,
    project_errors: Arc<dyn InvalidSkillReporter>,
}

impl EventSubmitter {
    pub fn new(
        recorder: Arc<dyn SkillRecorder>,
        identity: Arc<dyn IdentityResolver>,
        project_errors: Arc<dyn InvalidSkillReporter>,
    ) -> Self {
        Self {
            recorder,
            identity,
            project_errors,
        }
    }

    /// Submit one skill event end-to-end
    pub async fn submit(
        &self,
        project_id: &str,
        skill_id: &str,
        identity: &RequestIdentity,
        request: Option<&SkillEventRequest>,
        limits: SubmitLimits,
    ) -> Result<SkillEventResult> {
        let requested_user_id = request.and_then(|r| r.user_id.as_deref());
        let requested_timestamp = request.and_then(|r| r.timestamp);
        let notify_if_not_applied = request
            .and_then(|r| r.notify_if_skill_not_applied)
            .unwrap_or(false);
        let is_retry = request.and_then(|r| r.is_retry).unwrap_or(false);
        let approval_msg = request.and_then(|r| r.approval_requested_msg.as_deref());

        // A null, zero, or negative timestamp means "not supplied" and the
        // event is recorded at recording time instead.
        let mut event_time: Option<DateTime<Utc>> = None;
        if let Some(ts) = requested_timestamp {
            if ts > 0 {
                // account for some possible clock drift
                let now_ms = Utc::now().timestamp_millis();
                if ts > now_ms + CLOCK_DRIFT_TOLERANCE_MS {
                    return Err(Error::validation(
                        project_id,
                        skill_id,
                        "skill events may not be in the future",
                    ));
                }
                event_time = Some(DateTime::from_timestamp_millis(ts).ok_or_else(|| {
                    Error::Internal(format!("timestamp {} out of representable range", ts))
                })?);
            }
        }

        if let Some(msg) = approval_msg {
            let msg_length = msg.chars().count();
            if msg_length > limits.max_self_report_message_length {
                return Err(Error::validation(
                    project_id,
                    skill_id,
                    format!(
                        "message has length of {}, maximum allowed length is {}",
                        msg_length, limits.max_self_report_message_length
                    ),
                ));
            }
        }

        let user_id = self
            .identity
            .resolve(identity, requested_user_id, false)
            .await?;

        tracing::info!(
            project_id = %project_id,
            skill_id = %skill_id,
            current_user = %identity.caller_label(),
            requested_user = ?requested_user_id,
            requested_timestamp = ?requested_timestamp,
            is_retry,
            "Reporting skill event"
        );

        let approval = ApprovalParams::from_request(approval_msg);

        let started = Instant::now();
        let outcome = self
            .record_with_retry(
                project_id,
                skill_id,
                &user_id,
                notify_if_not_applied,
                event_time,
                &approval,
            )
            .await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match outcome {
            Ok(result) => {
                tracing::info!(
                    project_id = %project_id,
                    skill_id = %skill_id,
                    user_id = %user_id,
                    skill_applied = result.skill_applied,
                    elapsed_ms,
                    "Skill event recorded"
                );
                Ok(result)
            }
            Err(err) => {
                if let Error::SkillNotFound {
                    project_id,
                    skill_id,
                } = &err
                {
                    // Best-effort: a failed report must not mask the
                    // classified error being propagated.
                    if let Err(report_err) = self
                        .project_errors
                        .report_invalid_skill(project_id, skill_id)
                        .await
                    {
                        tracing::warn!(
                            project_id = %project_id,
                            skill_id = %skill_id,
                            error = %report_err,
                            "Failed to record invalid skill report"
                        );
                    }
                }

                tracing::warn!(
                    project_id = %project_id,
                    skill_id = %skill_id,
                    elapsed_ms,
                    error = %err,
                    "Skill event submission failed"
                );
                Err(err)
            }
        }
    }

    /// Recording call with a fixed attempt count and no backoff
    async fn record_with_retry(
        &self,
        project_id: &str,
        skill_id: &str,
        user_id: &str,
        notify_if_not_applied: bool,
        timestamp: Option<DateTime<Utc>>,
        approval: &ApprovalParams,
    ) -> Result<SkillEventResult> {
        let mut attempt = 1;
        loop {
            match self
                .recorder
                .record(
                    project_id,
                    skill_id,
                    user_id,
                    notify_if_not_applied,
                    timestamp,
                    approval,
                )
                .await
            {
                Ok(result) => return Ok(result),
                Err(err) if attempt < MAX_RECORD_ATTEMPTS => {
                    tracing::warn!(
                        project_id = %project_id,
                        skill_id = %skill_id,
                        attempt,
                        error = %err,
                        "Recording attempt failed, retrying"
                    );
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
