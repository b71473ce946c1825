//! Service modules for skill event submission

pub mod event_submitter;
pub mod identity;
pub mod project_errors;
pub mod skill_recorder;

pub use event_submitter::{EventSubmitter, SkillEventRequest, SubmitLimits};
pub use identity::{DbIdentityResolver, IdentityResolver, RequestIdentity};
pub use project_errors::{InvalidSkillReporter, SqliteProjectErrors};
pub use skill_recorder::{ApprovalParams, SkillEventResult, SkillRecorder, SqliteSkillRecorder};
