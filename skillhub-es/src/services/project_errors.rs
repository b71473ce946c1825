//! Project error tracking
//!
//! Records reports of invalid skill references against a project so
//! project administrators can find misconfigured integrations. Callers
//! treat reporting as best-effort.

use async_trait::async_trait;
use skillhub_common::Result;
use sqlx::SqlitePool;

/// Error-tracking seam consumed by the submission core
#[async_trait]
pub trait InvalidSkillReporter: Send + Sync {
    /// Record that a submission referenced a skill that does not exist
    async fn report_invalid_skill(&self, project_id: &str, skill_id: &str) -> Result<()>;
}

/// SQLite-backed project error store
pub struct SqliteProjectErrors {
    db: SqlitePool,
}

impl SqliteProjectErrors {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl InvalidSkillReporter for SqliteProjectErrors {
    async fn report_invalid_skill(&self, project_id: &str, skill_id: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO project_errors (project_id, error_type, error, error_count)
            VALUES (?, 'SkillNotFound', ?, 1)
            ON CONFLICT(project_id, error_type, error) DO UPDATE SET
                error_count = error_count + 1,
                last_seen = CURRENT_TIMESTAMP
            "#,
        )
        .bind(project_id)
        .bind(skill_id)
        .execute(&self.db)
        .await?;

        tracing::info!(
            project_id = %project_id,
            skill_id = %skill_id,
            "Recorded invalid skill report"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skillhub_common::db;

    async fn setup_test_db() -> SqlitePool {
        let pool = SqlitePool::connect(":memory:").await.unwrap();
        db::init::create_tables(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn first_report_creates_row() {
        let pool = setup_test_db().await;
        let reporter = SqliteProjectErrors::new(pool.clone());

        reporter
            .report_invalid_skill("proj1", "ghost-skill")
            .await
            .unwrap();

        let (error_type, error, count): (String, String, i64) = sqlx::query_as(
            "SELECT error_type, error, error_count FROM project_errors WHERE project_id = 'proj1'",
        )
        .fetch_one(&pool)
        .await
        .unwrap();

        assert_eq!(error_type, "SkillNotFound");
        assert_eq!(error, "ghost-skill");
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn repeated_reports_increment_count() {
        let pool = setup_test_db().await;
        let reporter = SqliteProjectErrors::new(pool.clone());

        for _ in 0..3 {
            reporter
                .report_invalid_skill("proj1", "ghost-skill")
                .await
                .unwrap();
        }

        let rows: Vec<(i64,)> =
            sqlx::query_as("SELECT error_count FROM project_errors WHERE project_id = 'proj1'")
                .fetch_all(&pool)
                .await
                .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].0, 3);
    }

    #[tokio::test]
    async fn distinct_skills_get_distinct_rows() {
        let pool = setup_test_db().await;
        let reporter = SqliteProjectErrors::new(pool.clone());

        reporter.report_invalid_skill("proj1", "a").await.unwrap();
        reporter.report_invalid_skill("proj1", "b").await.unwrap();

        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM project_errors WHERE project_id = 'proj1'")
                .fetch_one(&pool)
                .await
                .unwrap();

        assert_eq!(count, 2);
    }
}
