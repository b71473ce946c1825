//! Database initialization functions
//!
//! Creates missing tables on startup and seeds the settings table with
//! default values. Existing rows are never overwritten.

use crate::error::Result;
use sqlx::{Pool, Sqlite};
use tracing::info;

/// Initialize schema and settings defaults
pub async fn initialize(pool: &Pool<Sqlite>) -> Result<()> {
    create_tables(pool).await?;
    init_settings_defaults(pool).await
}

/// Create required tables if they do not exist
pub async fn create_tables(pool: &Pool<Sqlite>) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            user_id TEXT PRIMARY KEY,
            display_name TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS skills (
            project_id TEXT NOT NULL,
            skill_id TEXT NOT NULL,
            name TEXT NOT NULL,
            point_increment INTEGER NOT NULL DEFAULT 10,
            max_occurrences INTEGER NOT NULL DEFAULT 1,
            self_report_type TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            PRIMARY KEY (project_id, skill_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Recording is idempotent per (project, skill, user, timestamp)
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS skill_events (
            guid TEXT PRIMARY KEY,
            project_id TEXT NOT NULL,
            skill_id TEXT NOT NULL,
            user_id TEXT NOT NULL,
            event_time_ms INTEGER NOT NULL,
            applied INTEGER NOT NULL DEFAULT 1,
            points INTEGER NOT NULL DEFAULT 0,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            UNIQUE (project_id, skill_id, user_id, event_time_ms)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS skill_approvals (
            guid TEXT PRIMARY KEY,
            project_id TEXT NOT NULL,
            skill_id TEXT NOT NULL,
            user_id TEXT NOT NULL,
            requested_at_ms INTEGER NOT NULL,
            message TEXT,
            status TEXT NOT NULL DEFAULT 'PENDING',
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS project_errors (
            project_id TEXT NOT NULL,
            error_type TEXT NOT NULL,
            error TEXT NOT NULL,
            error_count INTEGER NOT NULL DEFAULT 1,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            last_seen TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            PRIMARY KEY (project_id, error_type, error)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Initialize settings table with default values
pub async fn init_settings_defaults(pool: &Pool<Sqlite>) -> Result<()> {
    // Settings with their default values
    let defaults = vec![
        // Maximum character length of a self-report approval message
        ("max_self_report_message_length", "500"),
        // API authentication (0 disables checking)
        ("api_shared_secret", "0"),
        // HTTP listen port
        ("service_port", "5735"),
    ];

    for (key, default_value) in defaults {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM settings WHERE key = ?)")
                .bind(key)
                .fetch_one(pool)
                .await?;

        if !exists {
            sqlx::query("INSERT INTO settings (key, value) VALUES (?, ?)")
                .bind(key)
                .bind(default_value)
                .execute(pool)
                .await?;

            info!(
                "Initialized setting '{}' with default value: {}",
                key, default_value
            );
        }
    }

    Ok(())
}
