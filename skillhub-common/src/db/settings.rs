//! Typed access to the settings table
//!
//! Runtime-tunable values live in the database; defaults are seeded by
//! `db::init`. Getters fall back to the compiled default when a key is
//! missing so a partially-seeded database still behaves sanely.

use crate::error::{Error, Result};
use sqlx::{Pool, Sqlite};

pub const DEFAULT_MAX_SELF_REPORT_MESSAGE_LENGTH: usize = 500;
pub const DEFAULT_SERVICE_PORT: u16 = 5735;

/// Read a raw setting value
pub async fn get_setting(pool: &Pool<Sqlite>, key: &str) -> Result<Option<String>> {
    let row: Option<(String,)> = sqlx::query_as("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|(value,)| value))
}

/// Write a setting value (insert or update)
pub async fn set_setting(pool: &Pool<Sqlite>, key: &str, value: &str) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO settings (key, value) VALUES (?, ?)
        ON CONFLICT(key) DO UPDATE SET value = excluded.value,
            updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(key)
    .bind(value)
    .execute(pool)
    .await?;

    Ok(())
}

/// Maximum character length allowed for a self-report approval message
pub async fn get_max_self_report_message_length(pool: &Pool<Sqlite>) -> Result<usize> {
    match get_setting(pool, "max_self_report_message_length").await? {
        Some(value) => value.parse::<usize>().map_err(|e| {
            Error::Config(format!(
                "Invalid max_self_report_message_length '{}': {}",
                value, e
            ))
        }),
        None => Ok(DEFAULT_MAX_SELF_REPORT_MESSAGE_LENGTH),
    }
}

/// Shared secret for API authentication (0 disables checking)
pub async fn get_shared_secret(pool: &Pool<Sqlite>) -> Result<i64> {
    match get_setting(pool, "api_shared_secret").await? {
        Some(value) => value
            .parse::<i64>()
            .map_err(|e| Error::Config(format!("Invalid api_shared_secret '{}': {}", value, e))),
        None => Ok(0),
    }
}

/// HTTP listen port for the event submission service
pub async fn get_service_port(pool: &Pool<Sqlite>) -> Result<u16> {
    match get_setting(pool, "service_port").await? {
        Some(value) => value
            .parse::<u16>()
            .map_err(|e| Error::Config(format!("Invalid service_port '{}': {}", value, e))),
        None => Ok(DEFAULT_SERVICE_PORT),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init;
    use sqlx::SqlitePool;

    async fn setup_test_db() -> SqlitePool {
        let pool = SqlitePool::connect(":memory:").await.unwrap();
        init::initialize(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn seeded_defaults_are_readable() {
        let pool = setup_test_db().await;

        assert_eq!(
            get_max_self_report_message_length(&pool).await.unwrap(),
            500
        );
        assert_eq!(get_shared_secret(&pool).await.unwrap(), 0);
        assert_eq!(get_service_port(&pool).await.unwrap(), 5735);
    }

    #[tokio::test]
    async fn set_setting_overrides_default() {
        let pool = setup_test_db().await;

        set_setting(&pool, "max_self_report_message_length", "50")
            .await
            .unwrap();

        assert_eq!(get_max_self_report_message_length(&pool).await.unwrap(), 50);
    }

    #[tokio::test]
    async fn missing_key_falls_back_to_compiled_default() {
        let pool = SqlitePool::connect(":memory:").await.unwrap();
        init::create_tables(&pool).await.unwrap();

        assert_eq!(
            get_max_self_report_message_length(&pool).await.unwrap(),
            DEFAULT_MAX_SELF_REPORT_MESSAGE_LENGTH
        );
    }

    #[tokio::test]
    async fn invalid_value_is_a_config_error() {
        let pool = setup_test_db().await;

        set_setting(&pool, "max_self_report_message_length", "not-a-number")
            .await
            .unwrap();

        let err = get_max_self_report_message_length(&pool)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
