//! # Audit Log Sink
//!
//! Best-effort, capped, daily application log kept in the store.
//!
//! ## Behavior
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Audit Log Sink                                    │
//! │                                                                         │
//! │  audit.info("Order abc queued")                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  day bucket = UTC date of the write                                    │
//! │       │                                                                 │
//! │       ├── day already at cap? → line dropped silently                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  INSERT ──(busy/conflict)──► retry, linear backoff 40ms × attempt      │
//! │       │                       (at most 3 retries)                      │
//! │       ▼                                                                 │
//! │  Still failing? → give up silently                                     │
//! │                                                                         │
//! │  The sink NEVER returns an error and NEVER panics: losing a log line   │
//! │  must not fail an order. Operational logging still goes through        │
//! │  `tracing`; this sink is the durable trail that survives restarts.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use std::time::Duration;
use tracing::debug;

/// Maximum lines kept per UTC day. Further writes that day are dropped.
pub const MAX_LINES_PER_DAY: i64 = 10_000;

/// Retries after the initial failed attempt.
const MAX_RETRIES: u32 = 3;

/// Base backoff unit between retries.
const BACKOFF_STEP: Duration = Duration::from_millis(40);

/// Severity of an audit line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditLevel {
    Info,
    Error,
}

impl AuditLevel {
    fn as_str(&self) -> &'static str {
        match self {
            AuditLevel::Info => "INFO",
            AuditLevel::Error => "ERROR",
        }
    }
}

/// Best-effort audit log over the `app_logs` table.
///
/// Cloneable; clones share the pool.
#[derive(Debug, Clone)]
pub struct AuditLog {
    pool: SqlitePool,
}

impl AuditLog {
    /// Creates a new AuditLog.
    pub fn new(pool: SqlitePool) -> Self {
        AuditLog { pool }
    }

    /// Records an informational line. Never fails.
    pub async fn info(&self, message: &str) {
        self.write(AuditLevel::Info, message).await;
    }

    /// Records an error line. Never fails.
    pub async fn error(&self, message: &str) {
        self.write(AuditLevel::Error, message).await;
    }

    async fn write(&self, level: AuditLevel, message: &str) {
        let now = Utc::now();
        let day = now.format("%Y-%m-%d").to_string();

        // attempt 0 is the first try; MAX_RETRIES more follow on failure
        for attempt in 0..=MAX_RETRIES {
            match self.try_insert(&day, level, message).await {
                Ok(inserted) => {
                    if !inserted {
                        debug!(day = %day, "Audit line dropped, daily cap reached");
                    }
                    return;
                }
                Err(e) if attempt < MAX_RETRIES => {
                    debug!(error = %e, attempt = attempt + 1, "Audit write failed, backing off");
                    tokio::time::sleep(BACKOFF_STEP * (attempt + 1)).await;
                }
                Err(e) => {
                    debug!(error = %e, "Audit write abandoned");
                    return;
                }
            }
        }
    }

    /// Inserts one line unless the day bucket is full.
    ///
    /// The cap check rides inside the INSERT's WHERE clause, so a burst of
    /// concurrent writers cannot blow meaningfully past the cap.
    async fn try_insert(
        &self,
        day: &str,
        level: AuditLevel,
        message: &str,
    ) -> Result<bool, sqlx::Error> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO app_logs (day, logged_at, level, message)
            SELECT ?1, ?2, ?3, ?4
            WHERE (SELECT COUNT(*) FROM app_logs WHERE day = ?1) < ?5
            "#,
        )
        .bind(day)
        .bind(now)
        .bind(level.as_str())
        .bind(message)
        .bind(MAX_LINES_PER_DAY)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Number of lines recorded for a UTC day (`YYYY-MM-DD`).
    pub async fn count_for_day(&self, day: &str) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM app_logs WHERE day = ?1")
            .bind(day)
            .fetch_one(&self.pool)
            .await
            .unwrap_or(0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Store, StoreConfig};
    use sqlx::Row;

    #[tokio::test]
    async fn test_info_and_error_record_lines() {
        let store = Store::new(StoreConfig::in_memory()).await.unwrap();
        let audit = store.audit_log();

        audit.info("Order o1 queued").await;
        audit.error("Reservation failed for p9").await;

        let day = Utc::now().format("%Y-%m-%d").to_string();
        assert_eq!(audit.count_for_day(&day).await, 2);

        let rows = sqlx::query("SELECT level, message FROM app_logs ORDER BY id")
            .fetch_all(store.pool())
            .await
            .unwrap();
        assert_eq!(rows[0].get::<String, _>("level"), "INFO");
        assert_eq!(rows[1].get::<String, _>("level"), "ERROR");
        assert_eq!(rows[1].get::<String, _>("message"), "Reservation failed for p9");
    }

    #[tokio::test]
    async fn test_daily_cap_drops_silently() {
        let store = Store::new(StoreConfig::in_memory()).await.unwrap();
        let audit = store.audit_log();
        let day = Utc::now().format("%Y-%m-%d").to_string();

        // Fill today's bucket to the cap in one statement.
        sqlx::query(
            r#"
            INSERT INTO app_logs (day, logged_at, level, message)
            SELECT ?1, ?2, 'INFO', 'fill'
            FROM (WITH RECURSIVE seq(n) AS (
                      SELECT 1 UNION ALL SELECT n + 1 FROM seq WHERE n < ?3
                  ) SELECT n FROM seq)
            "#,
        )
        .bind(&day)
        .bind(Utc::now())
        .bind(MAX_LINES_PER_DAY)
        .execute(store.pool())
        .await
        .unwrap();

        audit.info("one more").await;
        assert_eq!(audit.count_for_day(&day).await, MAX_LINES_PER_DAY);
    }

    #[tokio::test]
    async fn test_sink_survives_closed_pool() {
        let store = Store::new(StoreConfig::in_memory()).await.unwrap();
        let audit = store.audit_log();
        store.close().await;

        // Every attempt fails, the sink swallows it.
        audit.info("after close").await;
    }
}
