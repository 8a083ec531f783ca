//! # Durable Message Queue
//!
//! At-least-once message handoff between intake and the processor.
//!
//! ## Delivery Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Queue Message Lifecycle                            │
//! │                                                                         │
//! │  enqueue ──► [visible] ──► dequeue ──► [leased] ──► ack ──► (deleted)  │
//! │                  ▲                        │                             │
//! │                  │         nack / lease timeout                        │
//! │                  └────────────────────────┘                             │
//! │                                                                         │
//! │  • FIFO by enqueue order (id is monotonic)                             │
//! │  • AT-LEAST-ONCE: a message is redelivered until acked; consumers      │
//! │    must tolerate duplicates                                            │
//! │  • dequeue claims with a visibility lease - other consumers cannot     │
//! │    see a leased message until the lease expires                        │
//! │  • attempts counts deliveries; poison messages are dropped by the      │
//! │    consumer once attempts exceeds its cap                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Two logical queues share the table: [`NEW_ORDERS_QUEUE`] carries intake
//! handoffs, [`INVENTORY_UPDATES_QUEUE`] carries stock deltas published at
//! shipment.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use sqlx::{Row, SqlitePool};
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::StoreResult;

/// Queue of orders awaiting processing.
pub const NEW_ORDERS_QUEUE: &str = "new-orders";

/// Queue of inventory deltas published at shipment.
pub const INVENTORY_UPDATES_QUEUE: &str = "inventory-updates";

/// Default visibility lease for dequeued messages.
pub const DEFAULT_LEASE: Duration = Duration::from_secs(30);

/// How often a dequeue retries when it loses a claim race.
const MAX_CLAIM_ATTEMPTS: u32 = 3;

// =============================================================================
// Message
// =============================================================================

/// A message claimed from the queue.
#[derive(Debug, Clone)]
pub struct QueueMessage {
    /// Storage id; pass to `ack`/`nack`.
    pub id: i64,

    /// The queue this message came from.
    pub queue: String,

    /// Opaque payload exactly as enqueued.
    pub payload: String,

    /// Delivery count including this delivery (first delivery = 1).
    pub attempts: i64,

    /// When the message was first enqueued.
    pub enqueued_at: DateTime<Utc>,
}

// =============================================================================
// Message Queue
// =============================================================================

/// Durable queue over the `queue_messages` table.
///
/// ## Usage
/// ```rust,ignore
/// let queue = store.queue();
/// queue.enqueue(NEW_ORDERS_QUEUE, &payload).await?;
///
/// if let Some(msg) = queue.dequeue(NEW_ORDERS_QUEUE, DEFAULT_LEASE).await? {
///     match handle(&msg).await {
///         Ok(()) => queue.ack(msg.id).await?,
///         Err(_) => queue.nack(msg.id).await?,
///     }
/// }
/// ```
#[derive(Debug, Clone)]
pub struct MessageQueue {
    pool: SqlitePool,
}

impl MessageQueue {
    /// Creates a new MessageQueue.
    pub fn new(pool: SqlitePool) -> Self {
        MessageQueue { pool }
    }

    /// Appends a message to a queue. The message is immediately visible.
    ///
    /// ## Returns
    /// The storage id of the enqueued message.
    pub async fn enqueue(&self, queue: &str, payload: &str) -> StoreResult<i64> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO queue_messages (queue, payload, enqueued_at, visible_at, attempts)
            VALUES (?1, ?2, ?3, ?3, 0)
            "#,
        )
        .bind(queue)
        .bind(payload)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        debug!(queue = %queue, id = %id, "Message enqueued");
        Ok(id)
    }

    /// Claims the oldest visible message, if any.
    ///
    /// The claim pushes the message's visibility out by `lease` and bumps its
    /// delivery count. If the consumer neither acks nor nacks before the
    /// lease expires, the message becomes visible again on its own.
    ///
    /// ## Returns
    /// * `Ok(Some(msg))` - Message claimed for `lease`
    /// * `Ok(None)` - Queue empty (or everything is leased out)
    pub async fn dequeue(&self, queue: &str, lease: Duration) -> StoreResult<Option<QueueMessage>> {
        let lease = ChronoDuration::from_std(lease).unwrap_or(ChronoDuration::seconds(30));

        for _ in 0..MAX_CLAIM_ATTEMPTS {
            let now = Utc::now();

            let Some(row) = sqlx::query(
                r#"
                SELECT id, queue, payload, enqueued_at, attempts
                FROM queue_messages
                WHERE queue = ?1 AND visible_at <= ?2
                ORDER BY id
                LIMIT 1
                "#,
            )
            .bind(queue)
            .bind(now)
            .fetch_optional(&self.pool)
            .await?
            else {
                return Ok(None);
            };

            let id: i64 = row.get("id");

            // Conditional claim: only wins if the row is still visible.
            let claimed = sqlx::query(
                r#"
                UPDATE queue_messages
                SET visible_at = ?2, attempts = attempts + 1
                WHERE id = ?1 AND visible_at <= ?3
                "#,
            )
            .bind(id)
            .bind(now + lease)
            .bind(now)
            .execute(&self.pool)
            .await?;

            if claimed.rows_affected() == 1 {
                let msg = QueueMessage {
                    id,
                    queue: row.get("queue"),
                    payload: row.get("payload"),
                    attempts: row.get::<i64, _>("attempts") + 1,
                    enqueued_at: row.get::<DateTime<Utc>, _>("enqueued_at"),
                };
                debug!(queue = %queue, id = %id, attempts = %msg.attempts, "Message dequeued");
                return Ok(Some(msg));
            }

            // Another consumer claimed it between our read and write.
            debug!(queue = %queue, id = %id, "Claim race lost, retrying");
        }

        warn!(queue = %queue, "Dequeue gave up after repeated claim races");
        Ok(None)
    }

    /// Acknowledges (deletes) a processed message.
    ///
    /// Acking an already-deleted id is a no-op: redelivered duplicates may
    /// race their original to the ack.
    pub async fn ack(&self, id: i64) -> StoreResult<()> {
        sqlx::query("DELETE FROM queue_messages WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        debug!(id = %id, "Message acked");
        Ok(())
    }

    /// Returns a claimed message to the queue for immediate redelivery.
    pub async fn nack(&self, id: i64) -> StoreResult<()> {
        let now = Utc::now();

        sqlx::query("UPDATE queue_messages SET visible_at = ?2 WHERE id = ?1")
            .bind(id)
            .bind(now)
            .execute(&self.pool)
            .await?;

        debug!(id = %id, "Message nacked");
        Ok(())
    }

    /// Total depth of a queue, leased messages included.
    pub async fn depth(&self, queue: &str) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM queue_messages WHERE queue = ?1")
            .bind(queue)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
