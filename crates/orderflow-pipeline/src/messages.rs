//! # Wire Messages
//!
//! Queue message contracts and their transport encoding.
//!
//! ## Encoding
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Queue Payload Encoding                              │
//! │                                                                         │
//! │  NewOrderMessage (struct)                                              │
//! │       │ serde_json                                                      │
//! │       ▼                                                                 │
//! │  {"orderId":"..","customerId":"..","lines":[{"productId":"..",         │
//! │    "quantity":2,"unitPrice":499}]}                                      │
//! │       │ base64 (standard alphabet, padded)                             │
//! │       ▼                                                                 │
//! │  eyJvcmRlcklkIjoi...  ← what actually sits in the queue               │
//! │                                                                         │
//! │  Field names are camelCase on the wire; the base64 wrapper keeps       │
//! │  payloads opaque to the queue and safe to log.                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Decoding failures are terminal: a payload that isn't valid base64 JSON
//! will never become valid, so consumers drop it rather than retry.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::{PipelineError, PipelineResult};
use orderflow_core::types::{Order, OrderLine};

// =============================================================================
// Message Contracts
// =============================================================================

/// Handoff from intake to the processor: one freshly created order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderMessage {
    pub order_id: String,
    pub customer_id: String,
    pub lines: Vec<NewOrderLine>,
}

/// One line of a new-order message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderLine {
    pub product_id: String,
    pub quantity: i64,
    /// Unit price snapshot in cents.
    pub unit_price: i64,
}

impl NewOrderMessage {
    /// Builds the handoff message for a persisted order.
    pub fn for_order(order: &Order) -> Self {
        NewOrderMessage {
            order_id: order.order_id.clone(),
            customer_id: order.customer_id.clone(),
            lines: order.lines.iter().map(NewOrderLine::from_line).collect(),
        }
    }
}

impl NewOrderLine {
    fn from_line(line: &OrderLine) -> Self {
        NewOrderLine {
            product_id: line.product_id.clone(),
            quantity: line.quantity,
            unit_price: line.unit_price_cents,
        }
    }
}

/// A signed stock delta published at shipment.
///
/// Negative deltas decrement stock (shipments), positive deltas restock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryUpdateMessage {
    pub product_id: String,
    pub quantity_delta: i64,
}

// =============================================================================
// Transport Encoding
// =============================================================================

/// Encodes a message as base64-wrapped UTF-8 JSON.
pub fn encode<T: Serialize>(message: &T) -> PipelineResult<String> {
    let json = serde_json::to_string(message)
        .map_err(|e| PipelineError::EncodingFailed(e.to_string()))?;
    Ok(STANDARD.encode(json.as_bytes()))
}

/// Decodes a base64-wrapped UTF-8 JSON payload.
///
/// ## Errors
/// `PipelineError::MalformedPayload` for bad base64, non-UTF-8 bytes, or a
/// JSON shape that doesn't match `T`.
pub fn decode<T: DeserializeOwned>(payload: &str) -> PipelineResult<T> {
    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| PipelineError::MalformedPayload(format!("invalid base64: {e}")))?;
    let json = std::str::from_utf8(&bytes)
        .map_err(|e| PipelineError::MalformedPayload(format!("payload is not UTF-8: {e}")))?;
    serde_json::from_str(json)
        .map_err(|e| PipelineError::MalformedPayload(format!("invalid message JSON: {e}")))
}

// =============================================================================
// Unit Tests
// =============================================================================
