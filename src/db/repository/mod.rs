//! Repository layer — owner-scoped record operations.
//!
//! Records are append-only: every insert creates a new row with a fresh
//! id, nothing is updated in place and nothing is deleted.

mod assessment;
mod checkin;
mod preference;

pub use assessment::*;
pub use checkin::*;
pub use preference::*;

/// Decodes a JSON list column written by this layer.
fn decode_json<T: serde::de::DeserializeOwned>(value: &str) -> Result<T, super::DatabaseError> {
    Ok(serde_json::from_str(value)?)
}

fn parse_id(value: &str) -> Result<uuid::Uuid, super::DatabaseError> {
    uuid::Uuid::parse_str(value)
        .map_err(|e| super::DatabaseError::ConstraintViolation(e.to_string()))
}
