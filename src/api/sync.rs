//! Roster sync endpoint.

use axum::{body::Bytes, extract::State};
use serde_json::Value;

use crate::errors::{codes, AppError};
use crate::ingest::record_from_json;
use crate::pipeline::sync_records;
use crate::AppState;

/// POST / - Sync a JSON array of roster records.
pub async fn sync_roster(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<&'static str, AppError> {
    let payload: Value = serde_json::from_slice(&body)?;
    let Value::Array(items) = payload else {
        return Err(AppError::BadRequest("expected a JSON array".to_string()));
    };

    tracing::info!("Received batch of {} record(s)", items.len());

    let summary = sync_records(&state.reconciler, items.iter().map(record_from_json)).await?;

    tracing::info!(
        total = summary.total,
        synced = summary.synced,
        removed = summary.removed,
        rejected = summary.rejected,
        "Batch complete"
    );

    Ok(codes::OK)
}
