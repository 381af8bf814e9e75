//! Record pipeline shared by batch and service mode.
//!
//! Validates each raw record and reconciles the valid ones, strictly in input order.
//! Rejections are logged and skipped; the first directory failure stops the run.

use tracing::{debug, info, warn};

use crate::models::RawRecord;
use crate::reconciler::{ReconcileError, Reconciler};
use crate::validator::validate;

/// Outcome counts for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub total: usize,
    pub synced: usize,
    pub removed: usize,
    pub rejected: usize,
}

/// Validate and sync `records` one at a time.
pub async fn sync_records<I>(
    reconciler: &Reconciler,
    records: I,
) -> Result<SyncSummary, ReconcileError>
where
    I: IntoIterator<Item = RawRecord>,
{
    let variant = reconciler.variant();
    let mut summary = SyncSummary::default();

    for (index, raw) in records.into_iter().enumerate() {
        summary.total += 1;

        let record = match validate(&raw, variant) {
            Ok(record) => record,
            Err(rejection) => {
                warn!(row = index + 1, "Skipping record: {}", rejection);
                summary.rejected += 1;
                continue;
            }
        };

        info!(
            row = index + 1,
            "Beginning to process user {}",
            record.full_name()
        );

        let report = reconciler.reconcile(&record).await?;
        debug!(steps = %report, "Sync steps for {}", record.full_name());
        if report.was_deleted() {
            summary.removed += 1;
            info!("Removed user {} from Slack", record.full_name());
        } else {
            summary.synced += 1;
            info!(
                user_id = report.user_id().unwrap_or_default(),
                "Successfully added or updated user {} in Slack",
                record.full_name()
            );
        }
    }

    Ok(summary)
}
