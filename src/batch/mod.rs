//! Batch (CSV) import mode.

use std::fs::File;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use crate::ingest::read_csv;
use crate::pipeline::{sync_records, SyncSummary};
use crate::reconciler::{ReconcileError, Reconciler};

/// Errors that end a batch import.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("Sorry, there was no file found with name {0}")]
    FileNotFound(PathBuf),
    #[error("failed to read input: {0}")]
    Io(#[from] io::Error),
    #[error("failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("sync aborted: {0}")]
    Reconcile(#[from] ReconcileError),
}

/// Ask for the CSV file name on the terminal.
pub fn prompt_for_path<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> io::Result<PathBuf> {
    write!(output, "\n\nEnter the file name of the CSV: ")?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(PathBuf::from(line.trim()))
}

/// Import every row of the CSV at `path`.
pub async fn import_file(reconciler: &Reconciler, path: &Path) -> Result<SyncSummary, BatchError> {
    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => BatchError::FileNotFound(path.to_path_buf()),
        _ => BatchError::Io(e),
    })?;

    let rows = read_csv(file)?;
    tracing::info!("Beginning to import {} user/s", rows.len());

    let summary = sync_records(reconciler, rows).await?;

    tracing::info!(
        total = summary.total,
        synced = summary.synced,
        rejected = summary.rejected,
        "Import complete"
    );

    Ok(summary)
}
