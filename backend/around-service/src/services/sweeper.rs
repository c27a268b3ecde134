use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

use crate::error::Result;
use crate::models::PostId;
use crate::services::blob_store::BlobStore;
use crate::services::document_index::DocumentIndex;

/// Outcome of one sweep pass.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SweepReport {
    pub scanned: usize,
    /// Objects younger than the grace period; their index write may be in flight
    pub skipped_recent: usize,
    /// Keys that are not post ids
    pub skipped_foreign: usize,
    pub kept: usize,
    /// Orphan keys, deleted unless the pass was a dry run
    pub orphaned: Vec<String>,
    pub delete_failures: usize,
}

/// Removes blobs whose index write never completed.
pub struct OrphanSweeper {
    blob_store: Arc<dyn BlobStore>,
    index: Arc<dyn DocumentIndex>,
    grace: Duration,
}

impl OrphanSweeper {
    pub fn new(
        blob_store: Arc<dyn BlobStore>,
        index: Arc<dyn DocumentIndex>,
        grace: Duration,
    ) -> Self {
        Self {
            blob_store,
            index,
            grace,
        }
    }

    pub async fn sweep(&self, now: DateTime<Utc>, dry_run: bool) -> Result<SweepReport> {
        let objects = self.blob_store.list("").await?;
        let mut report = SweepReport {
            scanned: objects.len(),
            ..SweepReport::default()
        };

        for object in objects {
            let Some(id) = PostId::parse(&object.key) else {
                report.skipped_foreign += 1;
                continue;
            };

            let old_enough = object
                .last_modified
                .map(|modified| now - modified >= self.grace)
                .unwrap_or(false);
            if !old_enough {
                report.skipped_recent += 1;
                continue;
            }

            if self.index.contains(id).await? {
                report.kept += 1;
                continue;
            }

            if !dry_run {
                if let Err(e) = self.blob_store.delete(&object.key).await {
                    tracing::warn!(key = %object.key, "failed to delete orphaned blob: {}", e);
                    report.delete_failures += 1;
                    continue;
                }
                tracing::info!(key = %object.key, "deleted orphaned blob");
            }
            report.orphaned.push(object.key);
        }

        Ok(report)
    }
}
