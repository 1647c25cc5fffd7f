//! Out-of-band materialization of table blocks.

use louie_api::LouieApiError;
use louie_elements::{Block, Table};

/// Source of full tables for dataframe blocks.
pub trait ArtifactFetcher {
    fn fetch(&self, thread_id: &str, block_id: &str) -> Result<Table, LouieApiError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HydrationReport {
    pub hydrated: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl HydrationReport {
    pub fn is_complete(&self) -> bool {
        self.failed == 0 && self.skipped == 0
    }
}

/// Attach a materialized table to every table block that lacks one.
///
/// Never fails: a block that cannot be fetched keeps its inline snapshot and
/// metadata, and a warning is logged. Blocks already materialized are left
/// untouched.
pub fn hydrate_tables<F>(
    fetcher: &F,
    thread_id: Option<&str>,
    blocks: &mut [Block],
) -> HydrationReport
where
    F: ArtifactFetcher + ?Sized,
{
    let mut report = HydrationReport::default();

    for table in blocks.iter_mut().filter_map(Block::as_table_mut) {
        if table.is_hydrated() {
            continue;
        }

        let (Some(thread_id), Some(block_id)) = (thread_id, table.fetch_key()) else {
            tracing::warn!(
                block = ?table.id,
                has_thread = thread_id.is_some(),
                "table block has no fetchable identifier, keeping metadata only"
            );
            report.skipped += 1;
            continue;
        };

        match fetcher.fetch(thread_id, block_id) {
            Ok(materialized) => {
                tracing::debug!(
                    thread_id,
                    block_id,
                    rows = materialized.shape().0,
                    "hydrated table block"
                );
                table.materialized = Some(materialized);
                report.hydrated += 1;
            }
            Err(error) => {
                tracing::warn!(
                    thread_id,
                    block_id,
                    %error,
                    "failed to fetch table, keeping metadata only"
                );
                report.failed += 1;
            }
        }
    }

    report
}
