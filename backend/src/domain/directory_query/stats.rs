//! Directory statistics.

use std::collections::BTreeMap;

use crate::domain::user::{Role, UserRecord};

/// One entry of the batch breakdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchCount {
    /// Batch label.
    pub label: String,
    /// Members in the batch.
    pub count: usize,
}

/// Totals over the whole directory, independent of any active query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryStats {
    /// All members.
    pub total: usize,
    /// Members with the admin role.
    pub admins: usize,
    /// Members per non-empty batch label.
    pub by_batch: BTreeMap<String, usize>,
}

impl DirectoryStats {
    /// Compute statistics for `records`.
    #[must_use]
    pub fn compute(records: &[UserRecord]) -> Self {
        records
            .iter()
            .fold(Self::default(), |mut stats, record| {
                stats.total += 1;
                if record.role() == Role::Admin {
                    stats.admins += 1;
                }
                if let Some(batch) = record.batch() {
                    *stats.by_batch.entry(batch.to_owned()).or_default() += 1;
                }
                stats
            })
    }

    /// Batches ordered by member count, largest first; ties by label.
    #[must_use]
    pub fn batch_breakdown(&self) -> Vec<BatchCount> {
        let mut breakdown: Vec<BatchCount> = self
            .by_batch
            .iter()
            .map(|(label, count)| BatchCount {
                label: label.clone(),
                count: *count,
            })
            .collect();
        breakdown.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
        breakdown
    }
}
