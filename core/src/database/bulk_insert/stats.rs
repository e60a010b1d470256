use serde::Serialize;

/// Snapshot of a bulk insert's counters.
///
/// `updated` is derived from the database's affected-row convention (1 per insert, 2 per
/// update). Under `INSERT IGNORE` ignored duplicates affect 0 rows, so `updated` goes negative
/// and `inserted` exceeds the real number of inserts.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BulkInsertStats {
    pub total: i64,
    pub inserted: i64,
    pub updated: i64,
    pub pending: usize,
}

/// Running totals across flushes.
#[derive(Debug, Default, Clone)]
pub struct StatsLedger {
    total: i64,
    inserted: i64,
    updated: i64,
}

impl StatsLedger {
    /// Accounts for one flush of `row_count` rows which reported `affected_rows`.
    pub fn record(&mut self, row_count: usize, affected_rows: u64) {
        let row_count = row_count as i64;
        let updated = affected_rows as i64 - row_count;

        self.total += row_count;
        self.inserted += row_count - updated;
        self.updated += updated;
    }

    pub fn clear(&mut self) {
        *self = StatsLedger::default();
    }

    pub fn snapshot(&self, pending: usize) -> BulkInsertStats {
        BulkInsertStats {
            total: self.total,
            inserted: self.inserted,
            updated: self.updated,
            pending,
        }
    }
}
