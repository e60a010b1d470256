//! Batched `INSERT ... ON DUPLICATE KEY UPDATE` writing.
//!
//! Rows are buffered in memory and written as a single multi-row statement once the batch size
//! is reached (or on an explicit [`BulkInsert::write`]). Deadlocks raised by concurrent writers
//! are retried transparently, everything else is handed back to the caller with the buffered
//! rows left in place.

mod query_builder;
mod retry;
mod stats;

use serde::{Deserialize, Serialize};
use tracing::debug;

pub use query_builder::{build_insert_sql, resolve_update_fields, UpdateField};
pub use retry::execute_with_deadlock_retry;
pub use stats::{BulkInsertStats, StatsLedger};

use crate::database::{adapter::Adapter, value::SqlValue};

fn default_batch_size() -> usize {
    200
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct BulkInsertOptions {
    /// Number of buffered rows which triggers an automatic write.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl Default for BulkInsertOptions {
    fn default() -> Self {
        BulkInsertOptions { batch_size: default_batch_size() }
    }
}

/// Inserts large amounts of data into a single table in batches.
///
/// Not safe for concurrent use; the buffer and counters are owned by the instance.
pub struct BulkInsert<'a, A: Adapter> {
    adapter: &'a A,
    table: String,
    insert_fields: Vec<String>,
    update_assignments: Vec<String>,
    insert_ignore: bool,
    rows: Vec<Vec<SqlValue>>,
    batch_size: usize,
    stats: StatsLedger,
}

impl<'a, A: Adapter> BulkInsert<'a, A> {
    pub fn new(
        adapter: &'a A,
        table: impl Into<String>,
        insert_fields: Vec<String>,
        update_fields: Vec<UpdateField>,
        options: BulkInsertOptions,
    ) -> Self {
        let mut bulk_insert = BulkInsert {
            adapter,
            table: table.into(),
            insert_fields: Vec::new(),
            update_assignments: Vec::new(),
            insert_ignore: false,
            rows: Vec::new(),
            batch_size: options.batch_size,
            stats: StatsLedger::default(),
        };
        bulk_insert.set_insert_fields(insert_fields).set_update_fields(&update_fields);
        bulk_insert
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn insert_fields(&self) -> &[String] {
        &self.insert_fields
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Sets the columns (and their order) rows are expected to carry.
    pub fn set_insert_fields(&mut self, fields: Vec<String>) -> &mut Self {
        self.insert_fields = fields;
        self
    }

    /// Sets what happens on a duplicate key. An empty list means a plain insert.
    ///
    /// The assignments are rendered here once rather than on every write.
    pub fn set_update_fields(&mut self, fields: &[UpdateField]) -> &mut Self {
        self.update_assignments = resolve_update_fields(self.adapter.quote(), fields);
        self
    }

    pub fn insert_ignore_enabled(&mut self) -> &mut Self {
        self.insert_ignore = true;
        self
    }

    pub fn insert_ignore_disabled(&mut self) -> &mut Self {
        self.insert_ignore = false;
        self
    }

    /// Buffers a row, writing the batch once the batch size is reached.
    ///
    /// A row whose length does not match the insert fields is dropped without any error and
    /// is not counted anywhere.
    pub async fn add(&mut self, row: Vec<SqlValue>) -> Result<&mut Self, A::Error> {
        if row.len() != self.insert_fields.len() {
            return Ok(self);
        }

        self.rows.push(row);
        if self.rows.len() >= self.batch_size {
            self.write().await?;
        }
        Ok(self)
    }

    /// Writes the buffered rows. Does nothing when the buffer is empty.
    ///
    /// On error the buffered rows are kept so the write can be attempted again.
    pub async fn write(&mut self) -> Result<&mut Self, A::Error> {
        let row_count = self.rows.len();
        if row_count == 0 {
            return Ok(self);
        }

        let sql = build_insert_sql(
            self.adapter.quote(),
            &self.table,
            &self.insert_fields,
            &self.update_assignments,
            &self.rows,
            self.insert_ignore,
        );

        let affected_rows = execute_with_deadlock_retry(self.adapter, &sql).await?;

        self.rows.clear();
        self.stats.record(row_count, affected_rows);

        debug!(
            "Bulk write to {} - rows: {}, affected rows: {}",
            self.table, row_count, affected_rows
        );

        Ok(self)
    }

    /// Returns the counters, writing any pending rows first when `flush` is set.
    pub async fn fetch_stats(&mut self, flush: bool) -> Result<BulkInsertStats, A::Error> {
        if flush {
            self.write().await?;
        }
        Ok(self.stats.snapshot(self.rows.len()))
    }

    /// Resets the running totals. Pending rows are untouched.
    pub fn clear_stats(&mut self) -> &mut Self {
        self.stats.clear();
        self
    }
}
