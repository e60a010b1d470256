use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::database::{
    quote::Quote,
    value::{ResultRow, SqlValue},
};

static DEADLOCK_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)deadlock").expect("deadlock pattern is a valid regex")
});

/// Returns true when a database error message reports a deadlock, which is safe to retry with
/// the exact same statement. Lock wait timeouts do not match.
pub fn is_deadlock_message(message: &str) -> bool {
    DEADLOCK_PATTERN.is_match(message)
}

/// The database connection the helpers run on.
///
/// Implementations wrap whatever driver is in use; the helpers only ever talk to the database
/// through this trait.
#[async_trait]
pub trait Adapter: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;
    type Statement: PreparedStatement<Error = Self::Error>;

    fn quote(&self) -> &dyn Quote;

    /// Executes a statement and returns the affected-row count.
    async fn execute(&self, sql: &str) -> Result<u64, Self::Error>;

    /// Runs a query with bind parameters and fetches every row.
    async fn query(&self, sql: &str, bind: &[SqlValue]) -> Result<Vec<ResultRow>, Self::Error>;

    async fn prepare(&self, sql: &str) -> Result<Self::Statement, Self::Error>;

    /// Opens an independent session with the same connection settings. Session state changed on
    /// the fork must never be visible on `self`.
    async fn fork(&self) -> Result<Self, Self::Error>
    where
        Self: Sized;

    /// Stops the client buffering whole result sets so rows are streamed as they are read.
    async fn disable_buffering(&mut self) -> Result<(), Self::Error>;

    /// Whether the error is a transient lock conflict which can be retried as is.
    fn is_transient_conflict(&self, error: &Self::Error) -> bool {
        is_deadlock_message(&error.to_string())
    }
}

#[async_trait]
pub trait PreparedStatement: Send {
    type Error: std::error::Error + Send + Sync + 'static;

    async fn execute(&mut self, bind: &[SqlValue]) -> Result<(), Self::Error>;

    /// Reads the next row, `None` once the result set is exhausted.
    async fn fetch(&mut self) -> Result<Option<ResultRow>, Self::Error>;

    async fn fetch_all(&mut self) -> Result<Vec<ResultRow>, Self::Error> {
        let mut rows = Vec::new();
        while let Some(row) = self.fetch().await? {
            rows.push(row);
        }
        Ok(rows)
    }
}
