//! Running queries with very large result sets.
//!
//! The query runs on its own forked session with long timeouts and client buffering disabled,
//! so rows stream back instead of being held in memory. An optional inspected-row limit checks
//! the query plan first and refuses to run anything estimated to scan more than that.

mod query_planner;

use futures::{stream, Stream};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub use query_planner::{
    multiply_row_estimates, ExplainEstimator, InspectedRowsEstimator, QueryPlanner,
};

use crate::database::{
    adapter::{Adapter, PreparedStatement},
    value::{ResultRow, SqlValue},
};

fn default_timeout_secs() -> u64 {
    7200
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct BigResultOptions {
    /// Seconds before the server logs the query as slow.
    #[serde(default = "default_timeout_secs")]
    pub long_query_time: u64,

    /// Seconds the server waits on a blocked write to the client.
    #[serde(default = "default_timeout_secs")]
    pub net_write_timeout: u64,
}

impl Default for BigResultOptions {
    fn default() -> Self {
        BigResultOptions {
            long_query_time: default_timeout_secs(),
            net_write_timeout: default_timeout_secs(),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum BigResultError<E: std::error::Error + 'static> {
    #[error("Number of rows inspected exceeds '{limit}'")]
    InvalidArgument { limit: u64 },

    #[error(transparent)]
    Database(E),
}

impl<E: std::error::Error + 'static> BigResultError<E> {
    /// The database error exactly as the adapter raised it, if that is what this is.
    pub fn into_database_error(self) -> Option<E> {
        match self {
            BigResultError::Database(e) => Some(e),
            BigResultError::InvalidArgument { .. } => None,
        }
    }
}

/// An executed statement streaming rows from its own session.
///
/// Rows should be read to the end (or the cursor dropped) before anything else is done on the
/// session.
pub struct BigResultCursor<A: Adapter> {
    statement: A::Statement,
    session: A,
}

impl<A: Adapter> BigResultCursor<A> {
    /// The forked session the statement runs on.
    pub fn session(&self) -> &A {
        &self.session
    }

    pub async fn fetch(&mut self) -> Result<Option<ResultRow>, A::Error> {
        self.statement.fetch().await
    }

    pub async fn fetch_all(&mut self) -> Result<Vec<ResultRow>, A::Error> {
        self.statement.fetch_all().await
    }

    pub fn into_stream(self) -> impl Stream<Item = Result<ResultRow, A::Error>> {
        stream::try_unfold(self, |mut cursor| async move {
            let row = cursor.fetch().await?;
            Ok::<_, A::Error>(row.map(|row| (row, cursor)))
        })
    }
}

pub struct BigResult<'a, A: Adapter, P = ExplainEstimator> {
    adapter: &'a A,
    options: BigResultOptions,
    estimator: P,
}

impl<'a, A: Adapter> BigResult<'a, A> {
    pub fn new(adapter: &'a A, options: BigResultOptions) -> Self {
        BigResult { adapter, options, estimator: ExplainEstimator }
    }

    /// One-shot [`BigResult::query`] with the default options.
    pub async fn execute(
        adapter: &'a A,
        select: &str,
        bind: &[SqlValue],
        inspected_row_limit: Option<u64>,
    ) -> Result<BigResultCursor<A>, BigResultError<A::Error>> {
        BigResult::new(adapter, BigResultOptions::default())
            .query(select, bind, inspected_row_limit)
            .await
    }
}

impl<'a, A: Adapter, P: InspectedRowsEstimator<A>> BigResult<'a, A, P> {
    /// Swaps the strategy used to estimate inspected rows.
    pub fn with_estimator<Q>(self, estimator: Q) -> BigResult<'a, A, Q>
    where
        Q: InspectedRowsEstimator<A>,
    {
        BigResult { adapter: self.adapter, options: self.options, estimator }
    }

    pub fn options(&self) -> &BigResultOptions {
        &self.options
    }

    /// Executes the query on a forked, unbuffered session and returns the live cursor.
    ///
    /// When `inspected_row_limit` is given the plan is checked first, and a query estimated to
    /// inspect more rows than that is rejected before anything runs.
    pub async fn query(
        &self,
        select: &str,
        bind: &[SqlValue],
        inspected_row_limit: Option<u64>,
    ) -> Result<BigResultCursor<A>, BigResultError<A::Error>> {
        if let Some(limit) = inspected_row_limit {
            let inspected_rows = self
                .estimator
                .inspected_rows(self.adapter, select, bind)
                .await
                .map_err(BigResultError::Database)?;
            if inspected_rows > limit {
                info!(
                    "Refusing big result query - estimated rows inspected: {}, limit: {}",
                    inspected_rows, limit
                );
                return Err(BigResultError::InvalidArgument { limit });
            }
        }

        let mut session = self.adapter.fork().await.map_err(BigResultError::Database)?;
        session.execute(&self.session_setup_sql()).await.map_err(BigResultError::Database)?;
        session.disable_buffering().await.map_err(BigResultError::Database)?;

        debug!(
            "Big result session ready - long_query_time: {}, net_write_timeout: {}",
            self.options.long_query_time, self.options.net_write_timeout
        );

        let mut statement = session.prepare(select).await.map_err(BigResultError::Database)?;
        statement.execute(bind).await.map_err(BigResultError::Database)?;

        Ok(BigResultCursor { statement, session })
    }

    fn session_setup_sql(&self) -> String {
        format!(
            "SET @@long_query_time={}, @@net_write_timeout={}",
            self.options.long_query_time, self.options.net_write_timeout
        )
    }
}
