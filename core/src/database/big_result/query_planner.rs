use async_trait::async_trait;
use tracing::debug;

use crate::database::{
    adapter::Adapter,
    value::{ResultRow, SqlValue},
};

/// Column of an `EXPLAIN` row holding the estimated number of rows for that step.
const ROWS_COLUMN: &str = "rows";

/// Multiplies per-step row estimates together, clamping at `u64::MAX` and stopping at the first
/// step which would overflow. No steps gives 1.
pub fn multiply_row_estimates<I>(estimates: I) -> u64
where
    I: IntoIterator<Item = u64>,
{
    let mut inspected_rows: u128 = 1;
    for rows in estimates {
        inspected_rows *= rows as u128;
        if inspected_rows > u64::MAX as u128 {
            return u64::MAX;
        }
    }
    inspected_rows as u64
}

/// Reads the plan MySQL would use for a query.
pub struct QueryPlanner<'a, A: Adapter> {
    adapter: &'a A,
    select: &'a str,
    bind: &'a [SqlValue],
}

impl<'a, A: Adapter> QueryPlanner<'a, A> {
    pub fn new(adapter: &'a A, select: &'a str, bind: &'a [SqlValue]) -> Self {
        QueryPlanner { adapter, select, bind }
    }

    /// One row per access step, fetched fresh on every call.
    pub async fn get_plan(&self) -> Result<Vec<ResultRow>, A::Error> {
        self.adapter.query(&format!("EXPLAIN {}", self.select), self.bind).await
    }

    /// Product of every step's `rows` estimate. A missing or `NULL` estimate counts as 0.
    pub async fn number_of_rows_inspected(&self) -> Result<u64, A::Error> {
        let plan = self.get_plan().await?;
        let inspected_rows = multiply_row_estimates(
            plan.iter().map(|step| step.get(ROWS_COLUMN).map_or(0, SqlValue::as_row_estimate)),
        );

        debug!("Query plan has {} steps, estimated rows inspected: {}", plan.len(), inspected_rows);

        Ok(inspected_rows)
    }
}

/// Estimates how many rows a query will inspect before it is run.
#[async_trait]
pub trait InspectedRowsEstimator<A: Adapter>: Send + Sync {
    async fn inspected_rows(
        &self,
        adapter: &A,
        select: &str,
        bind: &[SqlValue],
    ) -> Result<u64, A::Error>;
}

/// Estimates using the query's `EXPLAIN` output.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExplainEstimator;

#[async_trait]
impl<A: Adapter> InspectedRowsEstimator<A> for ExplainEstimator {
    async fn inspected_rows(
        &self,
        adapter: &A,
        select: &str,
        bind: &[SqlValue],
    ) -> Result<u64, A::Error> {
        QueryPlanner::new(adapter, select, bind).number_of_rows_inspected().await
    }
}
