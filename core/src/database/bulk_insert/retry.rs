use tracing::warn;

use crate::database::adapter::Adapter;

/// Executes `sql` and returns the affected-row count, re-issuing the identical statement for as
/// long as the adapter reports a transient lock conflict. There is no cap and no backoff, a
/// caller needing bounded latency has to wrap the call in its own timeout.
///
/// Any other error is returned untouched on first sight.
pub async fn execute_with_deadlock_retry<A: Adapter>(
    adapter: &A,
    sql: &str,
) -> Result<u64, A::Error> {
    let mut attempt: u64 = 1;
    loop {
        match adapter.execute(sql).await {
            Ok(affected_rows) => return Ok(affected_rows),
            Err(e) if adapter.is_transient_conflict(&e) => {
                warn!("Deadlock on bulk write (attempt {}), retrying: {}", attempt, e);
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
