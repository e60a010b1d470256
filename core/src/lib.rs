// public
pub mod config;

mod database;
pub use database::{
    adapter::{is_deadlock_message, Adapter, PreparedStatement},
    big_result::{
        multiply_row_estimates, BigResult, BigResultCursor, BigResultError, BigResultOptions,
        ExplainEstimator, InspectedRowsEstimator, QueryPlanner,
    },
    bulk_insert::{
        build_insert_sql, execute_with_deadlock_retry, resolve_update_fields, BulkInsert,
        BulkInsertOptions, BulkInsertStats, StatsLedger, UpdateField,
    },
    quote::{MySqlQuote, Quote},
    value::{ResultRow, SqlFragment, SqlValue},
};

mod logger;
pub use logger::{setup_info_logger, setup_logger};

// export 3rd party dependencies
pub use async_trait::async_trait;
pub use tracing::level_filters::LevelFilter;
