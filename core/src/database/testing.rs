//! Scripted database double used by the unit tests.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;

use crate::database::{
    adapter::{Adapter, PreparedStatement},
    quote::{MySqlQuote, Quote},
    value::{ResultRow, SqlValue},
};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("{0}")]
pub struct MockDbError(pub String);

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Execute(String),
    Query(String, Vec<SqlValue>),
    Prepare(String),
    StatementExecute(Vec<SqlValue>),
    Fork,
    DisableBuffering,
}

#[derive(Default)]
struct Script {
    calls: Vec<Call>,
    execute_results: VecDeque<Result<u64, MockDbError>>,
    query_results: VecDeque<Vec<ResultRow>>,
    statement_rows: Vec<ResultRow>,
}

/// Records every call made against it. `execute` answers from a queue of scripted results and
/// falls back to a default affected-row count once the queue is empty.
#[derive(Clone)]
pub struct MockAdapter {
    script: Arc<Mutex<Script>>,
    default_affected_rows: u64,
    session: usize,
}

impl MockAdapter {
    pub fn new() -> Self {
        MockAdapter { script: Arc::default(), default_affected_rows: 1, session: 0 }
    }

    pub fn with_default_affected_rows(mut self, affected: u64) -> Self {
        self.default_affected_rows = affected;
        self
    }

    pub fn push_execute_result(&self, result: Result<u64, MockDbError>) {
        self.script.lock().unwrap().execute_results.push_back(result);
    }

    pub fn push_query_result(&self, rows: Vec<ResultRow>) {
        self.script.lock().unwrap().query_results.push_back(rows);
    }

    pub fn set_statement_rows(&self, rows: Vec<ResultRow>) {
        self.script.lock().unwrap().statement_rows = rows;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.script.lock().unwrap().calls.clone()
    }

    pub fn executed_sql(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Execute(sql) => Some(sql),
                _ => None,
            })
            .collect()
    }

    pub fn session(&self) -> usize {
        self.session
    }

    fn record(&self, call: Call) {
        self.script.lock().unwrap().calls.push(call);
    }
}

pub fn plan_rows(estimates: &[SqlValue]) -> Vec<ResultRow> {
    estimates
        .iter()
        .enumerate()
        .map(|(i, rows)| ResultRow::new(vec![
            ("id".to_string(), SqlValue::UInt(i as u64 + 1)),
            ("rows".to_string(), rows.clone()),
        ]))
        .collect()
}

#[async_trait]
impl Adapter for MockAdapter {
    type Error = MockDbError;
    type Statement = MockStatement;

    fn quote(&self) -> &dyn Quote {
        &MySqlQuote
    }

    async fn execute(&self, sql: &str) -> Result<u64, MockDbError> {
        self.record(Call::Execute(sql.to_string()));
        let scripted = self.script.lock().unwrap().execute_results.pop_front();
        scripted.unwrap_or(Ok(self.default_affected_rows))
    }

    async fn query(&self, sql: &str, bind: &[SqlValue]) -> Result<Vec<ResultRow>, MockDbError> {
        self.record(Call::Query(sql.to_string(), bind.to_vec()));
        Ok(self.script.lock().unwrap().query_results.pop_front().unwrap_or_default())
    }

    async fn prepare(&self, sql: &str) -> Result<MockStatement, MockDbError> {
        self.record(Call::Prepare(sql.to_string()));
        let rows = self.script.lock().unwrap().statement_rows.clone();
        Ok(MockStatement { script: self.script.clone(), rows: rows.into(), executed: false })
    }

    async fn fork(&self) -> Result<Self, MockDbError> {
        self.record(Call::Fork);
        Ok(MockAdapter { session: self.session + 1, ..self.clone() })
    }

    async fn disable_buffering(&mut self) -> Result<(), MockDbError> {
        self.record(Call::DisableBuffering);
        Ok(())
    }
}

pub struct MockStatement {
    script: Arc<Mutex<Script>>,
    rows: VecDeque<ResultRow>,
    executed: bool,
}

#[async_trait]
impl PreparedStatement for MockStatement {
    type Error = MockDbError;

    async fn execute(&mut self, bind: &[SqlValue]) -> Result<(), MockDbError> {
        self.script.lock().unwrap().calls.push(Call::StatementExecute(bind.to_vec()));
        self.executed = true;
        Ok(())
    }

    async fn fetch(&mut self) -> Result<Option<ResultRow>, MockDbError> {
        if !self.executed {
            return Err(MockDbError("statement has not been executed".to_string()));
        }
        Ok(self.rows.pop_front())
    }
}
