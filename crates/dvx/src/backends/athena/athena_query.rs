// ai
//! 🔎 Athena Query Engine — submit, poll, read the first page of results.
//!
//! Athena returns the header as the first row of the first page. We peel it off
//! into `QueryResults::columns`. Only the first page is read: the pipeline's
//! query is a sanity check, not an export.

use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_athena::types::{QueryExecutionContext, QueryExecutionState, ResultConfiguration};
use serde::Deserialize;
use tracing::trace;

use crate::backends::{QueryEngine, QueryRequest, QueryResults, QueryStatus};

/// 🔧 The `[query]` section. `database`, `sql` and `output_location` have no
/// sensible default, so the query stage refuses to run until they are set.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct QueryConfig {
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub sql: Option<String>,
    /// 📦 `s3://bucket/prefix/` where Athena drops its result files
    #[serde(default)]
    pub output_location: Option<String>,
    #[serde(default = "default_workgroup")]
    pub workgroup: String,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_max_wait_secs")]
    pub max_wait_secs: u64,
}

fn default_workgroup() -> String {
    "primary".to_string()
}

fn default_poll_interval_secs() -> u64 {
    2
}

fn default_max_wait_secs() -> u64 {
    300
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            database: None,
            sql: None,
            output_location: None,
            workgroup: default_workgroup(),
            poll_interval_secs: default_poll_interval_secs(),
            max_wait_secs: default_max_wait_secs(),
        }
    }
}

impl QueryConfig {
    /// 📝 Turn the config into a runnable request, or explain what is missing.
    pub(crate) fn to_request(&self) -> Result<QueryRequest> {
        let sql = self
            .sql
            .clone()
            .context("💀 query.sql is not set. Athena cannot guess what you wanted to ask.")?;
        let database = self
            .database
            .clone()
            .context("💀 query.database is not set. The SQL has nowhere to look.")?;
        let output_location = self
            .output_location
            .clone()
            .context("💀 query.output_location is not set. Athena needs an S3 prefix to write results to.")?;
        Ok(QueryRequest {
            sql,
            database,
            output_location,
            workgroup: self.workgroup.clone(),
        })
    }
}

#[derive(Debug)]
pub(crate) struct AthenaQueryEngine {
    client: aws_sdk_athena::Client,
}

impl AthenaQueryEngine {
    pub(crate) fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: aws_sdk_athena::Client::new(sdk_config),
        }
    }
}

#[async_trait]
impl QueryEngine for AthenaQueryEngine {
    async fn start_query(&self, request: &QueryRequest) -> Result<String> {
        let the_response = self
            .client
            .start_query_execution()
            .query_string(&request.sql)
            .query_execution_context(QueryExecutionContext::builder().database(&request.database).build())
            .result_configuration(
                ResultConfiguration::builder()
                    .output_location(&request.output_location)
                    .build(),
            )
            .work_group(&request.workgroup)
            .send()
            .await
            .context("💀 Athena refused the query. Check database, workgroup and output location.")?;
        the_response
            .query_execution_id()
            .map(str::to_string)
            .context("💀 Athena accepted the query but forgot to say what it was called")
    }

    async fn query_status(&self, execution_id: &str) -> Result<QueryStatus> {
        let the_response = self
            .client
            .get_query_execution()
            .query_execution_id(execution_id)
            .send()
            .await
            .with_context(|| format!("💀 Could not read status of query {}", execution_id))?;
        let the_status = the_response
            .query_execution()
            .and_then(|execution| execution.status());
        let the_reason = the_status
            .and_then(|status| status.state_change_reason())
            .unwrap_or("no reason given")
            .to_string();
        let the_state = the_status.and_then(|status| status.state());
        trace!("🔎 query {} state {:?}", execution_id, the_state);
        Ok(match the_state {
            Some(QueryExecutionState::Succeeded) => QueryStatus::Succeeded,
            Some(QueryExecutionState::Failed) => QueryStatus::Failed(the_reason),
            Some(QueryExecutionState::Cancelled) => QueryStatus::Cancelled(the_reason),
            Some(QueryExecutionState::Running) => QueryStatus::Running,
            _ => QueryStatus::Queued,
        })
    }

    async fn query_results(&self, execution_id: &str) -> Result<QueryResults> {
        let the_response = self
            .client
            .get_query_results()
            .query_execution_id(execution_id)
            .send()
            .await
            .with_context(|| format!("💀 Could not fetch results of query {}", execution_id))?;
        let mut the_rows = the_response
            .result_set()
            .map(|result_set| result_set.rows())
            .unwrap_or_default()
            .iter()
            .map(|row| {
                row.data()
                    .iter()
                    .map(|datum| datum.var_char_value().unwrap_or_default().to_string())
                    .collect::<Vec<String>>()
            });
        let the_columns = the_rows.next().unwrap_or_default();
        Ok(QueryResults {
            columns: the_columns,
            rows: the_rows.collect(),
        })
    }
}
