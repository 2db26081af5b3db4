//! JSON bodies of the `executeQueries` endpoint.

use crate::error::TransportError;

use models::Row;

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteQueriesRequest<'a> {
    queries: Vec<QueryEntry<'a>>,
    serializer_settings: SerializerSettings,
}

#[derive(Debug, Serialize)]
struct QueryEntry<'a> {
    query: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SerializerSettings {
    include_nulls: bool,
}

impl<'a> ExecuteQueriesRequest<'a> {
    pub fn single(query: &'a str, include_nulls: bool) -> Self {
        Self {
            queries: vec![QueryEntry { query }],
            serializer_settings: SerializerSettings { include_nulls },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ExecuteQueriesResponse {
    #[serde(default)]
    results: Vec<ExecuteQueryResult>,
    #[serde(default)]
    error: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ExecuteQueryResult {
    #[serde(default)]
    tables: Vec<ResultTable>,
    #[serde(default)]
    error: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ResultTable {
    #[serde(default)]
    rows: Vec<Row>,
    #[serde(default)]
    error: Option<Value>,
}

impl ExecuteQueriesResponse {
    /// Rows of the first table of the first result.
    ///
    /// Error objects embedded in a 200 response are reported as decode
    /// failures, as is a response without any table.
    #[track_caller]
    pub fn into_first_table_rows(self) -> Result<Vec<Row>, TransportError> {
        if let Some(error) = self.error {
            return Err(TransportError::decode(format!(
                "dataset reported an error: {error}"
            )));
        }

        let result = self
            .results
            .into_iter()
            .next()
            .ok_or_else(|| TransportError::decode("response contains no results"))?;

        if let Some(error) = result.error {
            return Err(TransportError::decode(format!(
                "query reported an error: {error}"
            )));
        }

        let table = result
            .tables
            .into_iter()
            .next()
            .ok_or_else(|| TransportError::decode("result contains no tables"))?;

        if let Some(error) = table.error {
            return Err(TransportError::decode(format!(
                "table reported an error: {error}"
            )));
        }

        Ok(table.rows)
    }
}
