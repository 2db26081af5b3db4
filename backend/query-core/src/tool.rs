//! Agent tool entry point.
//!
//! Folds every outcome of a query into a [`ToolResponse`] so agent
//! frameworks always get a JSON object back, never an error.

use crate::identity::CredentialSource;
use crate::powerbi::QueryTransport;
use crate::query_client::{AuthenticatedQueryClient, QueryOutcome};

use models::{DaxQuery, ToolResponse};

use log::{error, info};

pub async fn run_dax_query<S, T>(
    client: &AuthenticatedQueryClient<S, T>,
    text: &str,
) -> ToolResponse
where
    S: CredentialSource,
    T: QueryTransport,
{
    let query = match DaxQuery::new(text) {
        Ok(query) => query,
        Err(e) => {
            error!("Rejected query before sending: {e}");
            return ToolResponse::error(format!("Invalid query: {e}"));
        }
    };

    match client.execute_with_outcome(&query).await {
        Ok(QueryOutcome {
            result,
            refreshed: false,
        }) => {
            info!("Successfully queried: {query}");
            ToolResponse::success(
                format!("Successfully queried {query} against the Power BI dataset"),
                result,
            )
        }
        Ok(QueryOutcome {
            result,
            refreshed: true,
        }) => {
            info!("Successfully queried after token refresh: {query}");
            ToolResponse::success(
                format!(
                    "Successfully queried {query} against the Power BI dataset after token refresh"
                ),
                result,
            )
        }
        Err(e) => ToolResponse::error(e.detailed_message()),
    }
}
