use crate::{QueryResult, ToolResponse, ToolStatus};

use serde_json::json;

/// **VALUE**: Verifies the success envelope shape agents consume.
///
/// **WHY THIS MATTERS**: Agent tool wrappers parse `status`, `message` and `result` by name. A
/// casing change in `status` makes every answer look like a failure.
///
/// **BUG THIS CATCHES**: Would catch if `rename_all = "lowercase"` is dropped.
#[test]
fn given_success_response_when_serialized_then_has_lowercase_status_and_rows() {
    // GIVEN: A success response with one row
    let rows = json!([{"Year": 2022}]);
    let result: QueryResult = serde_json::from_value(rows.clone()).expect("rows");
    let response = ToolResponse::success("ok", result);

    // WHEN: Serializing
    let json = serde_json::to_value(&response).expect("serializes");

    // THEN: Flat envelope
    assert_eq!(json, json!({"status": "success", "message": "ok", "result": rows}));
    assert!(response.is_success());
}

/// **VALUE**: Verifies that error envelopes carry an empty-string result.
///
/// **WHY THIS MATTERS**: Existing agent prompts check `result == ""` to detect failures.
///
/// **BUG THIS CATCHES**: Would catch if error results become `null` or `[]`.
#[test]
fn given_error_response_when_serialized_then_result_is_empty_string() {
    // GIVEN: An error response
    let response = ToolResponse::error("Failed to refresh access token");

    // WHEN: Serializing
    let json = serde_json::to_value(&response).expect("serializes");

    // THEN: Empty-string result
    assert_eq!(json["status"], "error");
    assert_eq!(json["result"], "");
    assert_eq!(response.status, ToolStatus::Error);
}
