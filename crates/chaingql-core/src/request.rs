//! GraphQL-over-HTTP wire types.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use serde_json::Value;

static NEXT_OPERATION_ID: AtomicU64 = AtomicU64::new(1);

/// A GraphQL request body as POSTed to a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphqlRequest {
    pub query: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub variables: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<String>,
}

impl GraphqlRequest {
    /// Create a request with no variables.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            variables: Value::Null,
            operation_name: None,
        }
    }

    pub fn with_variables(mut self, variables: Value) -> Self {
        self.variables = variables;
        self
    }

    pub fn with_operation_name(mut self, name: impl Into<String>) -> Self {
        self.operation_name = Some(name.into());
        self
    }
}

/// Source location attached to a GraphQL error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphqlErrorLocation {
    pub line: u32,
    pub column: u32,
}

/// A single entry of the `errors` array of a GraphQL response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphqlError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<GraphqlErrorLocation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Value>,
}

impl std::fmt::Display for GraphqlError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.locations.first() {
            Some(loc) => write!(f, "{} (line {}, column {})", self.message, loc.line, loc.column),
            None => write!(f, "{}", self.message),
        }
    }
}

/// A GraphQL response envelope.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GraphqlResponse {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<GraphqlError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Value>,
}

impl GraphqlResponse {
    /// Build a successful response carrying `data`.
    pub fn from_data(data: Value) -> Self {
        Self {
            data: Some(data),
            errors: Vec::new(),
            extensions: None,
        }
    }

    /// Returns `true` if the server reported no GraphQL errors.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Whether an operation reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Query,
    Mutation,
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Query => write!(f, "query"),
            Self::Mutation => write!(f, "mutation"),
        }
    }
}

/// A request travelling through a link chain.
#[derive(Debug, Clone)]
pub struct Operation {
    pub id: u64,
    pub kind: OperationKind,
    pub request: GraphqlRequest,
    /// 1-based attempt number, set by the retry link.
    pub attempt: u32,
    /// `false` while a retry link above will re-issue transient failures.
    pub final_attempt: bool,
}

impl Operation {
    /// Wrap a request, assigning it a process-unique id.
    pub fn new(kind: OperationKind, request: GraphqlRequest) -> Self {
        Self {
            id: NEXT_OPERATION_ID.fetch_add(1, Ordering::Relaxed),
            kind,
            request,
            attempt: 1,
            final_attempt: true,
        }
    }

    pub fn query(request: GraphqlRequest) -> Self {
        Self::new(OperationKind::Query, request)
    }

    pub fn mutation(request: GraphqlRequest) -> Self {
        Self::new(OperationKind::Mutation, request)
    }

    /// Operation name for logs, `"anonymous"` if the request has none.
    pub fn name(&self) -> &str {
        self.request.operation_name.as_deref().unwrap_or("anonymous")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_serialization() {
        let req = GraphqlRequest::new("query Block($n: Long) { block(number: $n) { hash } }")
            .with_variables(json!({ "n": 12 }))
            .with_operation_name("Block");
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("\"operationName\":\"Block\""));
        assert!(json.contains("\"variables\":{\"n\":12}"));
    }

    #[test]
    fn request_without_variables_omits_them() {
        let json = serde_json::to_string(&GraphqlRequest::new("{ __typename }")).unwrap();
        assert_eq!(json, r#"{"query":"{ __typename }"}"#);
    }

    #[test]
    fn response_with_errors() {
        let resp: GraphqlResponse = serde_json::from_value(json!({
            "data": null,
            "errors": [{
                "message": "Cannot query field \"foo\" on type \"Query\".",
                "locations": [{ "line": 1, "column": 3 }]
            }]
        }))
        .unwrap();
        assert!(!resp.is_ok());
        assert_eq!(resp.errors[0].locations[0].column, 3);
        assert!(resp.errors[0].to_string().contains("line 1, column 3"));
    }

    #[test]
    fn operation_ids_are_unique() {
        let a = Operation::query(GraphqlRequest::new("{ a }"));
        let b = Operation::query(GraphqlRequest::new("{ b }"));
        assert_ne!(a.id, b.id);
        assert_eq!(a.name(), "anonymous");
        assert_eq!(a.attempt, 1);
        assert!(a.final_attempt);
    }
}
