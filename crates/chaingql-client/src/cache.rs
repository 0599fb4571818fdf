//! In-memory response cache keyed by the serialized request.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chaingql_core::request::{GraphqlRequest, GraphqlResponse};

/// Thread-safe response cache. Entries live until evicted or cleared.
#[derive(Debug, Default)]
pub struct ResponseCache {
    entries: Mutex<HashMap<String, GraphqlResponse>>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache key: query, variables and operation name as canonical JSON.
    fn key(request: &GraphqlRequest) -> String {
        serde_json::to_string(request).unwrap_or_else(|_| request.query.clone())
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, GraphqlResponse>> {
        // a poisoned map is still structurally valid
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn read(&self, request: &GraphqlRequest) -> Option<GraphqlResponse> {
        self.lock().get(&Self::key(request)).cloned()
    }

    pub fn write(&self, request: &GraphqlRequest, response: GraphqlResponse) {
        self.lock().insert(Self::key(request), response);
    }

    /// Remove one entry. Returns `true` if it was present.
    pub fn evict(&self, request: &GraphqlRequest) -> bool {
        self.lock().remove(&Self::key(request)).is_some()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
