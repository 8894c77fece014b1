//! Search result envelope

use serde::{Deserialize, Serialize};

/// One page of search results for resource type `T`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult<T> {
    #[serde(default)]
    pub total_results: u64,
    #[serde(default)]
    pub items_per_page: u64,
    #[serde(default)]
    pub start_index: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub schemas: Vec<String>,
    #[serde(rename = "Resources", default = "Vec::new")]
    pub resources: Vec<T>,
}

impl<T> SearchResult<T> {
    pub fn resources(&self) -> &[T] {
        &self.resources
    }

    pub fn into_resources(self) -> Vec<T> {
        self.resources
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}
