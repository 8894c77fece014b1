//! Search query value and its builder
//!
//! `start_index` and `count` keep their defaults unless the caller sets them;
//! parameters equal to the defaults are left off the request so the server
//! applies its own.

use std::fmt;

use crate::constants::{DEFAULT_COUNT, DEFAULT_START_INDEX, FETCH_ALL_COUNT};

/// Sort direction for search results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ascending => "ascending",
            Self::Descending => "descending",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only search description
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    filter: Option<String>,
    attributes: Option<String>,
    sort_by: Option<String>,
    sort_order: Option<SortOrder>,
    start_index: u64,
    count: u64,
}

impl Default for Query {
    fn default() -> Self {
        Self {
            filter: None,
            attributes: None,
            sort_by: None,
            sort_order: None,
            start_index: DEFAULT_START_INDEX,
            count: DEFAULT_COUNT,
        }
    }
}

impl Query {
    pub fn builder() -> QueryBuilder {
        QueryBuilder::default()
    }

    /// Query that asks for every resource in one page
    pub fn fetch_all() -> Self {
        QueryBuilder::default().count(FETCH_ALL_COUNT).build()
    }

    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    pub fn attributes(&self) -> Option<&str> {
        self.attributes.as_deref()
    }

    pub fn sort_by(&self) -> Option<&str> {
        self.sort_by.as_deref()
    }

    pub fn sort_order(&self) -> Option<SortOrder> {
        self.sort_order
    }

    pub fn start_index(&self) -> u64 {
        self.start_index
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// Query-string pairs in wire order, with defaults and unset values left out
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(attributes) = &self.attributes {
            pairs.push(("attributes", attributes.clone()));
        }
        if let Some(filter) = &self.filter {
            pairs.push(("filter", filter.clone()));
        }
        if let Some(sort_by) = &self.sort_by {
            pairs.push(("sortBy", sort_by.clone()));
        }
        if let Some(sort_order) = self.sort_order {
            pairs.push(("sortOrder", sort_order.as_str().to_string()));
        }
        if self.start_index != DEFAULT_START_INDEX {
            pairs.push(("startIndex", self.start_index.to_string()));
        }
        if self.count != DEFAULT_COUNT {
            pairs.push(("count", self.count.to_string()));
        }
        pairs
    }
}

/// Fluent builder for [`Query`]
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    query: Query,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// SCIM filter expression, e.g. `userName eq "marissa"`
    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.query.filter = Some(filter.into());
        self
    }

    /// Comma-separated attribute projection
    pub fn attributes(mut self, attributes: impl Into<String>) -> Self {
        self.query.attributes = Some(attributes.into());
        self
    }

    pub fn sort_by(mut self, attribute: impl Into<String>) -> Self {
        self.query.sort_by = Some(attribute.into());
        self
    }

    pub fn sort_order(mut self, order: SortOrder) -> Self {
        self.query.sort_order = Some(order);
        self
    }

    /// 1-based index of the first result
    pub fn start_index(mut self, start_index: u64) -> Self {
        self.query.start_index = start_index;
        self
    }

    pub fn count(mut self, count: u64) -> Self {
        self.query.count = count;
        self
    }

    pub fn build(self) -> Query {
        self.query
    }
}

impl From<&Query> for QueryBuilder {
    fn from(query: &Query) -> Self {
        Self { query: query.clone() }
    }
}
