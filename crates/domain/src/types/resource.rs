//! Common resource abstractions
//!
//! Every entity managed by the connector carries a server-assigned id and
//! opaque metadata. The generic resource engine only ever looks at the id.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Entity addressable through the resource API
pub trait Resource: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Server-assigned identifier, `None` before creation
    fn id(&self) -> Option<&str>;

    fn meta(&self) -> Option<&Meta> {
        None
    }
}

/// Explicit type tag handed to the generic engine at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceType {
    /// Name used in messages (e.g. "User")
    pub name: &'static str,
    /// Path segment below the resource endpoint (e.g. "Users")
    pub path: &'static str,
}

impl ResourceType {
    pub const USER: Self = Self { name: "User", path: "Users" };
    pub const GROUP: Self = Self { name: "Group", path: "Groups" };
    pub const CLIENT: Self = Self { name: "Client", path: "Client" };

    pub const fn new(name: &'static str, path: &'static str) -> Self {
        Self { name, path }
    }
}

/// Resource metadata; timestamps stay opaque strings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
}
