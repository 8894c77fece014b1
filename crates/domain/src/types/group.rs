//! SCIM group resource

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::resource::{Meta, Resource};
use super::user::MemberRef;

pub const GROUP_SCHEMA: &str = "urn:ietf:params:scim:schemas:core:2.0:Group";

/// SCIM group
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub schemas: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<MemberRef>,
    #[serde(flatten)]
    pub extensions: Map<String, Value>,
}

impl Group {
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            schemas: vec![GROUP_SCHEMA.to_string()],
            display_name: Some(display_name.into()),
            ..Default::default()
        }
    }

    pub fn with_member(mut self, member_id: impl Into<String>) -> Self {
        self.members.push(MemberRef::new(member_id));
        self
    }

    pub fn has_member(&self, member_id: &str) -> bool {
        self.members.iter().any(|member| member.value == member_id)
    }
}

impl Resource for Group {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn meta(&self) -> Option<&Meta> {
        self.meta.as_ref()
    }
}
