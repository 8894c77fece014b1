//! SCIM user resource
//!
//! Only the commonly used core attributes are typed. Anything else the server
//! sends (enterprise extension, custom schemas) is kept in `extensions` and
//! written back untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::resource::{Meta, Resource};

pub const USER_SCHEMA: &str = "urn:ietf:params:scim:schemas:core:2.0:User";

/// Structured name of a user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Name {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub honorific_prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub honorific_suffix: Option<String>,
}

/// Multi-valued attribute entry (emails, phone numbers, ...)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiValued {
    pub value: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

impl MultiValued {
    pub fn new(value: impl Into<String>) -> Self {
        Self { value: value.into(), ..Default::default() }
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn primary(mut self) -> Self {
        self.primary = Some(true);
        self
    }
}

/// Reference from a user to a group, or from a group to a member
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRef {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl MemberRef {
    pub fn new(value: impl Into<String>) -> Self {
        Self { value: value.into(), ..Default::default() }
    }
}

/// SCIM user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub schemas: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Name>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nick_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    /// Write-only; servers never return it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub emails: Vec<MultiValued>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub phone_numbers: Vec<MultiValued>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<MemberRef>,
    #[serde(flatten)]
    pub extensions: Map<String, Value>,
}

impl User {
    pub fn new(user_name: impl Into<String>) -> Self {
        Self {
            schemas: vec![USER_SCHEMA.to_string()],
            user_name: Some(user_name.into()),
            ..Default::default()
        }
    }

    pub fn primary_email(&self) -> Option<&str> {
        self.emails
            .iter()
            .find(|email| email.primary == Some(true))
            .or_else(|| self.emails.first())
            .map(|email| email.value.as_str())
    }
}

impl Resource for User {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn meta(&self) -> Option<&Meta> {
        self.meta.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_unknown_attributes_round_trip() {
        let body = json!({
            "id": "cef9452e-00a9-4cec-a086-d171374ffbef",
            "userName": "marissa",
            "meta": {"created": "2011-10-10T00:00:00.000+02:00", "resourceType": "User"},
            "urn:ietf:params:scim:schemas:extension:enterprise:2.0:User": {
                "employeeNumber": "701984"
            },
            "x509Certificates": [{"value": "MIIDQzCCAqygAwIBAgICEAAwDQYJKoZIhvcNAQEFBQAwTjELMAkGA1UEBhMCVVMx"}]
        });

        let user: User = serde_json::from_value(body.clone()).unwrap();
        assert_eq!(user.id(), Some("cef9452e-00a9-4cec-a086-d171374ffbef"));
        assert_eq!(user.extensions.len(), 2);

        let written = serde_json::to_value(&user).unwrap();
        assert_eq!(written, body);
    }

    #[test]
    fn test_password_is_not_written_when_absent() {
        let user = User::new("marissa");
        let written = serde_json::to_value(&user).unwrap();

        assert!(written.get("password").is_none());
        assert_eq!(written["userName"], "marissa");
        assert_eq!(written["schemas"][0], USER_SCHEMA);
    }

    #[test]
    fn test_primary_email() {
        let mut user = User::new("marissa");
        user.emails = vec![
            MultiValued::new("home@example.com").with_kind("home"),
            MultiValued::new("work@example.com").with_kind("work").primary(),
        ];
        assert_eq!(user.primary_email(), Some("work@example.com"));
    }
}
