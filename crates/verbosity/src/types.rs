//! Typed JSON resources mirroring the Verbosity API wire format.
//!
//! Optional relations are `Option`s, never sentinel zeroes: `0` looks like a
//! valid id upstream but means nothing, so absence must stay explicit.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user snapshot, fetched fresh per call.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub unique_name: String,
    #[serde(default)]
    pub info: String,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub is_bot: bool,
    /// Ids of organizations the user belongs to.
    #[serde(default)]
    pub organizations: Vec<i64>,
    #[serde(default)]
    pub time_created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub time_updated: Option<DateTime<Utc>>,
}

/// A chat snapshot. Member and admin lists keep server order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Owning organization, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<i64>,
    #[serde(default)]
    pub allow_api: bool,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default)]
    pub posts_count: i64,
    /// True for private (person-to-person) chats.
    #[serde(default)]
    pub pm: bool,
    #[serde(default)]
    pub e2e: bool,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub author_id: i64,
    #[serde(default)]
    pub member_ids: Vec<i64>,
    #[serde(default)]
    pub admin_ids: Vec<i64>,
    #[serde(default)]
    pub group_ids: Vec<i64>,
    #[serde(default)]
    pub guests: Vec<i64>,
    #[serde(default)]
    pub time_created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub time_updated: Option<DateTime<Utc>>,
}

/// An organization snapshot.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Org {
    pub id: i64,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub email_domain: String,
    #[serde(default)]
    pub default_chat_id: i64,
    /// Whether the calling bot is a member / admin of this organization.
    #[serde(default)]
    pub is_member: bool,
    #[serde(default)]
    pub is_admin: bool,
    /// Lifecycle state, e.g. `active`.
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub users: Vec<i64>,
    #[serde(default)]
    pub admins: Vec<i64>,
    #[serde(default)]
    pub groups: Vec<i64>,
    #[serde(default)]
    pub guests: Vec<i64>,
    #[serde(default)]
    pub time_created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub time_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UsersResponse {
    #[serde(default)]
    pub users: Vec<User>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatsResponse {
    #[serde(default)]
    pub chats: Vec<Chat>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatSyncResponse {
    #[serde(default)]
    pub chats: Vec<i64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OrgsResponse {
    #[serde(default)]
    pub orgs: Vec<Org>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OrgSyncResponse {
    #[serde(default)]
    pub ids: Vec<i64>,
}

/// Acknowledgment for a message sent to a chat.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct MessageResponse {
    pub post_no: i64,
}

/// Acknowledgment for a private message; the chat may have just been created.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct PrivateMessageResponse {
    pub chat_id: i64,
    pub post_no: i64,
}

/// Acknowledgment for a file upload.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct FileUploadResponse {
    pub guid: String,
}

/// Partial update of an existing message. Every optional field is applied
/// independently; absent fields are left untouched server-side.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateMessageRequest {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub e2e: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_no: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<String>>,
}

/// Acknowledgment for a message update.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateMessageResponse {
    #[serde(default)]
    pub uuid: String,
    pub chat_id: i64,
    pub post_no: i64,
    #[serde(default, rename = "ver", skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,
}

/// The `{code, message}` error envelope.
#[derive(Clone, Debug, Default, Deserialize)]
pub(crate) struct ErrorEnvelope {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

/// The validation-error envelope, discriminated by `tamtam_response_api`.
#[derive(Clone, Debug, Default, Deserialize)]
pub(crate) struct ValidationEnvelope {
    #[serde(default)]
    pub tamtam_response_api: bool,
    #[serde(default)]
    pub field_errors: HashMap<String, String>,
    #[serde(default)]
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_message_request_round_trips_optional_fields() {
        let req = UpdateMessageRequest {
            text: "edited".to_string(),
            e2e: Some(true),
            reply_no: Some(42),
            quote: Some("original".to_string()),
            attachments: Some(vec!["guid-a".to_string(), "guid-b".to_string()]),
        };
        let json = serde_json::to_string(&req).unwrap();
        let back: UpdateMessageRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, req);

        // Absent options must stay absent, not become defaults on the wire.
        let bare = UpdateMessageRequest {
            text: "edited".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_string(&bare).unwrap();
        assert_eq!(json, r#"{"text":"edited"}"#);
        let back: UpdateMessageRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, bare);
    }

    #[test]
    fn update_message_response_round_trips_version() {
        let resp = UpdateMessageResponse {
            uuid: "u-1".to_string(),
            chat_id: 7,
            post_no: 99,
            version: Some(3),
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains(r#""ver":3"#));
        let back: UpdateMessageResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(back, resp);

        let no_ver: UpdateMessageResponse =
            serde_json::from_str(r#"{"uuid":"u-2","chat_id":1,"post_no":2}"#).unwrap();
        assert_eq!(no_ver.version, None);
    }

    #[test]
    fn chat_without_organization_deserializes_as_none() {
        let chat: Chat = serde_json::from_str(r#"{"id":5,"title":"dev"}"#).unwrap();
        assert_eq!(chat.organization_id, None);
        assert!(chat.member_ids.is_empty());
    }
}
