//! Message sending and updating.
//!
//! Outbound chat messages carry the derived bot token (see
//! [`Client::bot_token`]) in the `key` field. Private messages support three
//! addressing modes which all funnel into one request shape; exactly one
//! identifier is ever populated because the payload is built internally.

use serde::Serialize;

use crate::{
    errors::Error,
    types::{MessageResponse, PrivateMessageResponse, UpdateMessageRequest, UpdateMessageResponse},
    Client, Result,
};

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    key: &'a str,
    chat_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_no: Option<i64>,
}

#[derive(Debug, Default, Serialize)]
struct PrivateMessageRequest<'a> {
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_unique_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_no: Option<i64>,
}

impl Client {
    /// Send a message to a non-private chat, optionally as a reply.
    ///
    /// `POST /bot/message`
    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        reply_no: Option<i64>,
    ) -> Result<MessageResponse> {
        if chat_id == 0 {
            return Err(Error::InvalidArgument("chat_id must not be zero".to_string()));
        }
        if text.is_empty() {
            return Err(Error::InvalidArgument("text must not be empty".to_string()));
        }

        let body = SendMessageRequest {
            key: self.bot_token(),
            chat_id,
            text,
            reply_no,
        };
        self.post_json("/bot/message", &body).await
    }

    /// Send a reply to a specific post.
    pub async fn send_reply(&self, chat_id: i64, post_no: i64, text: &str) -> Result<MessageResponse> {
        self.send_message(chat_id, text, Some(post_no)).await
    }

    /// Send a message mentioning everyone in the chat.
    pub async fn send_mention_message(&self, chat_id: i64, text: &str) -> Result<MessageResponse> {
        self.send_message(chat_id, &format!("@all {text}"), None).await
    }

    /// Send a private message addressed by user id.
    ///
    /// `POST /msg/post/private`
    pub async fn send_private_message_by_id(
        &self,
        user_id: i64,
        text: &str,
        reply_no: Option<i64>,
    ) -> Result<PrivateMessageResponse> {
        if user_id == 0 {
            return Err(Error::InvalidArgument("user_id must not be zero".to_string()));
        }
        self.send_private(PrivateMessageRequest {
            text,
            user_id: Some(user_id),
            reply_no,
            ..Default::default()
        })
        .await
    }

    /// Send a private message addressed by email.
    pub async fn send_private_message_by_email(
        &self,
        email: &str,
        text: &str,
        reply_no: Option<i64>,
    ) -> Result<PrivateMessageResponse> {
        if email.is_empty() {
            return Err(Error::InvalidArgument("email must not be empty".to_string()));
        }
        self.send_private(PrivateMessageRequest {
            text,
            user_email: Some(email),
            reply_no,
            ..Default::default()
        })
        .await
    }

    /// Send a private message addressed by unique name.
    pub async fn send_private_message_by_unique_name(
        &self,
        unique_name: &str,
        text: &str,
        reply_no: Option<i64>,
    ) -> Result<PrivateMessageResponse> {
        if unique_name.is_empty() {
            return Err(Error::InvalidArgument(
                "unique_name must not be empty".to_string(),
            ));
        }
        self.send_private(PrivateMessageRequest {
            text,
            user_unique_name: Some(unique_name),
            reply_no,
            ..Default::default()
        })
        .await
    }

    /// Send a private reply to a specific post.
    pub async fn send_private_reply(
        &self,
        user_id: i64,
        reply_post_no: i64,
        text: &str,
    ) -> Result<PrivateMessageResponse> {
        self.send_private_message_by_id(user_id, text, Some(reply_post_no))
            .await
    }

    async fn send_private(
        &self,
        body: PrivateMessageRequest<'_>,
    ) -> Result<PrivateMessageResponse> {
        if body.text.is_empty() {
            return Err(Error::InvalidArgument("text must not be empty".to_string()));
        }
        self.post_json("/msg/post/private", &body).await
    }

    /// Send the same message to multiple chats, one request per chat in
    /// order. Stops at the first failure, naming the failing chat id;
    /// earlier sends are not rolled back.
    pub async fn broadcast_message(
        &self,
        chat_ids: &[i64],
        text: &str,
    ) -> Result<Vec<MessageResponse>> {
        if chat_ids.is_empty() {
            return Err(Error::InvalidArgument(
                "chat_ids must not be empty".to_string(),
            ));
        }

        let mut responses = Vec::with_capacity(chat_ids.len());
        for &chat_id in chat_ids {
            let resp = self
                .send_message(chat_id, text, None)
                .await
                .map_err(|source| Error::Broadcast {
                    chat_id,
                    source: Box::new(source),
                })?;
            responses.push(resp);
        }
        Ok(responses)
    }

    /// Update an existing message. Optional fields of the request are applied
    /// independently; the text is required.
    ///
    /// `PUT /msg/post/{chat_id}/{post_no}`
    pub async fn update_message(
        &self,
        chat_id: i64,
        post_no: i64,
        update: &UpdateMessageRequest,
    ) -> Result<UpdateMessageResponse> {
        if chat_id == 0 {
            return Err(Error::InvalidArgument("chat_id must not be zero".to_string()));
        }
        if post_no == 0 {
            return Err(Error::InvalidArgument("post_no must not be zero".to_string()));
        }
        if update.text.is_empty() {
            return Err(Error::InvalidArgument("text must not be empty".to_string()));
        }

        self.put_json(&format!("/msg/post/{chat_id}/{post_no}"), update)
            .await
    }

    /// Update a message's text and attachment list.
    pub async fn update_message_with_attachments(
        &self,
        chat_id: i64,
        post_no: i64,
        text: &str,
        attachments: Vec<String>,
    ) -> Result<UpdateMessageResponse> {
        let update = UpdateMessageRequest {
            text: text.to_string(),
            attachments: Some(attachments),
            ..Default::default()
        };
        self.update_message(chat_id, post_no, &update).await
    }

    /// Update a message's text and reply reference.
    pub async fn update_message_with_reply(
        &self,
        chat_id: i64,
        post_no: i64,
        reply_post_no: i64,
        text: &str,
    ) -> Result<UpdateMessageResponse> {
        let update = UpdateMessageRequest {
            text: text.to_string(),
            reply_no: Some(reply_post_no),
            ..Default::default()
        };
        self.update_message(chat_id, post_no, &update).await
    }

    /// Update a message's text and end-to-end flag.
    pub async fn update_message_e2e(
        &self,
        chat_id: i64,
        post_no: i64,
        text: &str,
        e2e: bool,
    ) -> Result<UpdateMessageResponse> {
        let update = UpdateMessageRequest {
            text: text.to_string(),
            e2e: Some(e2e),
            ..Default::default()
        };
        self.update_message(chat_id, post_no, &update).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_request_carries_key_and_omits_absent_reply() {
        let body = SendMessageRequest {
            key: "bot-key",
            chat_id: 5,
            text: "hi",
            reply_no: None,
        };
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"key":"bot-key","chat_id":5,"text":"hi"}"#);

        let body = SendMessageRequest {
            reply_no: Some(9),
            ..body
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains(r#""reply_no":9"#));
    }

    #[test]
    fn private_request_serializes_exactly_one_identifier() {
        let by_id = PrivateMessageRequest {
            text: "hi",
            user_id: Some(3),
            ..Default::default()
        };
        let json = serde_json::to_string(&by_id).unwrap();
        assert_eq!(json, r#"{"text":"hi","user_id":3}"#);

        let by_email = PrivateMessageRequest {
            text: "hi",
            user_email: Some("a@b.io"),
            ..Default::default()
        };
        let json = serde_json::to_string(&by_email).unwrap();
        assert_eq!(json, r#"{"text":"hi","user_email":"a@b.io"}"#);

        let by_name = PrivateMessageRequest {
            text: "hi",
            user_unique_name: Some("alice"),
            ..Default::default()
        };
        let json = serde_json::to_string(&by_name).unwrap();
        assert_eq!(json, r#"{"text":"hi","user_unique_name":"alice"}"#);
    }
}
