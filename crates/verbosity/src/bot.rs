//! Inbound bot protocol: callback parsing, signature verification, command
//! tokenization and action-URL construction.
//!
//! The platform signs callback bodies with `base64(hmac_sha256(bkey, body))`
//! where `bkey` is the big-endian byte form of the first 20 hex characters of
//! the API token parsed as an integer. The remainder of the token is the bot
//! token used in outbound payloads (see [`Client::bot_token`]).

use std::collections::HashMap;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use hmac::{Hmac, Mac};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::{errors::Error, Client, Result};

type HmacSha256 = Hmac<Sha256>;

/// Length of the hex-encoded signature key prefix of the API token.
const KEY_HEX_LEN: usize = 20;

/// A typed block of parsed message text (plain text, mention, link, ...).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub value: String,
}

/// One inbound message/event notification. Transient, parsed per request.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BotRequest {
    pub user_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_unique_name: Option<String>,
    pub post_no: i64,
    pub chat_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<i64>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub text_parsed: Vec<TextBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_no: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_guid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<String>,
}

/// One inbound action/callback notification.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionRequest {
    pub user_id: i64,
    pub chat_id: i64,
    pub post_no: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<i64>,
    pub action: String,
    #[serde(default)]
    pub params: HashMap<String, String>,
}

impl BotRequest {
    /// Decode an inbound message notification. Malformed or empty input is a
    /// parse error.
    pub fn parse(data: &[u8]) -> Result<Self> {
        serde_json::from_slice(data).map_err(Error::Json)
    }

    /// A message is a command iff its text is non-empty and starts with `/`.
    pub fn is_command(&self) -> bool {
        self.text.starts_with('/')
    }

    /// Split the text into the command name (leading `/` included) and its
    /// arguments, on runs of whitespace. Non-commands and empty text yield an
    /// empty name and no arguments.
    pub fn command(&self) -> (String, Vec<String>) {
        if !self.is_command() {
            return (String::new(), Vec::new());
        }
        let mut parts = self.text.split_whitespace();
        let name = parts.next().unwrap_or("").to_string();
        (name, parts.map(str::to_string).collect())
    }

    /// True iff the parsed text contains a mention of the bot itself.
    pub fn is_bot_mentioned(&self) -> bool {
        self.text_parsed
            .iter()
            .any(|b| b.kind == "mention" && b.value == "bot")
    }

    pub fn has_file(&self) -> bool {
        self.file_guid.is_some()
    }

    pub fn has_reply(&self) -> bool {
        self.reply_no.is_some()
    }

    /// True iff there is no text, no file and no attachments.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.file_guid.is_none() && self.attachments.is_empty()
    }

    pub fn reply_text(&self) -> &str {
        self.reply_text.as_deref().unwrap_or("")
    }

    pub fn file_guid(&self) -> &str {
        self.file_guid.as_deref().unwrap_or("")
    }

    pub fn file_name(&self) -> &str {
        self.file_name.as_deref().unwrap_or("")
    }
}

impl ActionRequest {
    /// Decode an inbound action callback.
    pub fn parse(data: &[u8]) -> Result<Self> {
        serde_json::from_slice(data).map_err(Error::Json)
    }
}

impl Client {
    /// Verify the `X-Signature` of an inbound callback body.
    ///
    /// Returns `Ok(false)` on a mismatched signature; a token that is too
    /// short to hold the key, or whose key part is not valid hex, is an
    /// explicit error instead.
    pub fn verify_signature(&self, body: &str, signature: &str) -> Result<bool> {
        let token = self.api_token();
        if token.len() < KEY_HEX_LEN {
            return Err(Error::InvalidArgument("API token is too short".to_string()));
        }
        let key_hex = token.get(..KEY_HEX_LEN).ok_or_else(|| {
            Error::InvalidArgument("API token key is not valid hex".to_string())
        })?;
        let key_int = u128::from_str_radix(key_hex, 16).map_err(|_| {
            Error::InvalidArgument("API token key is not valid hex".to_string())
        })?;

        let mut mac = HmacSha256::new_from_slice(&signature_key_bytes(key_int))
            .expect("hmac accepts any key length");
        mac.update(body.as_bytes());
        let expected = BASE64.encode(mac.finalize().into_bytes());

        // Plain comparison, matching the platform's own check; the signature
        // is not secret material.
        Ok(expected == signature)
    }
}

/// Minimal big-endian byte form of the key integer, leading zero bytes
/// stripped (zero itself is an empty key).
fn signature_key_bytes(n: u128) -> Vec<u8> {
    let bytes = n.to_be_bytes();
    let first = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    bytes[first..].to_vec()
}

// Everything except ASCII alphanumerics and the RFC 3986 unreserved marks.
const URL_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Build a `bot://` action URI for interactive buttons/links.
///
/// Format: `bot://{action}?title={title}` followed by `&{key}={value}` per
/// parameter. Everything is percent-encoded; parameter order follows the
/// map's iteration order and is not guaranteed.
pub fn action_url(action: &str, title: &str, params: &HashMap<String, String>) -> String {
    let mut url = format!(
        "bot://{}?title={}",
        utf8_percent_encode(action, URL_ESCAPE),
        utf8_percent_encode(title, URL_ESCAPE)
    );
    for (key, value) in params {
        url.push('&');
        url.push_str(&utf8_percent_encode(key, URL_ESCAPE).to_string());
        url.push('=');
        url.push_str(&utf8_percent_encode(value, URL_ESCAPE).to_string());
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Config;

    // First 20 chars parse as 0x0123456789abcdef0123.
    const TOKEN: &str = "0123456789abcdef0123rest-of-the-api-token";

    fn client(token: &str) -> Client {
        Client::new(Config::new("https://a", "https://f", token).unwrap()).unwrap()
    }

    fn sign(key: &[u8], body: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(key).unwrap();
        mac.update(body.as_bytes());
        BASE64.encode(mac.finalize().into_bytes())
    }

    #[test]
    fn signature_key_is_minimal_big_endian() {
        assert_eq!(
            signature_key_bytes(0x0123456789abcdef0123),
            vec![0x01, 0x23, 0x45, 0x67, 0x89, 0xab, 0xcd, 0xef, 0x01, 0x23]
        );
        assert_eq!(signature_key_bytes(0xff), vec![0xff]);
        assert_eq!(signature_key_bytes(0), Vec::<u8>::new());
    }

    #[test]
    fn accepts_matching_signature() {
        let key = [0x01, 0x23, 0x45, 0x67, 0x89, 0xab, 0xcd, 0xef, 0x01, 0x23];
        let body = r#"{"chat_id":1,"text":"hello"}"#;
        let sig = sign(&key, body);
        assert!(client(TOKEN).verify_signature(body, &sig).unwrap());
    }

    #[test]
    fn rejects_mutated_body_or_signature() {
        let key = [0x01, 0x23, 0x45, 0x67, 0x89, 0xab, 0xcd, 0xef, 0x01, 0x23];
        let body = r#"{"chat_id":1,"text":"hello"}"#;
        let sig = sign(&key, body);

        let mutated_body = body.replace("hello", "hellp");
        assert!(!client(TOKEN).verify_signature(&mutated_body, &sig).unwrap());

        let mut mutated_sig = sig.into_bytes();
        mutated_sig[0] ^= 1;
        let mutated_sig = String::from_utf8(mutated_sig).unwrap();
        assert!(!client(TOKEN).verify_signature(body, &mutated_sig).unwrap());
    }

    #[test]
    fn short_token_is_an_error_not_false() {
        let err = client("too-short").verify_signature("body", "sig").unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn non_hex_key_is_an_error() {
        let err = client("zzzzzzzzzzzzzzzzzzzzrest")
            .verify_signature("body", "sig")
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn parses_bot_request_and_rejects_garbage() {
        let raw = br#"{
            "user_id": 7,
            "post_no": 12,
            "chat_id": 3,
            "text": "/deploy prod",
            "text_parsed": [{"type": "mention", "value": "bot"}],
            "reply_no": 11,
            "attachments": ["g1"]
        }"#;
        let req = BotRequest::parse(raw).unwrap();
        assert_eq!(req.user_id, 7);
        assert_eq!(req.organization_id, None);
        assert!(req.has_reply());
        assert!(req.is_bot_mentioned());

        assert!(matches!(BotRequest::parse(b"").unwrap_err(), Error::Json(_)));
        assert!(matches!(BotRequest::parse(b"{nope").unwrap_err(), Error::Json(_)));
    }

    #[test]
    fn parses_action_request() {
        let raw = br#"{
            "user_id": 7,
            "chat_id": 3,
            "post_no": 12,
            "action": "approve",
            "params": {"ticket": "T-9"}
        }"#;
        let req = ActionRequest::parse(raw).unwrap();
        assert_eq!(req.action, "approve");
        assert_eq!(req.params["ticket"], "T-9");
        assert!(matches!(ActionRequest::parse(b"[]").unwrap_err(), Error::Json(_)));
    }

    #[test]
    fn command_tokenization() {
        let req = BotRequest {
            text: "/start some args".to_string(),
            ..Default::default()
        };
        assert!(req.is_command());
        let (name, args) = req.command();
        assert_eq!(name, "/start");
        assert_eq!(args, vec!["some", "args"]);

        let req = BotRequest {
            text: "/only\t tabs\nand newlines ".to_string(),
            ..Default::default()
        };
        let (name, args) = req.command();
        assert_eq!(name, "/only");
        assert_eq!(args, vec!["tabs", "and", "newlines"]);

        let empty = BotRequest::default();
        assert!(!empty.is_command());
        assert_eq!(empty.command(), (String::new(), Vec::new()));

        let plain = BotRequest {
            text: "hello /start".to_string(),
            ..Default::default()
        };
        assert!(!plain.is_command());
    }

    #[test]
    fn mention_requires_bot_value() {
        let mention = |kind: &str, value: &str| BotRequest {
            text_parsed: vec![TextBlock {
                kind: kind.to_string(),
                value: value.to_string(),
            }],
            ..Default::default()
        };
        assert!(mention("mention", "bot").is_bot_mentioned());
        assert!(!mention("mention", "alice").is_bot_mentioned());
        assert!(!mention("text", "bot").is_bot_mentioned());
    }

    #[test]
    fn is_empty_over_all_combinations() {
        for has_text in [false, true] {
            for has_file in [false, true] {
                for has_attachments in [false, true] {
                    let req = BotRequest {
                        text: if has_text { "hi".to_string() } else { String::new() },
                        file_guid: has_file.then(|| "guid".to_string()),
                        attachments: if has_attachments {
                            vec!["a".to_string()]
                        } else {
                            Vec::new()
                        },
                        ..Default::default()
                    };
                    let expected = !has_text && !has_file && !has_attachments;
                    assert_eq!(req.is_empty(), expected, "text={has_text} file={has_file} att={has_attachments}");
                }
            }
        }
    }

    #[test]
    fn action_url_encodes_components() {
        let url = action_url("a", "T", &HashMap::from([("k".to_string(), "v".to_string())]));
        assert!(url.starts_with("bot://a?title=T"));
        assert!(url.contains("&k=v"));

        let url = action_url(
            "do thing",
            "A & B",
            &HashMap::from([("q".to_string(), "x/y z".to_string())]),
        );
        assert!(url.starts_with("bot://do%20thing?title=A%20%26%20B"));
        assert!(url.contains("&q=x%2Fy%20z"));

        let url = action_url("a", "T", &HashMap::new());
        assert_eq!(url, "bot://a?title=T");
    }

    #[test]
    fn accessor_defaults_for_absent_fields() {
        let req = BotRequest::default();
        assert_eq!(req.reply_text(), "");
        assert_eq!(req.file_guid(), "");
        assert_eq!(req.file_name(), "");
        assert!(!req.has_file());
        assert!(!req.has_reply());
    }
}
