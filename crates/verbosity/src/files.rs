//! File uploads against the file base URL.
//!
//! Uploads are multipart forms with `chat_id` and `size` fields plus a `data`
//! file part; the server answers with a GUID referencing the stored file.

use std::path::Path;

use reqwest::multipart::{Form, Part};

use crate::{errors::Error, types::FileUploadResponse, Client, Result};

const UPLOAD_PATH: &str = "/new/upload";
const DEFAULT_TEXT_FILENAME: &str = "file.txt";

impl Client {
    /// Upload raw bytes to a chat.
    ///
    /// `POST {file_url}/new/upload`
    pub async fn upload_file_data(
        &self,
        chat_id: i64,
        data: Vec<u8>,
        filename: &str,
    ) -> Result<FileUploadResponse> {
        if chat_id == 0 {
            return Err(Error::InvalidArgument("chat_id must not be zero".to_string()));
        }
        if data.is_empty() {
            return Err(Error::InvalidArgument(
                "file size must be positive".to_string(),
            ));
        }

        let size = data.len();
        let form = Form::new()
            .text("chat_id", chat_id.to_string())
            .text("size", size.to_string())
            .part("data", Part::bytes(data).file_name(filename.to_string()));

        self.post_multipart(UPLOAD_PATH, form).await
    }

    /// Upload a file from disk; the file name on the wire is the path's
    /// final component.
    pub async fn upload_file(&self, chat_id: i64, path: &Path) -> Result<FileUploadResponse> {
        let data = tokio::fs::read(path).await.map_err(Error::Io)?;
        let filename = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or(DEFAULT_TEXT_FILENAME)
            .to_string();
        self.upload_file_data(chat_id, data, &filename).await
    }

    /// Upload text content as a file; an empty filename defaults to
    /// `file.txt`.
    pub async fn upload_text_file(
        &self,
        chat_id: i64,
        content: &str,
        filename: &str,
    ) -> Result<FileUploadResponse> {
        let filename = if filename.is_empty() {
            DEFAULT_TEXT_FILENAME
        } else {
            filename
        };
        self.upload_file_data(chat_id, content.as_bytes().to_vec(), filename)
            .await
    }

    /// Upload the same bytes to several chats, one upload per chat in order.
    /// Stops at the first failure, naming the failing chat id; GUIDs of
    /// earlier successful uploads are not rolled back or reported alongside
    /// the error.
    pub async fn upload_to_chats(
        &self,
        data: &[u8],
        filename: &str,
        chat_ids: &[i64],
    ) -> Result<Vec<String>> {
        if chat_ids.is_empty() {
            return Err(Error::InvalidArgument(
                "chat_ids must not be empty".to_string(),
            ));
        }

        let mut guids = Vec::with_capacity(chat_ids.len());
        for &chat_id in chat_ids {
            let resp = self
                .upload_file_data(chat_id, data.to_vec(), filename)
                .await
                .map_err(|source| Error::Broadcast {
                    chat_id,
                    source: Box::new(source),
                })?;
            guids.push(resp.guid);
        }
        Ok(guids)
    }
}
