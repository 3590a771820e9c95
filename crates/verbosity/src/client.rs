//! HTTP transport: request building, auth headers, response decoding and
//! error classification. Resource accessors in the sibling modules delegate
//! to the `pub(crate)` helpers here.

use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::{
    config::Config,
    errors::Error,
    types::{ErrorEnvelope, ValidationEnvelope},
    Result,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// The Verbosity API client.
///
/// Holds immutable configuration and one pooled `reqwest` client; methods are
/// safe to call concurrently from multiple tasks.
#[derive(Clone, Debug)]
pub struct Client {
    config: Config,
    http: reqwest::Client,
}

impl Client {
    /// Create a client from an already-loaded [`Config`].
    pub fn new(config: Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(Error::Http)?;
        Ok(Self { config, http })
    }

    /// Create a client from environment configuration.
    pub fn from_env() -> Result<Self> {
        Self::new(Config::load()?)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The full API token.
    pub fn api_token(&self) -> &str {
        &self.config.api_token
    }

    /// The token used in outbound message payloads: the API token with its
    /// first 20 characters (the signature key part) removed. Tokens of
    /// length <= 20 yield an empty bot token.
    pub fn bot_token(&self) -> &str {
        let token = &self.config.api_token;
        token.get(20..).unwrap_or("")
    }

    // -- Request helpers ----------------------------------------------------

    fn request(&self, method: reqwest::Method, url: String) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .header("X-APIToken", &self.config.api_token)
            .header(reqwest::header::ACCEPT, "application/json")
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_url, path)
    }

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        debug!(path, "GET");
        let mut req = self.request(reqwest::Method::GET, self.api_url(path));
        if !query.is_empty() {
            req = req.query(query);
        }
        let resp = req.send().await.map_err(Error::Http)?;
        self.handle_response(resp).await
    }

    pub(crate) async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        debug!(path, "POST");
        let resp = self
            .request(reqwest::Method::POST, self.api_url(path))
            .json(body)
            .send()
            .await
            .map_err(Error::Http)?;
        self.handle_response(resp).await
    }

    /// POST without a body (e.g. get-or-create private chat).
    pub(crate) async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        debug!(path, "POST");
        let resp = self
            .request(reqwest::Method::POST, self.api_url(path))
            .send()
            .await
            .map_err(Error::Http)?;
        self.handle_response(resp).await
    }

    pub(crate) async fn put_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        debug!(path, "PUT");
        let resp = self
            .request(reqwest::Method::PUT, self.api_url(path))
            .json(body)
            .send()
            .await
            .map_err(Error::Http)?;
        self.handle_response(resp).await
    }

    /// Multipart POST against the file-upload base URL.
    pub(crate) async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<T> {
        let url = format!("{}{}", self.config.file_url, path);
        debug!(path, "POST multipart");
        let resp = self
            .request(reqwest::Method::POST, url)
            .multipart(form)
            .send()
            .await
            .map_err(Error::Http)?;
        self.handle_response(resp).await
    }

    // -- Response handling --------------------------------------------------

    async fn handle_response<T: DeserializeOwned>(&self, resp: reqwest::Response) -> Result<T> {
        let status = resp.status();
        let body = resp.text().await.map_err(Error::Http)?;

        if !status.is_success() {
            debug!(status = status.as_u16(), "API error response");
            return Err(classify_error(status.as_u16(), &body));
        }

        match serde_json::from_str(&body) {
            Ok(value) => Ok(value),
            // A 2xx body that does not match the target shape may still be
            // one of the known error envelopes.
            Err(err) => Err(reinterpret_body(status.as_u16(), &body, err)),
        }
    }
}

/// Turn a non-2xx response body into a structured error.
fn classify_error(status: u16, body: &str) -> Error {
    match recognize_envelope(status, body) {
        Some(err) => err,
        None => Error::Status {
            status,
            body: body.to_string(),
        },
    }
}

/// A 2xx body failed to decode as the target shape: recognize the error
/// envelopes before reporting a parse failure.
fn reinterpret_body(status: u16, body: &str, err: serde_json::Error) -> Error {
    recognize_envelope(status, body).unwrap_or(Error::Json(err))
}

fn recognize_envelope(status: u16, body: &str) -> Option<Error> {
    if let Ok(env) = serde_json::from_str::<ErrorEnvelope>(body) {
        if !env.code.is_empty() {
            return Some(Error::Api {
                status,
                code: env.code,
                message: env.message,
            });
        }
    }

    if let Ok(env) = serde_json::from_str::<ValidationEnvelope>(body) {
        if env.tamtam_response_api {
            return Some(Error::Validation {
                message: env.error,
                field_errors: env.field_errors,
            });
        }
    }

    None
}
