use std::{env, fs, path::Path};

use crate::{errors::Error, Result};

const DEFAULT_API_URL: &str = "https://api.verbosity.io";
const DEFAULT_FILE_URL: &str = "https://file.verbosity.io";

/// Connection settings for the Verbosity API.
///
/// Loaded once at startup and passed into [`crate::Client::new`]; there is no
/// ambient global configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Base URL for core endpoints (users, chats, bots, orgs).
    pub api_url: String,
    /// Base URL for file uploads.
    pub file_url: String,
    /// Bot API token, sent as `X-APIToken` on every request.
    pub api_token: String,
}

impl Config {
    /// Build a config from explicit values. Trailing slashes are trimmed so
    /// path concatenation stays predictable.
    pub fn new(
        api_url: impl Into<String>,
        file_url: impl Into<String>,
        api_token: impl Into<String>,
    ) -> Result<Self> {
        let api_token = api_token.into();
        if api_token.trim().is_empty() {
            return Err(Error::Config("API token must not be empty".to_string()));
        }
        Ok(Self {
            api_url: trim_base_url(&api_url.into()),
            file_url: trim_base_url(&file_url.into()),
            api_token,
        })
    }

    /// Load configuration from the environment.
    ///
    /// - `VERBOSITY_API_URL` (default `https://api.verbosity.io`)
    /// - `VERBOSITY_FILE_URL` (default `https://file.verbosity.io`)
    /// - `VERBOSITY_API_TOKEN` (required)
    ///
    /// A `.env` file in the working directory is honored without overriding
    /// variables already present in the environment.
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));

        let api_url = env_str("VERBOSITY_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let file_url =
            env_str("VERBOSITY_FILE_URL").unwrap_or_else(|| DEFAULT_FILE_URL.to_string());
        let api_token = env_str("VERBOSITY_API_TOKEN").ok_or_else(|| {
            Error::Config("VERBOSITY_API_TOKEN environment variable is required".to_string())
        })?;

        Self::new(api_url, file_url, api_token)
    }

    /// Replace the API base URL (e.g. for a test server).
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = trim_base_url(&api_url.into());
        self
    }

    /// Replace the file-upload base URL.
    pub fn with_file_url(mut self, file_url: impl Into<String>) -> Self {
        self.file_url = trim_base_url(&file_url.into());
        self
    }
}

fn trim_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() || env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        env::set_var(key, val);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slashes_are_trimmed() {
        let cfg = Config::new(
            "https://api.example.com/",
            "https://file.example.com//",
            "token",
        )
        .unwrap();
        assert_eq!(cfg.api_url, "https://api.example.com");
        assert_eq!(cfg.file_url, "https://file.example.com");
    }

    #[test]
    fn empty_token_is_a_config_error() {
        let err = Config::new("https://a", "https://f", "  ").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn with_api_url_overrides_and_trims() {
        let cfg = Config::new("https://a", "https://f", "token")
            .unwrap()
            .with_api_url("http://127.0.0.1:9999/");
        assert_eq!(cfg.api_url, "http://127.0.0.1:9999");
    }
}
