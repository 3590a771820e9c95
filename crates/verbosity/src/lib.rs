//! Client library for the Verbosity chat-platform HTTP API.
//!
//! [`Client`] owns the configuration (base URLs, API token) and one HTTP
//! client; resource accessors (users, chats, organizations, messages, files)
//! are `impl Client` blocks in their own modules. [`bot`] covers the inbound
//! side: callback parsing, signature verification and action URLs.
//!
//! Every accessor is one HTTP round trip (or two, for the list-all patterns)
//! with no retries and no caching; a `Client` holds no mutable state, so one
//! instance can be shared across tasks freely.

pub mod bot;
pub mod chats;
pub mod client;
pub mod config;
pub mod errors;
pub mod files;
pub mod messages;
pub mod orgs;
pub mod types;
pub mod users;

pub use client::Client;
pub use config::Config;
pub use errors::{Error, Result};
