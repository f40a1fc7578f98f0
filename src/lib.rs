//! chat-proxy - Stateless edge proxy for LLM chat completions
//!
//! Two halves live in this crate:
//! - the proxy server ([`handlers`]), which forwards `POST /v1/chat/completions`
//!   to an upstream provider using a server-held credential, and
//! - the client request helper ([`client`]), a JSON POST utility that turns
//!   non-success responses into a uniform [`client::HttpError`].

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod telemetry;
pub mod types;
pub mod upstream;
