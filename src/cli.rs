//! Command-line interface for the proxy
//!
//! Provides argument parsing and subcommand handling for the `chat-proxy` binary.

use clap::{Parser, Subcommand};

/// Stateless edge proxy for LLM chat completions
#[derive(Parser)]
#[command(name = "chat-proxy")]
#[command(version)]
#[command(about = "Stateless edge proxy for LLM chat completions")]
#[command(
    long_about = "chat-proxy forwards chat completion requests to an upstream LLM provider, \
    attaching a server-held API key so clients never see it."
)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml", global = true)]
    pub config: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Generate a template configuration file
    Config {
        /// Output file path (prints to stdout if not specified)
        #[arg(short, long)]
        output: Option<String>,
    },
}

/// Generate template configuration content
pub fn generate_config_template() -> &'static str {
    r#"# chat-proxy Configuration
# =========================
#
# Every setting below shows its default. Remove anything you don't need to change.

# ─────────────────────────────────────────────────────────────────────────────
# SERVER CONFIGURATION
# ─────────────────────────────────────────────────────────────────────────────

[server]
# IP address to bind to (0.0.0.0 for all interfaces, 127.0.0.1 for localhost only).
# Hostnames such as "localhost" are rejected.
host = "0.0.0.0"

# Port to listen on
port = 8787

# Largest accepted request body in bytes (10 MiB). Larger bodies get 413.
max_body_bytes = 10485760

# ─────────────────────────────────────────────────────────────────────────────
# UPSTREAM PROVIDER
# ─────────────────────────────────────────────────────────────────────────────
#
# Every POST /v1/chat/completions is forwarded here with the client's messages,
# the model below and the completion token budget below. Whatever the client
# sent for model or token limits is ignored.

[upstream]
# Full URL of the upstream chat completions endpoint
url = "https://api.openai.com/v1/chat/completions"

# Model identifier sent upstream
model = "gpt-5-mini"

# Completion token budget sent upstream as max_completion_tokens
max_completion_tokens = 2000

# Environment variable holding the upstream API key.
# If it is unset, the server still starts but answers 500 "Server misconfigured".
api_key_env = "OPENAI_API_KEY"

# ─────────────────────────────────────────────────────────────────────────────
# OBSERVABILITY
# ─────────────────────────────────────────────────────────────────────────────

[observability]
# Log level: "trace", "debug", "info", "warn", "error"
# RUST_LOG takes precedence when set.
log_level = "info"
"#
}
