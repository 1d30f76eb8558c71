//! FAQ chat client library (config, HTTP API, conversation store, knowledge browser).
//! Used by the `faq-chat` binary.

pub mod browser;
pub mod client;
pub mod command;
pub mod config;
pub mod conversation;
pub mod messages;

pub use browser::{CategoryGroup, KnowledgeBrowser, SnapshotFetch};
pub use client::{Client, ClientError};
pub use command::Command;
pub use config::{default_config_path, ApiSection, ChatSection, Config, ConfigError, ConfigSource};
pub use conversation::{
    ConfidenceLevel, ConversationStore, Message, PendingQuery, Role, SubmitOutcome,
    FALLBACK_ANSWER,
};
pub use messages::{AskResponse, FaqEntry, ServiceStatus};
