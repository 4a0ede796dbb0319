//! codeforge-core: Core library for the codeforge AI code generation gateway.
//!
//! Building blocks for a multi-provider code generation service:
//!
//! - [`config`] — Typed configuration loading from JSON with env fallbacks
//! - [`error`] — Error taxonomy (configuration / routing / provider classes)
//! - [`provider`] — `AiProvider` trait and the OpenAI, Mistral, and
//!   HuggingFace implementations
//! - [`registry`] — Startup-built provider registry and model routing
//! - [`workspace`] — Rooted workspace file store (CRUD + tree listing)
//! - [`server`] — axum HTTP/WebSocket transport
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use codeforge_core::config::Config;
//! use codeforge_core::registry::ProviderRegistry;
//! use codeforge_core::server::{self, AppState};
//! use codeforge_core::workspace::WorkspaceStore;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = Config::load()?;
//! let client = reqwest::Client::new();
//!
//! let state = Arc::new(AppState {
//!     registry: Arc::new(ProviderRegistry::from_config(&config, client)),
//!     workspace: Arc::new(WorkspaceStore::new(config.workspace_path())?),
//! });
//!
//! server::serve(state, &config.server.host, config.server.port).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod provider;
pub mod registry;
pub mod server;
pub mod workspace;
