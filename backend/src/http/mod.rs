//! HTTP server module for the todo service.
//!
//! An axum-based REST API over the service layer and the repository chosen
//! at startup.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  HTTP Layer (axum handlers)                               │
//! │  - Request parsing, rejection mapping                     │
//! │  - JSON serialization/deserialization                     │
//! │  - CORS, compression, tracing                             │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  Service Layer (db/services.rs)                           │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  Repository Layer (db/)                                   │
//! │  - LocalRepository / PostgresRepository                   │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use router::{cors_layer, create_router};
pub use state::AppState;

use tokio::net::TcpListener;

use crate::config::Settings;

/// Bind the configured `HOST:PORT`. The host may be a DNS name
/// (`localhost`, a container service name) as well as an IP literal.
pub async fn bind_listener(settings: &Settings) -> std::io::Result<TcpListener> {
    TcpListener::bind(settings.bind_address()).await
}
