//! HTTP server for the `VetLogic` game.
//!
//! Keeps the LLM and question-bank credentials on the server: the
//! browser client posts to the proxy endpoints and the server forwards to
//! the configured [`CaseGenerator`](vetlogic_core::CaseGenerator) and
//! [`QuestionBank`](vetlogic_core::QuestionBank). The `/api/game/*`
//! endpoints run the player's saved game through a
//! [`GameSession`](vetlogic_core::GameSession).
//!
//! # Modules
//!
//! - [`error`] -- [`ServerError`] and its JSON response shape
//! - [`game`] -- Game action handlers over the session
//! - [`handlers`] -- Endpoint handlers and request bodies
//! - [`router`] -- [`build_router`] with CORS and tracing layers
//! - [`server`] -- [`start_server`] bind and graceful shutdown
//! - [`state`] -- [`AppState`] holding the session

pub mod error;
pub mod game;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;

pub use error::ServerError;
pub use router::build_router;
pub use server::{StartError, start_server};
pub use state::AppState;
