//! Shared application state for the server.
//!
//! [`AppState`] owns the player's [`GameSession`], which in turn owns the
//! two collaborators the proxy endpoints forward to. It is generic so
//! integration tests can mount the router over in-memory storage, the stub
//! generator and the built-in question bank.

use chrono::{DateTime, Utc};
use vetlogic_core::GameSession;
use vetlogic_core::collab::{CaseGenerator, QuestionBank};
use vetlogic_store::SaveStorage;

/// State shared by all handlers.
pub struct AppState<S, G, Q> {
    /// The player's game, including the collaborators.
    pub session: GameSession<S, G, Q>,
    /// When the process started serving.
    pub started_at: DateTime<Utc>,
}

impl<S, G, Q> AppState<S, G, Q>
where
    S: SaveStorage,
    G: CaseGenerator,
    Q: QuestionBank,
{
    /// Wrap a session.
    pub fn new(session: GameSession<S, G, Q>) -> Self {
        Self {
            session,
            started_at: Utc::now(),
        }
    }

    /// The case generator.
    pub const fn generator(&self) -> &G {
        self.session.generator()
    }

    /// The question bank.
    pub const fn bank(&self) -> &Q {
        self.session.bank()
    }
}
