//! Axum router construction.
//!
//! [`build_router`] mounts every endpoint over a shared [`AppState`]
//! with permissive CORS (the browser client is served from another
//! origin) and request tracing.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use vetlogic_core::collab::{CaseGenerator, QuestionBank};
use vetlogic_store::SaveStorage;

use crate::{game, handlers};
use crate::state::AppState;

/// Build the router over `state`.
pub fn build_router<S, G, Q>(state: Arc<AppState<S, G, Q>>) -> Router
where
    S: SaveStorage + 'static,
    G: CaseGenerator + 'static,
    Q: QuestionBank + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::index))
        .route("/api/health", get(handlers::health::<S, G, Q>))
        .route("/api/cases/generate", post(handlers::generate_case::<S, G, Q>))
        .route("/api/cases/evaluate", post(handlers::evaluate_case::<S, G, Q>))
        .route("/api/exam/questions", post(handlers::exam_questions::<S, G, Q>))
        .route(
            "/api/exam/submit-answer",
            post(handlers::submit_answer::<S, G, Q>),
        )
        .route(
            "/api/quiz/qualification",
            post(handlers::qualification_quiz::<S, G, Q>),
        )
        .route("/api/game/state", get(game::state::<S, G, Q>))
        .route("/api/game/talents", get(game::talents::<S, G, Q>))
        .route("/api/game/case/start", post(game::start_case::<S, G, Q>))
        .route("/api/game/case/submit", post(game::submit_case::<S, G, Q>))
        .route("/api/game/exam/start", post(game::start_exam::<S, G, Q>))
        .route(
            "/api/game/exam/answer",
            post(game::answer_question::<S, G, Q>),
        )
        .route("/api/game/exam/finish", post(game::finish_exam::<S, G, Q>))
        .route(
            "/api/game/qualification/start",
            post(game::start_qualification::<S, G, Q>),
        )
        .route(
            "/api/game/qualification/submit",
            post(game::submit_qualification::<S, G, Q>),
        )
        .route(
            "/api/game/equipment/buy",
            post(game::buy_equipment::<S, G, Q>),
        )
        .route(
            "/api/game/talents/unlock",
            post(game::unlock_talent::<S, G, Q>),
        )
        .route("/api/game/reset", post(game::reset::<S, G, Q>))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
