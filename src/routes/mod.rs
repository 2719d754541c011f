pub mod attempts;
pub mod auth;
pub mod health;
pub mod matching;
pub mod profiles;
pub mod quizzes;
pub mod results;
pub mod sessions;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::middleware::{auth::require_session, rate_limit};
use crate::AppState;

/// Full API surface. Everything except health and sign-in/up runs behind the
/// session middleware; the whole router shares one request budget.
pub fn api_router(state: AppState, public_rps: u32) -> Router {
    let open = Router::new()
        .route("/health", get(health::health))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login));

    let protected = Router::new()
        .route("/api/auth/logout", post(auth::logout))
        .route(
            "/api/profiles/me",
            get(profiles::me).patch(profiles::update_me),
        )
        .route("/api/tutors", get(profiles::list_tutors))
        .route("/api/match", post(matching::find_tutors))
        .route(
            "/api/sessions",
            get(sessions::list_sessions).post(sessions::book_session),
        )
        .route("/api/sessions/:id/confirm", post(sessions::confirm_session))
        .route(
            "/api/sessions/:id/complete",
            post(sessions::complete_session),
        )
        .route("/api/sessions/:id/cancel", post(sessions::cancel_session))
        .route("/api/quizzes", get(quizzes::list_quizzes))
        .route("/api/quizzes/generate", post(quizzes::generate_quiz))
        .route("/api/quizzes/:id", get(quizzes::get_quiz))
        .route("/api/quizzes/:id/attempts", post(attempts::start_attempt))
        .route("/api/attempts/:id", get(attempts::get_status))
        .route("/api/attempts/:id/answer", patch(attempts::save_answer))
        .route("/api/attempts/:id/next", post(attempts::next_question))
        .route(
            "/api/attempts/:id/previous",
            post(attempts::previous_question),
        )
        .route("/api/attempts/:id/submit", post(attempts::submit_attempt))
        .route("/api/results", get(results::history))
        .route("/api/results/:id", get(results::get_result))
        .route("/api/results/:id/claim", post(results::claim_reward))
        .layer(axum::middleware::from_fn(require_session));

    open.merge(protected)
        .layer(axum::middleware::from_fn_with_state(
            rate_limit::RequestBudget::new(public_rps),
            rate_limit::rps_middleware,
        ))
        .with_state(state)
}
