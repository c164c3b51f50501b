//! JSON HTTP API over the script and test services.
//!
//! | Method | Path | |
//! |---|---|---|
//! | GET | `/health` | liveness |
//! | GET, POST | `/scripts` | list, create from `{"url": ...}` |
//! | GET | `/scripts/{id}` | one script |
//! | GET | `/scripts/k6?id=` | k6 source for a script |
//! | POST | `/tests/run` | run a [`TestConfig`](crate::loadtest::model::TestConfig) |
//! | GET | `/history?scriptId=` | stored results, newest first |

pub mod error;
pub mod handlers;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::service::{ScriptService, TestService};

pub use error::ApiError;

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub scripts: ScriptService,
    pub tests: TestService,
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        // Scripts
        .route(
            "/scripts",
            get(handlers::list_scripts).post(handlers::create_script),
        )
        .route("/scripts/k6", get(handlers::k6_script))
        .route("/scripts/{id}", get(handlers::get_script))
        // Runs
        .route("/tests/run", post(handlers::run_test))
        .route("/history", get(handlers::history))
        .layer(cors)
        .with_state(state)
}
