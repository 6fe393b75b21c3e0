use axum::{routing::get, Router};

pub mod common;
pub mod conventions;
pub mod events;
pub mod matches;
pub mod players;
pub mod rankings;
pub mod system;

/// Router for every tournament endpoint.
pub fn router() -> Router {
    Router::new()
        .nest("/conventions", conventions::router())
        .route("/scorers", get(rankings::scorers))
        .route("/assists", get(rankings::assists))
        .route("/moms", get(rankings::moms))
}
