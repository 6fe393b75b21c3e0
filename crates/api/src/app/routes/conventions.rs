use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use scoreline_core::ConventionId;

use super::common::{self, try_response};
use super::{events, matches, players};
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::with_service;

pub fn router() -> Router {
    Router::new()
        .route("/", post(register_convention).get(list_conventions))
        .route("/:convention_id", get(get_convention))
        .route(
            "/:convention_id/players",
            post(players::register_player).get(players::standings),
        )
        .route("/:convention_id/players/:player_id", get(players::get_player))
        .route(
            "/:convention_id/matches",
            post(matches::register_match).get(matches::list_matches),
        )
        .route("/:convention_id/matches/:match_id", get(matches::get_match))
        .route(
            "/:convention_id/matches/:match_id/scorers",
            post(events::register_scorers).get(events::list_scorers),
        )
        .route(
            "/:convention_id/matches/:match_id/assists",
            post(events::register_assists).get(events::list_assists),
        )
        .route(
            "/:convention_id/matches/:match_id/mom",
            post(events::register_mom).get(events::get_mom),
        )
}

pub async fn register_convention(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::RegisterConventionRequest>, JsonRejection>,
) -> axum::response::Response {
    let body = try_response!(common::body(body));
    let (name, held_date) = try_response!(body.parse().map_err(errors::domain_error_to_response));

    let registered = with_service!(&*services, svc => {
        match svc.register_convention(name, held_date).await {
            Ok(id) => svc.get_convention(id).await,
            Err(e) => Err(e),
        }
    });

    match registered {
        Ok(c) => (StatusCode::CREATED, Json(dto::convention_to_json(&c))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_conventions(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match with_service!(&*services, svc => svc.list_conventions().await) {
        Ok(all) => Json(all.iter().map(dto::convention_to_json).collect::<Vec<_>>()).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_convention(
    Extension(services): Extension<Arc<AppServices>>,
    Path(convention_id): Path<String>,
) -> axum::response::Response {
    let convention_id: ConventionId = try_response!(common::parse_id(&convention_id));

    match with_service!(&*services, svc => svc.get_convention(convention_id).await) {
        Ok(c) => Json(dto::convention_to_json(&c)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
