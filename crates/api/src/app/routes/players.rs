use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use scoreline_core::{ConventionId, PlayerId};

use super::common::{self, try_response};
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::with_service;

pub async fn register_player(
    Extension(services): Extension<Arc<AppServices>>,
    Path(convention_id): Path<String>,
    body: Result<Json<dto::RegisterPlayerRequest>, JsonRejection>,
) -> axum::response::Response {
    let convention_id: ConventionId = try_response!(common::parse_id(&convention_id));
    let body = try_response!(common::body(body));
    let name = try_response!(body.parse().map_err(errors::domain_error_to_response));

    let registered = with_service!(&*services, svc => {
        match svc.register_player(convention_id, name).await {
            Ok(id) => svc.get_player(convention_id, id).await,
            Err(e) => Err(e),
        }
    });

    match registered {
        Ok(p) => (StatusCode::CREATED, Json(dto::player_to_json(&p))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// Players of a convention in league-table order.
pub async fn standings(
    Extension(services): Extension<Arc<AppServices>>,
    Path(convention_id): Path<String>,
) -> axum::response::Response {
    let convention_id: ConventionId = try_response!(common::parse_id(&convention_id));

    match with_service!(&*services, svc => svc.get_standings(convention_id).await) {
        Ok(players) => {
            Json(players.iter().map(dto::player_to_json).collect::<Vec<_>>()).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_player(
    Extension(services): Extension<Arc<AppServices>>,
    Path((convention_id, player_id)): Path<(String, String)>,
) -> axum::response::Response {
    let convention_id: ConventionId = try_response!(common::parse_id(&convention_id));
    let player_id: PlayerId = try_response!(common::parse_id(&player_id));

    match with_service!(&*services, svc => svc.get_player(convention_id, player_id).await) {
        Ok(p) => Json(dto::player_to_json(&p)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
