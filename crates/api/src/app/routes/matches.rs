use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use scoreline_core::{ConventionId, MatchId};

use super::common::{self, try_response};
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::with_service;

pub async fn register_match(
    Extension(services): Extension<Arc<AppServices>>,
    Path(convention_id): Path<String>,
    body: Result<Json<dto::RegisterMatchRequest>, JsonRejection>,
) -> axum::response::Response {
    let convention_id: ConventionId = try_response!(common::parse_id(&convention_id));
    let body = try_response!(common::body(body));
    let input = try_response!(body.parse().map_err(errors::domain_error_to_response));

    let registered = with_service!(&*services, svc => {
        match svc
            .register_match(
                convention_id,
                input.home_player_id,
                input.away_player_id,
                input.home_score,
                input.away_score,
            )
            .await
        {
            Ok(id) => svc.get_match(convention_id, id).await,
            Err(e) => Err(e),
        }
    });

    match registered {
        Ok(m) => (StatusCode::CREATED, Json(dto::match_to_json(&m))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_matches(
    Extension(services): Extension<Arc<AppServices>>,
    Path(convention_id): Path<String>,
) -> axum::response::Response {
    let convention_id: ConventionId = try_response!(common::parse_id(&convention_id));

    match with_service!(&*services, svc => svc.list_matches(convention_id).await) {
        Ok(all) => Json(all.iter().map(dto::match_to_json).collect::<Vec<_>>()).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_match(
    Extension(services): Extension<Arc<AppServices>>,
    Path((convention_id, match_id)): Path<(String, String)>,
) -> axum::response::Response {
    let convention_id: ConventionId = try_response!(common::parse_id(&convention_id));
    let match_id: MatchId = try_response!(common::parse_id(&match_id));

    match with_service!(&*services, svc => svc.get_match(convention_id, match_id).await) {
        Ok(m) => Json(dto::match_to_json(&m)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
