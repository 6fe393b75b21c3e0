//! Scorer, assist and man-of-the-match endpoints of a single match.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use scoreline_core::{ConventionId, MatchId};
use scoreline_tournament::EventKind;

use super::common::{self, try_response};
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::with_service;

type MatchPath = Path<(String, String)>;
type BatchBody = Result<Json<Vec<dto::EventRequest>>, JsonRejection>;

fn parse_match_path(
    (convention_id, match_id): (String, String),
) -> Result<(ConventionId, MatchId), axum::response::Response> {
    Ok((common::parse_id(&convention_id)?, common::parse_id(&match_id)?))
}

pub async fn register_scorers(
    Extension(services): Extension<Arc<AppServices>>,
    Path(path): MatchPath,
    body: BatchBody,
) -> axum::response::Response {
    register_batch(services, EventKind::Scorer, path, body).await
}

pub async fn register_assists(
    Extension(services): Extension<Arc<AppServices>>,
    Path(path): MatchPath,
    body: BatchBody,
) -> axum::response::Response {
    register_batch(services, EventKind::Assist, path, body).await
}

pub async fn list_scorers(
    Extension(services): Extension<Arc<AppServices>>,
    Path(path): MatchPath,
) -> axum::response::Response {
    list(services, EventKind::Scorer, path).await
}

pub async fn list_assists(
    Extension(services): Extension<Arc<AppServices>>,
    Path(path): MatchPath,
) -> axum::response::Response {
    list(services, EventKind::Assist, path).await
}

async fn register_batch(
    services: Arc<AppServices>,
    kind: EventKind,
    path: (String, String),
    body: BatchBody,
) -> axum::response::Response {
    let (convention_id, match_id) = try_response!(parse_match_path(path));
    let batch = try_response!(common::body(body));
    let events = try_response!(dto::parse_event_batch(batch).map_err(errors::domain_error_to_response));

    let result = with_service!(&*services, svc => {
        svc.register_events(kind, convention_id, match_id, events.clone()).await
    });

    match result {
        Ok(ids) => {
            let body: Vec<_> = ids
                .into_iter()
                .zip(events.iter())
                .map(|(id, e)| dto::registered_event_to_json(id, e))
                .collect();
            (StatusCode::CREATED, Json(body)).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

async fn list(
    services: Arc<AppServices>,
    kind: EventKind,
    path: (String, String),
) -> axum::response::Response {
    let (convention_id, match_id) = try_response!(parse_match_path(path));

    match with_service!(&*services, svc => svc.list_events(kind, convention_id, match_id).await) {
        Ok(records) => {
            Json(records.iter().map(dto::event_to_json).collect::<Vec<_>>()).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn register_mom(
    Extension(services): Extension<Arc<AppServices>>,
    Path(path): MatchPath,
    body: Result<Json<dto::EventRequest>, JsonRejection>,
) -> axum::response::Response {
    let (convention_id, match_id) = try_response!(parse_match_path(path));
    let body = try_response!(common::body(body));
    let event = try_response!(body.parse().map_err(errors::domain_error_to_response));

    let result = with_service!(&*services, svc => {
        svc.register_mom(convention_id, match_id, event.player_id, event.name.clone()).await
    });

    match result {
        Ok(id) => {
            (StatusCode::CREATED, Json(dto::registered_event_to_json(id, &event))).into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_mom(
    Extension(services): Extension<Arc<AppServices>>,
    Path(path): MatchPath,
) -> axum::response::Response {
    let (convention_id, match_id) = try_response!(parse_match_path(path));

    match with_service!(&*services, svc => svc.get_mom(convention_id, match_id).await) {
        Ok(record) => Json(dto::event_to_json(&record)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
