//! Leaderboards across matches: `/scorers`, `/assists`, `/moms`.

use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Extension, Query},
    response::IntoResponse,
    Json,
};

use scoreline_core::{ConventionId, PlayerId};
use scoreline_tournament::{EventKind, RankingScope};

use super::common::{self, try_response};
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::with_service;

type RankingParams = Result<Query<dto::RankingQuery>, QueryRejection>;

pub async fn scorers(
    Extension(services): Extension<Arc<AppServices>>,
    query: RankingParams,
) -> axum::response::Response {
    ranking(services, EventKind::Scorer, query).await
}

pub async fn assists(
    Extension(services): Extension<Arc<AppServices>>,
    query: RankingParams,
) -> axum::response::Response {
    ranking(services, EventKind::Assist, query).await
}

pub async fn moms(
    Extension(services): Extension<Arc<AppServices>>,
    query: RankingParams,
) -> axum::response::Response {
    ranking(services, EventKind::Mom, query).await
}

async fn ranking(
    services: Arc<AppServices>,
    kind: EventKind,
    query: RankingParams,
) -> axum::response::Response {
    let Query(query) = try_response!(query.map_err(errors::query_rejection_to_response));

    let convention_id: Option<ConventionId> = match query.convention_id.as_deref() {
        Some(raw) => Some(try_response!(common::parse_id(raw))),
        None => None,
    };
    let player_id: Option<PlayerId> = match query.player_id.as_deref() {
        Some(raw) => Some(try_response!(common::parse_id(raw))),
        None => None,
    };
    let scope = try_response!(
        RankingScope::from_selectors(convention_id, player_id)
            .map_err(errors::domain_error_to_response)
    );

    match with_service!(&*services, svc => svc.get_ranking(kind, scope).await) {
        Ok(entries) => Json(dto::ranking_to_json(&entries)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
