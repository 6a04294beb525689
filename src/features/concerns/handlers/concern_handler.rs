use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};

use crate::core::error::Result;
use crate::core::extractor::{AppPayload, RequestMeta};
use crate::features::auth::RequireConcernManager;
use crate::features::concerns::dtos::{
    ConcernListItemDto, ConcernResponseDto, ReportConcernDto, ReportConcernResponseDto,
    ResolveConcernDto,
};
use crate::features::concerns::services::{IntakeService, ResolutionService};
use crate::shared::types::{ApiResponse, Meta, PaginationQuery};

/// Report a concern about the page being viewed
///
/// Open to anonymous visitors. Accepts JSON or a regular form post; a browser
/// form post is answered with a redirect back to this route.
#[utoipa::path(
    post,
    path = "/api/concerns/report",
    request_body = ReportConcernDto,
    responses(
        (status = 201, description = "Concern reported", body = ApiResponse<ReportConcernResponseDto>),
        (status = 303, description = "Concern reported from a browser form"),
        (status = 400, description = "Validation error"),
        (status = 413, description = "Request body too large")
    ),
    tag = "concerns"
)]
pub async fn report_concern(
    State(service): State<Arc<IntakeService>>,
    meta: RequestMeta,
    AppPayload(dto): AppPayload<ReportConcernDto>,
) -> Result<Response> {
    let concern = service.submit(&meta, dto).await?;

    if meta.is_browser_navigation() {
        return Ok(Redirect::to(&meta.path).into_response());
    }

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(ReportConcernResponseDto { id: concern.id }),
            Some("Thank you, your concern has been received.".to_string()),
            None,
        )),
    )
        .into_response())
}

/// List reported concerns, unresolved first
#[utoipa::path(
    get,
    path = "/api/concerns",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Page of concerns", body = ApiResponse<Vec<ConcernListItemDto>>),
        (status = 302, description = "Not allowed to manage concerns; redirected to login")
    ),
    security(("bearer_auth" = [])),
    tag = "concerns"
)]
pub async fn list_concerns(
    RequireConcernManager(_user): RequireConcernManager,
    State(service): State<Arc<ResolutionService>>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<ConcernListItemDto>>>> {
    let (concerns, total) = service.list(&pagination).await?;
    let dtos: Vec<ConcernListItemDto> = concerns.into_iter().map(Into::into).collect();
    Ok(Json(ApiResponse::success(
        Some(dtos),
        None,
        Some(Meta { total }),
    )))
}

/// Get a concern with everything captured at submission
#[utoipa::path(
    get,
    path = "/api/concerns/{id}",
    params(
        ("id" = i64, Path, description = "Concern ID")
    ),
    responses(
        (status = 200, description = "Concern found", body = ApiResponse<ConcernResponseDto>),
        (status = 302, description = "Not allowed to manage concerns; redirected to login"),
        (status = 404, description = "Concern not found")
    ),
    security(("bearer_auth" = [])),
    tag = "concerns"
)]
pub async fn get_concern(
    RequireConcernManager(_user): RequireConcernManager,
    State(service): State<Arc<ResolutionService>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<ConcernResponseDto>>> {
    let concern = service.get(id).await?;
    Ok(Json(ApiResponse::success(Some(concern.into()), None, None)))
}

/// Update the status and resolution of a concern
///
/// The resolver is recorded as the calling user; any `resolver` in the
/// payload is ignored.
#[utoipa::path(
    method(post, put),
    path = "/api/concerns/{id}",
    params(
        ("id" = i64, Path, description = "Concern ID")
    ),
    request_body = ResolveConcernDto,
    responses(
        (status = 200, description = "Concern updated", body = ApiResponse<ConcernResponseDto>),
        (status = 302, description = "Not allowed to manage concerns; redirected to login"),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Concern not found"),
        (status = 413, description = "Request body too large")
    ),
    security(("bearer_auth" = [])),
    tag = "concerns"
)]
pub async fn resolve_concern(
    RequireConcernManager(user): RequireConcernManager,
    State(service): State<Arc<ResolutionService>>,
    Path(id): Path<i64>,
    AppPayload(dto): AppPayload<ResolveConcernDto>,
) -> Result<Json<ApiResponse<ConcernResponseDto>>> {
    let concern = service.resolve(id, &user, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(concern.into()),
        Some("Concern updated".to_string()),
        None,
    )))
}
