use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::auth;
use crate::features::concerns::{dtos as concerns_dtos, handlers as concerns_handlers};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        concerns_handlers::report_concern,
        concerns_handlers::list_concerns,
        concerns_handlers::get_concern,
        concerns_handlers::resolve_concern,
    ),
    components(
        schemas(
            // Shared
            Meta,
            // Auth
            auth::model::AuthenticatedUser,
            // Concerns
            concerns_dtos::ReportConcernDto,
            concerns_dtos::ReportConcernResponseDto,
            concerns_dtos::ResolveConcernDto,
            concerns_dtos::ConcernResponseDto,
            concerns_dtos::ConcernListItemDto,
            ApiResponse<concerns_dtos::ReportConcernResponseDto>,
            ApiResponse<concerns_dtos::ConcernResponseDto>,
            ApiResponse<Vec<concerns_dtos::ConcernListItemDto>>,
        )
    ),
    tags(
        (name = "concerns", description = "Privacy concern reporting and review"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Concerns API",
        version = "0.1.0",
        description = "API documentation for the privacy concerns service",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
