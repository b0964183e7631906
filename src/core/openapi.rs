use utoipa::{Modify, OpenApi};

use crate::features::legal_districts::{dtos as districts_dtos, handlers as districts_handlers};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Legal districts (public)
        districts_handlers::search_districts,
        districts_handlers::get_district,
        districts_handlers::list_by_region,
        districts_handlers::get_load_status,
    ),
    components(
        schemas(
            // Shared
            Meta,
            // Legal districts
            districts_dtos::LegalDistrictResponseDto,
            districts_dtos::LoadStatusResponseDto,
            ApiResponse<districts_dtos::LegalDistrictResponseDto>,
            ApiResponse<Vec<districts_dtos::LegalDistrictResponseDto>>,
            ApiResponse<districts_dtos::LoadStatusResponseDto>,
        )
    ),
    tags(
        (name = "legal-districts", description = "Korean legal administrative districts (법정동) search and lookup"),
    ),
    info(
        title = "Legal District API",
        version = "0.1.0",
        description = "API documentation for the legal district search service",
    )
)]
pub struct ApiDoc;

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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_district_paths() {
        let doc = ApiDoc::openapi();

        for path in [
            "/api/legal-districts/search",
            "/api/legal-districts/codes/{code}",
            "/api/legal-districts/by-region",
            "/api/legal-districts/load-status",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }

    #[test]
    fn test_info_modifier_overrides_title() {
        let mut doc = ApiDoc::openapi();
        SwaggerInfoModifier {
            title: "Districts".to_string(),
            version: "9.9.9".to_string(),
            description: "custom".to_string(),
        }
        .modify(&mut doc);

        assert_eq!(doc.info.title, "Districts");
        assert_eq!(doc.info.version, "9.9.9");
        assert_eq!(doc.info.description.as_deref(), Some("custom"));
    }
}
