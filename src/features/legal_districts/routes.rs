use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::legal_districts::handlers::{self, LegalDistrictState};
use crate::features::legal_districts::services::{DistrictLoaderService, LegalDistrictService};

/// Create routes for the legal districts feature
///
/// All routes are public
pub fn routes(
    district_service: Arc<LegalDistrictService>,
    loader_service: Arc<DistrictLoaderService>,
) -> Router {
    let state = LegalDistrictState {
        district_service,
        loader_service,
    };

    Router::new()
        .route(
            "/api/legal-districts/search",
            get(handlers::search_districts),
        )
        .route(
            "/api/legal-districts/codes/{code}",
            get(handlers::get_district),
        )
        .route(
            "/api/legal-districts/by-region",
            get(handlers::list_by_region),
        )
        .route(
            "/api/legal-districts/load-status",
            get(handlers::get_load_status),
        )
        .with_state(state)
}
