pub mod district_loader_service;
pub mod legal_district_service;
pub mod tiered_matcher;

pub use district_loader_service::{
    DistrictLoaderService, LoadOutcome, LoadState, LoaderStatsSnapshot,
};
pub use legal_district_service::LegalDistrictService;
pub use tiered_matcher::TieredMatcher;
