pub mod legal_district_handler;

pub use legal_district_handler::{
    __path_get_district, __path_get_load_status, __path_list_by_region, __path_search_districts,
    get_district, get_load_status, list_by_region, search_districts, LegalDistrictState,
};
