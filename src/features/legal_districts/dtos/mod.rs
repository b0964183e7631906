mod legal_district_dto;

pub use legal_district_dto::*;
