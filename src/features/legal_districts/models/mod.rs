mod legal_district;

pub use legal_district::{LegalDistrict, NewLegalDistrict};
