//! Korean legal administrative districts (법정동) feature.
//!
//! Loads the national legal district code table once and answers keyword,
//! code and region lookups over it.
//!
//! ## Data Hierarchy
//!
//! - Province (시도), e.g. 서울특별시
//! - City (시군구), e.g. 종로구
//! - Neighborhood (읍면동), e.g. 청운동
//! - Village (리), only under 읍/면
//!
//! Codes are 10 digits: 2 province, 3 city, 3 neighborhood, 2 village.
//!
//! ## Search Tiers
//!
//! Keyword search runs exact, prefix, then fallback (full-text or ranked
//! substring) matching, stopping as soon as the limit is filled. A failing tier
//! is logged and skipped.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/legal-districts/search` | Tiered keyword search |
//! | GET | `/api/legal-districts/codes/{code}` | Get district by code |
//! | GET | `/api/legal-districts/by-region` | List districts of a province or city |
//! | GET | `/api/legal-districts/load-status` | Bulk loader totals |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;

pub use services::{DistrictLoaderService, LegalDistrictService};
pub use store::{DistrictStore, MemoryDistrictStore, PgDistrictStore};
