/// Default number of districts returned by a search
pub const DEFAULT_SEARCH_LIMIT: usize = 10;

/// Maximum number of districts a single search may request
pub const MAX_SEARCH_LIMIT: usize = 100;

// =============================================================================
// SOURCE FILE LAYOUT
// =============================================================================

/// Minimum number of comma-separated fields for a usable source line
pub const MIN_SOURCE_FIELDS: usize = 4;

/// Zero-based column holding the deletion date of a retired district
pub const DELETION_MARKER_COLUMN: usize = 7;
