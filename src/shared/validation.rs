use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for validating legal district codes
    /// Exactly ten ASCII digits (2 province + 3 city + 3 neighborhood + 2 village)
    /// - Valid: "1111010100", "4113510900"
    /// - Invalid: "111101010", "11110101000", "11110-1010", "abcdefghij"
    pub static ref DISTRICT_CODE_REGEX: Regex = Regex::new(r"^[0-9]{10}$").unwrap();
}
