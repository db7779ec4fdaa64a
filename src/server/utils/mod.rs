pub mod cipher_utils;
pub mod pattern_utils;
pub mod scrape_utils;
