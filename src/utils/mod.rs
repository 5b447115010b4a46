pub mod constants;
pub mod string_utils;
pub mod url_utils;

pub use constants::*;
pub use string_utils::sanitize_folder_name;
pub use url_utils::{image_extension, is_thumbnail_url, is_valid_url, resolve_href, trailing_digits};
