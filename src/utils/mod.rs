mod string;

pub use string::{collapse_whitespace, first_token, strip_extension, truncate_chars};
