pub mod formatter;
pub mod json_path;

pub use formatter::{ResponseFormat, ResponseFormatter};
pub use json_path::{JsonPath, JsonPathError, PathSegment, extract_json_path, value_to_string};
