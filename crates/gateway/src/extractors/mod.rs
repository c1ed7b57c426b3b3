//! Request extractors.

mod params;
mod validated_json;

pub use params::{Path, QueryParams};
pub use validated_json::ValidatedJson;
