pub mod speedscope;

use thiserror::Error;

use crate::model::Profile;

pub use speedscope::parse_speedscope;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("speedscope: {0}")]
    Speedscope(#[from] speedscope::SpeedscopeImportError),
    #[error("unable to detect profile format")]
    UnknownFormat,
}

/// A set of profiles imported from a single file, typically one per
/// thread or per recorded profile entry.
#[derive(Debug, Clone)]
pub struct ProfileGroup {
    pub name: Option<String>,
    pub profiles: Vec<Profile>,
}

/// Auto-detect the profile format and parse it.
///
/// Detection inspects top-level JSON keys; speedscope files announce
/// themselves through `$schema` or the `shared` + `profiles` pair.
pub fn parse_auto(data: &[u8]) -> Result<ProfileGroup, ImportError> {
    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(data)
        && let Some(obj) = value.as_object()
    {
        if obj.contains_key("$schema")
            && obj["$schema"]
                .as_str()
                .is_some_and(|schema| schema.contains("speedscope"))
        {
            return Ok(speedscope::parse_speedscope(data)?);
        }
        if obj.contains_key("shared") && obj.contains_key("profiles") {
            return Ok(speedscope::parse_speedscope(data)?);
        }
    }
    Err(ImportError::UnknownFormat)
}
