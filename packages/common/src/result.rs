use crate::error::CommonError;

/// Common Result type alias
pub type CommonResult<T> = Result<T, CommonError>;

/// Read a JSON file into any deserializable value
pub fn read_json<T: serde::de::DeserializeOwned>(path: &std::path::Path) -> CommonResult<T> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
