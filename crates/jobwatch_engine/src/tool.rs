use serde::de::DeserializeOwned;
use serde::Serialize;

/// A backend feature driven through the submit / poll / result cycle.
pub trait Tool: Send + Sync + 'static {
    type Request: Serialize + Send + Sync + 'static;
    type Output: DeserializeOwned + Serialize + Clone + Send + Sync + 'static;

    /// Stable name, also used as the result store key.
    const NAME: &'static str;
    /// Path of the submit endpoint, relative to the backend base URL.
    const SUBMIT_PATH: &'static str;
    /// Whether a submit reply without a job id may carry the final payload.
    const INLINE_RESULTS: bool = false;

    /// Names of required fields that are empty.
    fn missing_fields(request: &Self::Request) -> Vec<&'static str>;
}

pub(crate) fn require(field: &'static str, value: &str, missing: &mut Vec<&'static str>) {
    if value.trim().is_empty() {
        missing.push(field);
    }
}
