use schemars::JsonSchema;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CheckUrlParams {
    /// Absolute http(s) URL of the page to audit.
    pub url: String,
}
