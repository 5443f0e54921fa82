use super::mime::MIME_JSON;

/// Runtime options of a [`RestRouter`](super::RestRouter).
///
/// ```
/// use rest_router::http_router::ServiceConfig;
///
/// let config: ServiceConfig = serde_json::from_str(r#"{"redirect_trailing_slash": false}"#).unwrap();
/// assert!(!config.redirect_trailing_slash);
/// assert!(config.fill_leading_slash);
/// ```
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Answer `307` for paths with a trailing slash, pointing at the path
    /// without it.
    pub redirect_trailing_slash: bool,
    /// Prepend `/` to relative request paths.
    pub fill_leading_slash: bool,
    /// Content types consumed by routes declared with the method shortcuts.
    pub consumes: Vec<String>,
    /// Content types produced by routes declared with the method shortcuts.
    pub produces: Vec<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            redirect_trailing_slash: true,
            fill_leading_slash: true,
            consumes: vec![MIME_JSON.to_owned()],
            produces: vec![MIME_JSON.to_owned()],
        }
    }
}
