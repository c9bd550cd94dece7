//! Graph-wide policy configuration.
//!
//! A [`GraphConfig`] is handed to [`Graph::with_config`](crate::Graph::with_config)
//! once at startup. It can be kept next to other application settings as JSON.

use serde::{Deserialize, Serialize};

use crate::Result;

/// Policy switches for reading and copying references.
///
/// # Example
///
/// ```
/// use fieldgraph::GraphConfig;
///
/// let config = GraphConfig::from_json_str(r#"{ "lenient_list_reading": false }"#).unwrap();
/// assert!(!config.lenient_list_reading);
/// assert!(config.exempt_unnumbered_from_unresolve);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// When reading a reference list, treat the first token that cannot start
    /// a reference as the end of the list.
    ///
    /// When false, such a token is reported as malformed input unless it is
    /// the `;` terminating a record value.
    pub lenient_list_reading: bool,

    /// Keep the live binding of references to unnumbered entities (id -1)
    /// when copying with forced unresolution.
    pub exempt_unnumbered_from_unresolve: bool,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            lenient_list_reading: true,
            exempt_unnumbered_from_unresolve: true,
        }
    }
}

impl GraphConfig {
    /// Parse a configuration from JSON. Missing keys take their default value.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize this configuration as pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
