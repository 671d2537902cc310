use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use hal_base::{ErrorKind, HalResult, ResultExt, err};

use crate::context::{RequestContext, ResolvedContext};
use crate::document::HalResource;

/// Media type registered for HAL JSON documents.
pub const HAL_JSON_CONTENT_TYPE: &str = "application/hal+json";

/// Rendering options for HAL documents.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HalConfig {
    /// Base URL that relative self hrefs are resolved against.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Emit indented JSON instead of compact JSON.
    #[serde(default)]
    pub pretty: bool,
    /// Media type to send alongside rendered documents.
    #[serde(default = "default_content_type")]
    pub content_type: String,
}

fn default_content_type() -> String {
    HAL_JSON_CONTENT_TYPE.to_string()
}

impl Default for HalConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            pretty: false,
            content_type: default_content_type(),
        }
    }
}

impl HalConfig {
    /// Parse a configuration from TOML text.
    pub fn parse(text: &str) -> HalResult<Self> {
        toml::from_str(text).map_err(|e| err!("Invalid HAL configuration: {}", e))
    }

    /// Encode `resource` according to the `pretty` setting.
    pub fn render(&self, resource: &dyn HalResource) -> HalResult<String> {
        if self.pretty {
            resource.to_json_pretty()
        } else {
            resource.to_json()
        }
    }

    /// Context for the `self` link of the resource at `href`.
    ///
    /// With a `base_url`, `href` is resolved against it; without one it is
    /// used unchanged.
    pub fn context(&self, href: &str) -> HalResult<Box<dyn RequestContext>> {
        match &self.base_url {
            Some(base_url) => {
                let context = ResolvedContext::new(base_url, href)
                    .with_context(|| format!("Failed to resolve self href '{}'", href))?;
                Ok(Box::new(context))
            }
            None => Ok(Box::new(href.to_string())),
        }
    }
}

/// Load a [`HalConfig`] from a TOML file.
pub fn load_config(path: &Path) -> HalResult<HalConfig> {
    debug!(path = %path.display(), "loading HAL configuration");
    let text = std::fs::read_to_string(path).map_err(|source| ErrorKind::FileError {
        path: path.to_path_buf(),
        source,
    })?;
    HalConfig::parse(&text).with_context(|| format!("Failed to load {}", path.display()))
}
