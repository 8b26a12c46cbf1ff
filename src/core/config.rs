use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Client settings. Every field has a default, so `{}` is a complete config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// URL of the run endpoint. Relative URLs resolve against the page origin.
    pub endpoint: String,
    pub frame_interval_ms: u32,
    pub image_load_timeout_ms: u32,
    pub marker_radius_px: f64,
    /// Edge length of the square placeholder surface.
    pub placeholder_size_px: u32,
    /// CLI only; the browser relies on the platform's own fetch timeout.
    pub request_timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "/run".to_string(),
            frame_interval_ms: 200,
            image_load_timeout_ms: 10_000,
            marker_radius_px: 4.0,
            placeholder_size_px: 300,
            request_timeout_ms: 120_000,
        }
    }
}

impl ClientConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoint.trim().is_empty() {
            return Err(ConfigError::Invalid("endpoint must not be empty".into()));
        }
        if self.frame_interval_ms == 0 {
            return Err(ConfigError::Invalid("frame_interval_ms must be >= 1".into()));
        }
        if self.image_load_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "image_load_timeout_ms must be >= 1".into(),
            ));
        }
        if !(self.marker_radius_px.is_finite() && self.marker_radius_px > 0.0) {
            return Err(ConfigError::Invalid("marker_radius_px must be > 0".into()));
        }
        Ok(())
    }

    /// `endpoint` resolved against a server base URL, unless it is already absolute.
    pub fn endpoint_url(&self, base: &str) -> String {
        if self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://") {
            return self.endpoint.clone();
        }
        format!(
            "{}/{}",
            base.trim_end_matches('/'),
            self.endpoint.trim_start_matches('/')
        )
    }
}
