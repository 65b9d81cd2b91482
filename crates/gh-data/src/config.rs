//! Endpoint configuration, read from the environment at startup.

const API_URL_VAR: &str = "GHDASH_API_URL";
const ATLAS_URL_VAR: &str = "GHDASH_ATLAS_URL";

const DEFAULT_API_URL: &str = "http://127.0.0.1:3000/api";
const DEFAULT_ATLAS_URL: &str =
    "https://raw.githubusercontent.com/johan/world.geo.json/master/countries.geo.json";

/// Where the dashboard fetches its data from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Base URL of the profile API; `/data` is appended per request.
    pub api_url: String,
    /// GeoJSON source for country outlines.
    pub atlas_url: String,
}

impl ApiConfig {
    /// Read the configuration from `GHDASH_API_URL` and `GHDASH_ATLAS_URL`,
    /// falling back to a local backend and a public atlas.
    pub fn from_env() -> Self {
        let api_url = std::env::var(API_URL_VAR).unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let atlas_url =
            std::env::var(ATLAS_URL_VAR).unwrap_or_else(|_| DEFAULT_ATLAS_URL.to_string());
        tracing::info!(%api_url, %atlas_url, "resolved endpoint configuration");
        Self { api_url, atlas_url }
    }

    pub fn data_endpoint(&self) -> String {
        format!("{}/data", self.api_url.trim_end_matches('/'))
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            atlas_url: DEFAULT_ATLAS_URL.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_endpoint_handles_trailing_slash() {
        let config = ApiConfig {
            api_url: "http://example.com/api/".to_string(),
            ..Default::default()
        };
        assert_eq!(config.data_endpoint(), "http://example.com/api/data");
    }

    #[test]
    fn default_points_at_local_backend() {
        let config = ApiConfig::default();
        assert_eq!(config.data_endpoint(), "http://127.0.0.1:3000/api/data");
    }
}
