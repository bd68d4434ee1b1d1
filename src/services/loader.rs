use super::{LoadRequest, MapLoader, ServiceError, ServiceResult, HTTP_CLIENT};
use async_trait::async_trait;

const MAPS_SCRIPT_URL: &str = "https://maps.googleapis.com/maps/api/js";

/// Fetches the hosted map bootstrap script; a successful download with the
/// given key and libraries is what "loaded" means.
pub struct GoogleMapsLoader {
    script_url: String,
}

impl GoogleMapsLoader {
    pub fn new() -> Self {
        Self {
            script_url: MAPS_SCRIPT_URL.to_string(),
        }
    }

    pub fn with_script_url(mut self, url: impl Into<String>) -> Self {
        self.script_url = url.into();
        self
    }
}

impl Default for GoogleMapsLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl MapLoader for GoogleMapsLoader {
    async fn load(&self, request: &LoadRequest) -> ServiceResult<()> {
        let api_key = request
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or(ServiceError::MissingApiKey)?;

        let libraries = request.libraries.join(",");
        log::debug!("loading map script with libraries [{libraries}]");
        let response = HTTP_CLIENT
            .get(&self.script_url)
            .query(&[("key", api_key), ("libraries", libraries.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ServiceError::Http(format!(
                "HTTP {} loading map script",
                response.status()
            )));
        }
        Ok(())
    }
}
