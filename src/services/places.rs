use super::{
    AutocompleteRequest, GeocodeResult, PlacesService, ServiceError, ServiceResult, Suggestion,
    HTTP_CLIENT,
};
use crate::core::geo::LatLng;
use async_trait::async_trait;
use serde::Deserialize;

const AUTOCOMPLETE_URL: &str = "https://maps.googleapis.com/maps/api/place/autocomplete/json";
const GEOCODE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

/// Place Autocomplete + Geocoding web services
pub struct GooglePlaces {
    api_key: String,
    autocomplete_url: String,
    geocode_url: String,
}

impl GooglePlaces {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            autocomplete_url: AUTOCOMPLETE_URL.to_string(),
            geocode_url: GEOCODE_URL.to_string(),
        }
    }

    /// Points both endpoints at another host, e.g. a local proxy
    pub fn with_base_urls(mut self, autocomplete: impl Into<String>, geocode: impl Into<String>) -> Self {
        self.autocomplete_url = autocomplete.into();
        self.geocode_url = geocode.into();
        self
    }

    async fn get(&self, url: &str, query: &[(&str, String)]) -> ServiceResult<String> {
        let response = HTTP_CLIENT
            .get(url)
            .query(query)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ServiceError::Http(format!("HTTP {} from {}", response.status(), url)));
        }
        Ok(response.text().await?)
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl PlacesService for GooglePlaces {
    async fn predictions(&self, request: &AutocompleteRequest) -> ServiceResult<Vec<Suggestion>> {
        let location = request.bias.location;
        let body = self
            .get(
                &self.autocomplete_url,
                &[
                    ("input", request.input.clone()),
                    ("location", format!("{},{}", location.lat, location.lng)),
                    ("radius", request.bias.radius_meters.to_string()),
                ],
            )
            .await?;
        parse_predictions(&body)
    }

    async fn geocode(&self, address: &str) -> ServiceResult<Vec<GeocodeResult>> {
        let body = self
            .get(&self.geocode_url, &[("address", address.to_string())])
            .await?;
        parse_geocode(&body)
    }
}

#[derive(Deserialize)]
struct AutocompleteResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Deserialize)]
struct Prediction {
    place_id: String,
    description: String,
}

#[derive(Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<RawGeocodeResult>,
}

#[derive(Deserialize)]
struct RawGeocodeResult {
    #[serde(default)]
    formatted_address: String,
    geometry: Geometry,
}

#[derive(Deserialize)]
struct Geometry {
    location: LatLng,
}

/// `OK` carries data, `ZERO_RESULTS` is an empty answer, anything else fails
fn check_status(status: &str, error_message: Option<String>) -> ServiceResult<bool> {
    match status {
        "OK" => Ok(true),
        "ZERO_RESULTS" => Ok(false),
        other => Err(ServiceError::Status {
            status: other.to_string(),
            message: error_message.unwrap_or_default(),
        }),
    }
}

pub(crate) fn parse_predictions(body: &str) -> ServiceResult<Vec<Suggestion>> {
    let response: AutocompleteResponse = serde_json::from_str(body)?;
    if !check_status(&response.status, response.error_message)? {
        return Ok(Vec::new());
    }
    Ok(response
        .predictions
        .into_iter()
        .map(|p| Suggestion::new(p.place_id, p.description))
        .collect())
}

pub(crate) fn parse_geocode(body: &str) -> ServiceResult<Vec<GeocodeResult>> {
    let response: GeocodeResponse = serde_json::from_str(body)?;
    if !check_status(&response.status, response.error_message)? {
        return Ok(Vec::new());
    }
    Ok(response
        .results
        .into_iter()
        .map(|r| GeocodeResult {
            formatted_address: r.formatted_address,
            location: r.geometry.location,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_predictions_ok() {
        let body = r#"{
            "status": "OK",
            "predictions": [
                {"place_id": "p1", "description": "A St, Kaunas", "types": ["route"]},
                {"place_id": "p2", "description": "B Ave, Kaunas"}
            ]
        }"#;
        let suggestions = parse_predictions(body).unwrap();
        assert_eq!(
            suggestions,
            vec![
                Suggestion::new("p1", "A St, Kaunas"),
                Suggestion::new("p2", "B Ave, Kaunas"),
            ]
        );
    }

    #[test]
    fn test_parse_predictions_zero_results() {
        let body = r#"{"status": "ZERO_RESULTS", "predictions": []}"#;
        assert_eq!(parse_predictions(body).unwrap(), Vec::new());
    }

    #[test]
    fn test_parse_predictions_denied() {
        let body = r#"{"status": "REQUEST_DENIED", "error_message": "The provided API key is invalid."}"#;
        let err = parse_predictions(body).unwrap_err();
        assert_eq!(
            err,
            ServiceError::Status {
                status: "REQUEST_DENIED".to_string(),
                message: "The provided API key is invalid.".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_geocode_extracts_location() {
        let body = r#"{
            "status": "OK",
            "results": [{
                "formatted_address": "Laisvės al., Kaunas, Lithuania",
                "geometry": {"location": {"lat": 54.8972, "lng": 23.9095}, "location_type": "GEOMETRIC_CENTER"}
            }]
        }"#;
        let results = parse_geocode(body).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].lat_lng(), LatLng::new(54.8972, 23.9095));
        assert_eq!(results[0].formatted_address, "Laisvės al., Kaunas, Lithuania");
    }

    #[test]
    fn test_parse_garbage_is_decode_error() {
        assert!(matches!(parse_geocode("<html>"), Err(ServiceError::Decode(_))));
    }
}
