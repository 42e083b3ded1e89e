use serde::{Deserialize, Serialize};
use std::env;

use crate::{
    entities::{Place, PlaceSuggestion},
    error::{invalid_input_error, places_unavailable_error, upstream_error, Error},
};

const DEFAULT_API_BASE: &str = "maps.googleapis.com";
const COUNTRY: &str = "country:in";

#[derive(Clone, Debug, Serialize, Deserialize)]
struct Response<T> {
    status: String,
    result: Option<T>,
    results: Option<T>,
    predictions: Option<T>,
}

#[derive(Clone, Debug)]
pub struct GoogleMaps {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
}

impl GoogleMaps {
    /// Reads `GOOGLE_MAPS_API_KEY` and optionally `GOOGLE_MAPS_API_BASE`.
    pub async fn from_env() -> Result<Self, Error> {
        let api_key = env::var("GOOGLE_MAPS_API_KEY").map_err(|_| {
            tracing::error!("Google Maps API key not found");
            places_unavailable_error()
        })?;

        if api_key.trim().is_empty() {
            return Err(places_unavailable_error());
        }

        let api_base = env::var("GOOGLE_MAPS_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.into());

        Ok(Self::new(api_base, api_key))
    }

    pub fn new(api_base: String, api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base,
            api_key,
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn find_place_suggestions(
        &self,
        input: String,
        session_token: String,
    ) -> Result<Vec<PlaceSuggestion>, Error> {
        let url = format!("https://{}/maps/api/place/autocomplete/json", self.api_base);

        let res = self
            .client
            .get(url)
            .query(&[("key", &self.api_key)])
            .query(&[("input", input)])
            .query(&[("components", COUNTRY)])
            .query(&[("sessiontoken", session_token)])
            .send()
            .await?;

        check_status(res.status().as_u16())?;

        let data: Response<Vec<PlaceSuggestion>> = res.json().await?;

        if data.status == "ZERO_RESULTS" {
            return Ok(vec![]);
        }

        if data.status != "OK" {
            return Err(upstream_error());
        }

        data.predictions.ok_or_else(upstream_error)
    }

    #[tracing::instrument(skip(self))]
    pub async fn find_place(&self, id: String, session_token: String) -> Result<Place, Error> {
        let url = format!("https://{}/maps/api/place/details/json", self.api_base);

        let res = self
            .client
            .get(url)
            .query(&[("key", &self.api_key)])
            .query(&[("sessiontoken", session_token)])
            .query(&[("place_id", id)])
            .query(&[("fields", "formatted_address,place_id,geometry")])
            .send()
            .await?;

        check_status(res.status().as_u16())?;

        let data: Response<Place> = res.json().await?;

        match data.status.as_str() {
            "OK" => data.result.ok_or_else(upstream_error),
            "INVALID_REQUEST" | "NOT_FOUND" => Err(invalid_input_error()),
            _ => Err(upstream_error()),
        }
    }
}

fn check_status(status_code: u16) -> Result<(), Error> {
    if (400..500).contains(&status_code) {
        return Err(invalid_input_error());
    } else if status_code != 200 {
        return Err(upstream_error());
    }

    Ok(())
}

#[test]
fn client_errors_are_invalid_input() {
    assert_eq!(check_status(200), Ok(()));
    assert_eq!(check_status(404), Err(invalid_input_error()));
    assert_eq!(check_status(503), Err(upstream_error()));
}

#[test]
fn autocomplete_payload_decodes() {
    let body = r#"{
        "status": "OK",
        "predictions": [
            { "place_id": "ChIJbU60yXAWrjsR4E9-UejD3_g", "description": "Bengaluru, Karnataka, India" }
        ]
    }"#;

    let data: Response<Vec<PlaceSuggestion>> = serde_json::from_str(body).unwrap();
    let predictions = data.predictions.unwrap();

    assert_eq!(data.status, "OK");
    assert_eq!(predictions[0].description, "Bengaluru, Karnataka, India");
}

#[test]
fn details_payload_decodes() {
    let body = r#"{
        "status": "OK",
        "result": {
            "place_id": "ChIJbU60yXAWrjsR4E9-UejD3_g",
            "formatted_address": "Bengaluru, Karnataka, India",
            "geometry": { "location": { "lat": 12.9716, "lng": 77.5946 } }
        }
    }"#;

    let data: Response<Place> = serde_json::from_str(body).unwrap();
    let place = data.result.unwrap();

    assert_eq!(place.geometry.location.lat, 12.9716);
}
