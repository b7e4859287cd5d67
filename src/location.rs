use anyhow::{Result, anyhow};
use serde::Deserialize;

use crate::app::Coordinates;

const GEO_ENDPOINT: &str = "http://ip-api.com/json?fields=status,lat,lon";

#[derive(Deserialize, Debug)]
struct GeoResponse {
    status: String,
    #[serde(default)]
    lat: f64,
    #[serde(default)]
    lon: f64,
}

/// One-shot coarse geolocation via IP lookup, requested once at startup.
/// Any failure means the session simply runs without location context.
pub async fn resolve() -> Result<Coordinates> {
    let response = reqwest::get(GEO_ENDPOINT).await?;

    if !response.status().is_success() {
        return Err(anyhow!(
            "geolocation lookup failed with status: {}",
            response.status()
        ));
    }

    let geo: GeoResponse = response.json().await?;
    if geo.status != "success" {
        return Err(anyhow!("geolocation lookup returned status: {}", geo.status));
    }

    Ok(Coordinates {
        latitude: geo.lat,
        longitude: geo.lon,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_successful_lookup() {
        let geo: GeoResponse =
            serde_json::from_str(r#"{"status":"success","lat":37.7749,"lon":-122.4194}"#).unwrap();
        assert_eq!(geo.status, "success");
        assert_eq!(geo.lat, 37.7749);
        assert_eq!(geo.lon, -122.4194);
    }

    #[test]
    fn parses_failed_lookup_without_coordinates() {
        let geo: GeoResponse = serde_json::from_str(r#"{"status":"fail"}"#).unwrap();
        assert_eq!(geo.status, "fail");
        assert_eq!(geo.lat, 0.0);
    }
}
