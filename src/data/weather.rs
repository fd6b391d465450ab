//! OpenWeatherMap API client
//!
//! This module provides the `WeatherSource` seam the dashboard fetches through,
//! and its HTTP implementation against the OpenWeatherMap 2.5 API.

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;

use super::{CurrentConditions, Forecast};

/// Base URL for the OpenWeatherMap API
pub const OPEN_WEATHER_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

/// Number of days requested for the daily forecast
const FORECAST_DAYS: u8 = 5;

/// Errors that can occur when fetching weather data
#[derive(Debug, Error)]
pub enum WeatherError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// The API answered with a non-success status
    #[error("weather API returned HTTP {status}")]
    Status { status: u16 },

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),
}

impl WeatherError {
    /// True when the API rejected the location itself (HTTP 400 or 404)
    pub fn is_invalid_location(&self) -> bool {
        matches!(self, WeatherError::Status { status: 400 | 404 })
    }
}

/// A provider of current conditions and daily forecasts keyed by US postal code
#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn current_conditions(&self, zip: &str) -> Result<CurrentConditions, WeatherError>;

    async fn daily_forecast(&self, zip: &str) -> Result<Forecast, WeatherError>;
}

/// Client for fetching weather data from the OpenWeatherMap API
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    client: Client,
    base_url: String,
    app_id: String,
}

impl OpenWeatherClient {
    /// Create a new OpenWeatherClient for the given API key
    pub fn new(app_id: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: OPEN_WEATHER_BASE_URL.to_string(),
            app_id: app_id.into(),
        }
    }

    /// Points the client at a different API root (e.g. a mock server)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Fetch and decode `{base_url}/{path}` for a US postal code
    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        zip: &str,
        extra: &[(&str, String)],
    ) -> Result<T, WeatherError> {
        let url = format!("{}/{}", self.base_url, path);
        let mut query = vec![
            ("zip", format!("{},us", zip)),
            ("units", "imperial".to_string()),
            ("APPID", self.app_id.clone()),
        ];
        query.extend(extra.iter().cloned());

        tracing::debug!(%url, zip, "requesting weather data");
        let response = self.client.get(&url).query(&query).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(WeatherError::Status {
                status: status.as_u16(),
            });
        }

        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherClient {
    async fn current_conditions(&self, zip: &str) -> Result<CurrentConditions, WeatherError> {
        self.get_json("weather", zip, &[]).await
    }

    async fn daily_forecast(&self, zip: &str) -> Result<Forecast, WeatherError> {
        self.get_json("forecast/daily", zip, &[("cnt", FORECAST_DAYS.to_string())])
            .await
    }
}

/// Icon shown for a weather condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherIcon {
    Storm,
    Rain,
    LightRain,
    Snow,
    Clouds,
    Fog,
    Clear,
}

impl WeatherIcon {
    /// Short label for terminal output
    pub fn label(self) -> &'static str {
        match self {
            WeatherIcon::Storm => "storm",
            WeatherIcon::Rain => "rain",
            WeatherIcon::LightRain => "light rain",
            WeatherIcon::Snow => "snow",
            WeatherIcon::Clouds => "clouds",
            WeatherIcon::Fog => "fog",
            WeatherIcon::Clear => "clear",
        }
    }
}

/// Map an OpenWeatherMap condition id to its icon
///
/// Condition groups:
/// - 200-232: Thunderstorm
/// - 500: Light rain, 501-511: Rain, 520-531: Shower rain
/// - 600-622: Snow
/// - 741, 761: Fog / dust
/// - 801-804: Clouds
///
/// Everything else, including 800 (clear sky), shows as clear.
pub fn weather_icon(id: u16) -> WeatherIcon {
    match id {
        200..=232 => WeatherIcon::Storm,
        501..=511 => WeatherIcon::Rain,
        500 | 520..=531 => WeatherIcon::LightRain,
        600..=622 => WeatherIcon::Snow,
        801..=804 => WeatherIcon::Clouds,
        741 | 761 => WeatherIcon::Fog,
        _ => WeatherIcon::Clear,
    }
}
