//! Weather data models for zipweather
//!
//! These mirror the parts of the OpenWeatherMap responses the dashboard uses.
//! Every type round-trips through serde so it can be cached verbatim.

pub mod weather;

pub use weather::{weather_icon, OpenWeatherClient, WeatherError, WeatherIcon, WeatherSource};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current weather conditions for a location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    /// Name of the place the postal code resolved to
    pub name: String,
    /// Condition descriptions, most significant first
    pub weather: Vec<WeatherDescription>,
    /// Temperature and humidity readings
    pub main: MainReadings,
}

impl CurrentConditions {
    /// The primary condition, if the API sent any
    pub fn primary(&self) -> Option<&WeatherDescription> {
        self.weather.first()
    }
}

/// One weather condition as reported by OpenWeatherMap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherDescription {
    /// Condition id (e.g. 800 for clear sky)
    pub id: u16,
    /// Condition group (e.g. "Rain")
    pub main: String,
    /// Human-readable description
    pub description: String,
}

/// Temperature readings in Fahrenheit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MainReadings {
    pub temp: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    /// Relative humidity percentage (0-100)
    #[serde(default)]
    pub humidity: u8,
}

/// A multi-day forecast for a location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub city: City,
    /// One entry per day, in chronological order
    pub list: Vec<DailyForecast>,
}

/// The place a forecast was computed for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub name: String,
    #[serde(default)]
    pub country: Option<String>,
}

/// Forecast for a single day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    /// Unix timestamp of the forecast day
    pub dt: i64,
    pub temp: DailyTemperature,
    pub weather: Vec<WeatherDescription>,
}

impl DailyForecast {
    /// The forecast day as a UTC timestamp
    pub fn date(&self) -> Option<DateTime<Utc>> {
        DateTime::<Utc>::from_timestamp(self.dt, 0)
    }
}

/// Daily temperature range in Fahrenheit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyTemperature {
    pub min: f64,
    pub max: f64,
}

/// Current conditions tagged with the postal code they were fetched for
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionsAndZip {
    pub zip: String,
    pub data: CurrentConditions,
}
