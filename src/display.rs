//! Plain-text rendering of dashboard data for the terminal

use crate::data::{weather_icon, ConditionsAndZip, DailyForecast, Forecast};

/// One line summarising the current conditions of a location
pub fn format_conditions(conditions: &ConditionsAndZip) -> String {
    let data = &conditions.data;
    let summary = match data.primary() {
        Some(w) => format!("{} ({})", w.description, weather_icon(w.id).label()),
        None => "no conditions reported".to_string(),
    };
    format!(
        "{} {}: {:.0}°F, {} [low {:.0}°F / high {:.0}°F]",
        conditions.zip, data.name, data.main.temp, summary, data.main.temp_min, data.main.temp_max
    )
}

/// A heading line followed by one line per forecast day
pub fn format_forecast(zip: &str, forecast: &Forecast) -> Vec<String> {
    let mut lines = Vec::with_capacity(forecast.list.len() + 1);
    lines.push(format!("5-day forecast for {} ({})", forecast.city.name, zip));
    lines.extend(forecast.list.iter().map(format_day));
    lines
}

fn format_day(day: &DailyForecast) -> String {
    let date = day
        .date()
        .map(|d| d.format("%a %b %d").to_string())
        .unwrap_or_else(|| "unknown day".to_string());
    let summary = day
        .weather
        .first()
        .map(|w| weather_icon(w.id).label())
        .unwrap_or("unknown");
    format!("  {}: {}, {:.0}°F / {:.0}°F", date, summary, day.temp.min, day.temp.max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{City, CurrentConditions, DailyTemperature, MainReadings, WeatherDescription};

    fn rain() -> WeatherDescription {
        WeatherDescription {
            id: 500,
            main: "Rain".to_string(),
            description: "light rain".to_string(),
        }
    }

    #[test]
    fn test_format_conditions() {
        let conditions = ConditionsAndZip {
            zip: "10001".to_string(),
            data: CurrentConditions {
                name: "New York".to_string(),
                weather: vec![rain()],
                main: MainReadings {
                    temp: 55.4,
                    temp_min: 52.0,
                    temp_max: 58.1,
                    humidity: 82,
                },
            },
        };

        assert_eq!(
            format_conditions(&conditions),
            "10001 New York: 55°F, light rain (light rain) [low 52°F / high 58°F]"
        );
    }

    #[test]
    fn test_format_forecast() {
        let forecast = Forecast {
            city: City {
                name: "New York".to_string(),
                country: None,
            },
            list: vec![DailyForecast {
                dt: 1_721_044_800,
                temp: DailyTemperature { min: 60.2, max: 80.6 },
                weather: vec![rain()],
            }],
        };

        let lines = format_forecast("10001", &forecast);

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "5-day forecast for New York (10001)");
        assert_eq!(lines[1], "  Mon Jul 15: light rain, 60°F / 81°F");
    }
}
