use serde::{Deserialize, Serialize};

use crate::config::{CONFIG, Config};
use crate::error::{GleanError, Result};
use crate::fetch::Fetcher;
use crate::table::Table;

/// Current conditions for one city.
///
/// `temperature` is whatever unit the provider answered in; OpenWeatherMap
/// defaults to Kelvin unless `units` is set on the request.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WeatherRecord {
    #[serde(rename = "City")]
    pub city: String,
    #[serde(rename = "Country")]
    pub country: String,
    #[serde(rename = "Temperature")]
    pub temperature: f64,
    #[serde(rename = "Humidity")]
    pub humidity: u32,
    #[serde(rename = "Weather Condition")]
    pub condition: String,
}

pub struct WeatherClient {
    api_key: Option<String>,
    base_url: String,
    units: Option<String>,
    fetcher: Fetcher,
}

impl WeatherClient {
    pub fn new(api_key: impl Into<String>) -> Result<WeatherClient> {
        let mut client = Self::with_config(&CONFIG)?;
        client.api_key = Some(api_key.into());
        Ok(client)
    }

    /// Key, base URL and units all taken from the environment.
    pub fn from_config() -> Result<WeatherClient> {
        Self::with_config(&CONFIG)
    }

    pub fn with_config(config: &Config) -> Result<WeatherClient> {
        Ok(WeatherClient {
            api_key: config.weather_api_key.clone(),
            base_url: config.weather_base_url.clone(),
            units: config.weather_units.clone(),
            fetcher: Fetcher::new(config)?,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> WeatherClient {
        self.base_url = base_url.into();
        self
    }

    pub fn with_units(mut self, units: impl Into<String>) -> WeatherClient {
        self.units = Some(units.into());
        self
    }

    pub async fn fetch_raw(&self, city: &str) -> Result<String> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(GleanError::config(
                "no weather API key; set GLEANER_WEATHER_API_KEY",
            ));
        };
        let mut query = vec![("q", city), ("appid", api_key)];
        if let Some(units) = self.units.as_deref() {
            query.push(("units", units));
        }
        self.fetcher
            .get_text_with_query(&self.base_url, &query)
            .await
    }

    pub async fn current_record(&self, city: &str) -> Result<WeatherRecord> {
        let result = match self.fetch_raw(city).await {
            Ok(body) => parse_weather(&body),
            Err(e) => Err(e),
        };
        if let Err(e) = &result {
            log::warn!("error fetching weather data for {city}: {:#}", e);
        }
        result
    }

    /// Single-row table of the current conditions in `city`.
    pub async fn current(&self, city: &str) -> Result<Table> {
        let record = self.current_record(city).await?;
        Table::from_records(&[record])
    }
}

pub fn parse_weather(body: &str) -> Result<WeatherRecord> {
    let response: openweather::CurrentResponse = serde_json::from_str(body)
        .map_err(|e| GleanError::shape(format!("weather response: {e}")))?;
    response.try_into()
}

mod openweather {
    use super::WeatherRecord;
    use crate::error::GleanError;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    pub struct CurrentResponse {
        pub name: String,
        pub sys: Sys,
        pub main: Main,
        pub weather: Vec<Condition>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Sys {
        pub country: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct Main {
        pub temp: f64,
        pub humidity: u32,
    }

    #[derive(Debug, Deserialize)]
    pub struct Condition {
        pub description: String,
    }

    impl TryFrom<CurrentResponse> for WeatherRecord {
        type Error = GleanError;

        fn try_from(res: CurrentResponse) -> Result<Self, Self::Error> {
            let condition = res
                .weather
                .into_iter()
                .next()
                .ok_or_else(|| GleanError::shape("weather response has no conditions"))?;
            Ok(WeatherRecord {
                city: res.name,
                country: res.sys.country,
                temperature: res.main.temp,
                humidity: res.main.humidity,
                condition: condition.description,
            })
        }
    }
}
