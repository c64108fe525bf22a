use dotenvy::dotenv;
use once_cell::sync::Lazy;
use std::env;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_WEATHER_BASE_URL: &str = "http://api.openweathermap.org/data/2.5/weather";
pub const DEFAULT_STAFF_CONTAINER: &str = "div.text-only";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_SITEMAP_CONCURRENCY: usize = 4;

pub static CONFIG: Lazy<Config> = Lazy::new(|| {
    dotenv().ok(); // Load .env file if present
    Config::from_env()
});

#[derive(Debug, Clone)]
pub struct Config {
    pub weather_api_key: Option<String>,
    pub weather_base_url: String,
    /// Passed through to the provider as `units`; left off the request when unset.
    pub weather_units: Option<String>,
    pub http_timeout: Duration,
    pub user_agent: String,
    pub sitemap_concurrency: usize,
    pub staff_container: String,
}

impl Config {
    pub fn from_env() -> Config {
        Config {
            weather_api_key: get_env_opt("GLEANER_WEATHER_API_KEY"),
            weather_base_url: get_env_or_default(
                "GLEANER_WEATHER_BASE_URL",
                DEFAULT_WEATHER_BASE_URL,
            ),
            weather_units: get_env_opt("GLEANER_WEATHER_UNITS"),
            http_timeout: Duration::from_secs(get_parsed_or_default(
                "GLEANER_HTTP_TIMEOUT_SECS",
                DEFAULT_TIMEOUT_SECS,
            )),
            user_agent: get_env_or_default("GLEANER_USER_AGENT", &default_user_agent()),
            sitemap_concurrency: get_parsed_or_default(
                "GLEANER_SITEMAP_CONCURRENCY",
                DEFAULT_SITEMAP_CONCURRENCY,
            )
            .max(1),
            staff_container: get_env_or_default("GLEANER_STAFF_CONTAINER", DEFAULT_STAFF_CONTAINER),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            weather_api_key: None,
            weather_base_url: DEFAULT_WEATHER_BASE_URL.to_string(),
            weather_units: None,
            http_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: default_user_agent(),
            sitemap_concurrency: DEFAULT_SITEMAP_CONCURRENCY,
            staff_container: DEFAULT_STAFF_CONTAINER.to_string(),
        }
    }
}

fn default_user_agent() -> String {
    format!("gleaner/{}", env!("CARGO_PKG_VERSION"))
}

fn get_env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn get_env_or_default(key: &str, default: &str) -> String {
    get_env_opt(key).unwrap_or_else(|| default.to_string())
}

fn get_parsed_or_default<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy + std::fmt::Display,
{
    match get_env_opt(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("ignoring {key}={raw:?}, not a valid number; using {default}");
            default
        }),
        None => default,
    }
}
