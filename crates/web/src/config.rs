use std::{env, error, fmt, net::SocketAddr, path::PathBuf};

use lifelog_api::{geocoder::NOMINATIM_URL, DEFAULT_API_URL};
use map::MapStyle;

pub const DEFAULT_BIND: &str = "0.0.0.0:3000";
pub const DEFAULT_WWW: &str = "./resources/www/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    MissingVariable(&'static str),
    InvalidValue { name: &'static str, value: String },
}

impl error::Error for ConfigError {}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::MissingVariable(name) => write!(f, "{} is not set", name),
            ConfigError::InvalidValue { name, value } => {
                write!(f, "invalid value for {}: {:?}", name, value)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_url: String,
    pub geocoder_url: String,
    pub map_style: MapStyle,
    pub bind: SocketAddr,
    pub www: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup("LIFELOG_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_owned());
        let geocoder_url =
            lookup("LIFELOG_GEOCODER_URL").unwrap_or_else(|| NOMINATIM_URL.to_owned());

        let map_style = match lookup("LIFELOG_MAP_STYLE").as_deref() {
            None | Some("osm") => MapStyle::default(),
            Some("mapbox") => {
                let token = lookup("MAPBOX_ACCESS_TOKEN")
                    .filter(|token| !token.is_empty())
                    .ok_or(ConfigError::MissingVariable("MAPBOX_ACCESS_TOKEN"))?;
                MapStyle::mapbox(token)
            }
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    name: "LIFELOG_MAP_STYLE",
                    value: other.to_owned(),
                })
            }
        };

        let bind = lookup("LIFELOG_BIND").unwrap_or_else(|| DEFAULT_BIND.to_owned());
        let bind = bind.parse().map_err(|_| ConfigError::InvalidValue {
            name: "LIFELOG_BIND",
            value: bind.clone(),
        })?;

        let www = lookup("LIFELOG_WWW")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_WWW));

        Ok(Self {
            api_url,
            geocoder_url,
            map_style,
            bind,
            www,
        })
    }
}
