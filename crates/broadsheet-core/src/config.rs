use std::path::{Path, PathBuf};

use chrono_tz::Tz;

use crate::error::ConfigError;

pub const DEFAULT_INI_PATH: &str = "seoBusinessInsights.ini";
pub const DEFAULT_API_URL: &str = "https://api.botify.com/v1";
pub const DEFAULT_APP_URL: &str = "https://app.botify.com";
pub const DEFAULT_BIND_PORT: u16 = 8080;

/// First path segments owned by the front-end's own routes. The cache root
/// is served under its basename, which must not be one of these.
pub const RESERVED_MOUNTS: [&str; 3] = ["static", "submit", "health"];

#[derive(Debug, Clone)]
pub struct Config {
    pub api_token: String,
    pub api_url: String,
    pub app_url: String,
    pub log_folder: PathBuf,
    pub cache_root: PathBuf,
    pub hosting: HostingMode,
    pub timezone: Tz,
    pub server: ServerSettings,
    pub insights: InsightsSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostingMode {
    Local,
    Docker,
}

impl HostingMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "local" => Some(Self::Local),
            "docker" => Some(Self::Docker),
            _ => None,
        }
    }
}

/// Values read from the optional INI file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    pub protocol: String,
    pub hostname: String,
    /// Empty when the INI file does not name a port.
    pub port: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            protocol: "https".to_string(),
            hostname: "localhost".to_string(),
            port: String::new(),
        }
    }
}

impl ServerSettings {
    /// Read `protocol`, `hostname` and `port` from the root section of an INI
    /// file. A missing file yields the defaults; a malformed one is an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = config::File::from(path)
            .format(config::FileFormat::Ini)
            .required(false);
        let parsed = config::Config::builder()
            .add_source(source)
            .build()
            .map_err(|e| ConfigError::Ini(e.to_string()))?;

        let defaults = Self::default();
        let read = |key: &str, fallback: String| {
            parsed
                .get_string(key)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(fallback)
        };

        Ok(Self {
            protocol: read("protocol", defaults.protocol),
            hostname: read("hostname", defaults.hostname),
            port: read("port", defaults.port),
        })
    }
}

/// Tunables of the insights pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsightsSettings {
    /// Rows requested per keyword query (wordcloud size).
    pub keywords_in_cloud: u32,
    /// Rows shown in the keyword detail tables.
    pub top_keywords: usize,
    pub forecast_increment: u64,
    pub forecast_max_visits: u64,
}

impl Default for InsightsSettings {
    fn default() -> Self {
        Self {
            keywords_in_cloud: 50,
            top_keywords: 50,
            forecast_increment: 500_000,
            forecast_max_visits: 10_000_000,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable lookup. `from_env`
    /// passes the process environment; tests pass a map.
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let require = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));

        let api_token = require("BROADSHEET_API_TOKEN")?;
        let log_folder = PathBuf::from(require("BROADSHEET_LOG_FOLDER")?);
        let cache_root = PathBuf::from(require("BROADSHEET_CACHE_FOLDER")?);

        let hosting_raw = require("BROADSHEET_HOSTING")?;
        let hosting = HostingMode::parse(&hosting_raw).ok_or(ConfigError::Invalid {
            name: "BROADSHEET_HOSTING",
            value: hosting_raw,
        })?;

        let timezone = match get("BROADSHEET_TIMEZONE") {
            Some(raw) => raw.parse::<Tz>().map_err(|_| ConfigError::Invalid {
                name: "BROADSHEET_TIMEZONE",
                value: raw,
            })?,
            None => Tz::UTC,
        };

        let ini_path = get("BROADSHEET_INI").unwrap_or_else(|| DEFAULT_INI_PATH.to_string());
        let server = ServerSettings::load(Path::new(&ini_path))?;

        let defaults = InsightsSettings::default();
        let insights = InsightsSettings {
            keywords_in_cloud: parse_or(
                get("BROADSHEET_KEYWORDS_IN_CLOUD"),
                "BROADSHEET_KEYWORDS_IN_CLOUD",
                defaults.keywords_in_cloud,
            )?,
            top_keywords: parse_or(
                get("BROADSHEET_TOP_KEYWORDS"),
                "BROADSHEET_TOP_KEYWORDS",
                defaults.top_keywords,
            )?,
            forecast_increment: parse_or(
                get("BROADSHEET_FORECAST_INCREMENT"),
                "BROADSHEET_FORECAST_INCREMENT",
                defaults.forecast_increment,
            )?,
            forecast_max_visits: parse_or(
                get("BROADSHEET_FORECAST_MAX_VISITS"),
                "BROADSHEET_FORECAST_MAX_VISITS",
                defaults.forecast_max_visits,
            )?,
        };
        if insights.forecast_increment == 0 {
            return Err(ConfigError::Invalid {
                name: "BROADSHEET_FORECAST_INCREMENT",
                value: "0".to_string(),
            });
        }

        let cfg = Self {
            api_token,
            api_url: get("BROADSHEET_API_URL")
                .unwrap_or_else(|| DEFAULT_API_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            app_url: get("BROADSHEET_APP_URL")
                .unwrap_or_else(|| DEFAULT_APP_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            log_folder,
            cache_root,
            hosting,
            timezone,
            server,
            insights,
        };
        let mount = cfg.cache_mount();
        if RESERVED_MOUNTS.contains(&mount.as_str()) || mount.contains(['{', '}']) {
            return Err(ConfigError::Invalid {
                name: "BROADSHEET_CACHE_FOLDER",
                value: cfg.cache_root.display().to_string(),
            });
        }
        Ok(cfg)
    }

    /// Host used in generated links: `hostname:port` when running locally
    /// with a port, the bare hostname otherwise.
    pub fn full_host(&self) -> String {
        match self.hosting {
            HostingMode::Local if !self.server.port.is_empty() => {
                format!("{}:{}", self.server.hostname, self.server.port)
            }
            _ => self.server.hostname.clone(),
        }
    }

    /// Absolute URL for a path relative to the served root.
    pub fn public_url(&self, relative: &str) -> String {
        format!(
            "{}://{}/{}",
            self.server.protocol,
            self.full_host(),
            relative.trim_start_matches('/')
        )
    }

    pub fn bind_port(&self) -> u16 {
        self.server.port.parse().unwrap_or(DEFAULT_BIND_PORT)
    }

    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.bind_port())
    }

    /// URL path segment under which the cache root is served.
    pub fn cache_mount(&self) -> String {
        self.cache_root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .filter(|n| !n.is_empty() && n != "." && n != "..")
            .unwrap_or_else(|| "insights".to_string())
    }

    pub fn log_file(&self) -> PathBuf {
        self.log_folder.join("_seoBusinessInsights.log")
    }
}

fn parse_or<T: std::str::FromStr>(
    raw: Option<String>,
    name: &'static str,
    fallback: T,
) -> Result<T, ConfigError> {
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(fallback),
    }
}
