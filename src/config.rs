use crate::map::Station;
use chrono::FixedOffset;
use std::time::Duration;
use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub web: WebConfig,

    pub auth: AuthConfig,

    #[serde(default)]
    pub tracking: TrackingConfig,

    #[serde(default)]
    pub assets: AssetsConfig,

    #[serde(default)]
    pub fixtures: FixturesConfig,

    #[serde(default)]
    pub station: Station,
}

#[derive(Debug, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_bind")]
    pub bind: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct AuthConfig {
    pub username: Option<String>,
    pub password: Option<String>,

    /// Name shown in the tracking page greeting.
    #[serde(default = "default_display_name")]
    pub display_name: String,

    /// Sessions idle longer than this are dropped.
    #[serde(default = "default_session_ttl_seconds")]
    pub session_ttl_seconds: u64,

    /// Upper bound on live sessions; the oldest are evicted first.
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

#[derive(Debug, Deserialize)]
pub struct TrackingConfig {
    #[serde(default = "default_utc_offset_hours")]
    pub utc_offset_hours: i32,

    #[serde(default = "default_base_date_offset_days")]
    pub base_date_offset_days: i64,
}

#[derive(Debug, Deserialize)]
pub struct AssetsConfig {
    #[serde(default = "default_assets_dir")]
    pub dir: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct FixturesConfig {
    /// Order fixture JSON; the bundled sample orders are used when unset.
    pub orders_path: Option<String>,
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8501
}

fn default_display_name() -> String {
    "Induck".to_string()
}

fn default_session_ttl_seconds() -> u64 {
    12 * 60 * 60
}

fn default_max_sessions() -> usize {
    1024
}

fn default_utc_offset_hours() -> i32 {
    9
}

fn default_base_date_offset_days() -> i64 {
    2
}

fn default_assets_dir() -> String {
    "assets".to_string()
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
        }
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            utc_offset_hours: default_utc_offset_hours(),
            base_date_offset_days: default_base_date_offset_days(),
        }
    }
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            dir: default_assets_dir(),
        }
    }
}

impl AuthConfig {
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_seconds)
    }
}

impl TrackingConfig {
    /// The fixed zone every tracking time is shown in. `None` if out of range.
    pub fn utc_offset(&self) -> Option<FixedOffset> {
        self.utc_offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
    }
}

/// Load configuration from config.toml and environment variables
pub fn load() -> Result<Config, figment::Error> {
    Figment::new()
        .merge(Toml::file("config.toml"))
        // Use double-underscore nesting for snake_case keys
        .merge(Env::prefixed("DUCKDAL_").split("__"))
        .extract()
}

/// Validate configuration and return a user-friendly error
pub fn validate(config: &Config) -> Result<(), String> {
    let auth = &config.auth;

    if auth.username.as_deref().is_none_or(str::is_empty) {
        return Err("auth.username is required".into());
    }

    if auth.password.as_deref().is_none_or(str::is_empty) {
        return Err("auth.password is required".into());
    }

    if auth.session_ttl_seconds == 0 {
        return Err("auth.session_ttl_seconds must be greater than 0".into());
    }

    if auth.max_sessions == 0 {
        return Err("auth.max_sessions must be greater than 0".into());
    }

    if config.web.port == 0 {
        return Err("web.port must be greater than 0".into());
    }

    if config.tracking.utc_offset().is_none() {
        return Err("tracking.utc_offset_hours must be between -23 and 23".into());
    }

    if !config.station.is_valid() {
        return Err("station.latitude/longitude are out of range".into());
    }

    Ok(())
}

/// A sanitized view of AuthConfig safe for logging
#[derive(Debug)]
#[allow(dead_code)]
pub struct SanitizedAuthConfig {
    pub username: String,
    pub password: String,
    pub display_name: String,
    pub session_ttl_seconds: u64,
    pub max_sessions: usize,
}

impl AuthConfig {
    pub fn sanitized_for_log(&self) -> SanitizedAuthConfig {
        SanitizedAuthConfig {
            username: self.username.clone().unwrap_or_else(|| "<not set>".into()),
            password: if self.password.is_some() {
                "******".into()
            } else {
                "<not set>".into()
            },
            display_name: self.display_name.clone(),
            session_ttl_seconds: self.session_ttl_seconds,
            max_sessions: self.max_sessions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            web: WebConfig::default(),
            auth: AuthConfig {
                username: Some("test".into()),
                password: Some("test".into()),
                display_name: default_display_name(),
                session_ttl_seconds: default_session_ttl_seconds(),
                max_sessions: default_max_sessions(),
            },
            tracking: TrackingConfig::default(),
            assets: AssetsConfig::default(),
            fixtures: FixturesConfig::default(),
            station: Station::default(),
        }
    }

    #[test]
    fn defaults_are_valid() {
        assert_eq!(validate(&config()), Ok(()));
    }

    #[test]
    fn missing_password_is_rejected() {
        let mut config = config();
        config.auth.password = None;
        assert_eq!(validate(&config), Err("auth.password is required".into()));
    }

    #[test]
    fn session_limits_must_be_positive() {
        let mut no_sessions = config();
        no_sessions.auth.max_sessions = 0;
        assert_eq!(
            validate(&no_sessions),
            Err("auth.max_sessions must be greater than 0".into())
        );

        let mut no_ttl = config();
        no_ttl.auth.session_ttl_seconds = 0;
        assert_eq!(
            validate(&no_ttl),
            Err("auth.session_ttl_seconds must be greater than 0".into())
        );
    }

    #[test]
    fn empty_username_is_rejected() {
        let mut config = config();
        config.auth.username = Some(String::new());
        assert_eq!(validate(&config), Err("auth.username is required".into()));
    }

    #[test]
    fn offset_out_of_range_is_rejected() {
        let mut config = config();
        config.tracking.utc_offset_hours = 24;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn default_offset_is_kst() {
        let offset = TrackingConfig::default().utc_offset().unwrap();
        assert_eq!(offset.local_minus_utc(), 9 * 3600);
    }

    #[test]
    fn sanitized_config_masks_password() {
        let sanitized = config().auth.sanitized_for_log();
        assert_eq!(sanitized.username, "test");
        assert_eq!(sanitized.password, "******");
    }

    #[test]
    fn loads_sections_from_toml() {
        let config: Config = Figment::new()
            .merge(Toml::string(
                r#"
                [auth]
                username = "duck"
                password = "dal"

                [tracking]
                base_date_offset_days = 0

                [station]
                latitude = 37.5
                "#,
            ))
            .extract()
            .unwrap();

        assert_eq!(config.auth.username.as_deref(), Some("duck"));
        assert_eq!(config.tracking.base_date_offset_days, 0);
        assert_eq!(config.tracking.utc_offset_hours, 9);
        assert_eq!(config.web.port, 8501);
        assert_eq!(config.station.latitude, 37.5);
        assert_eq!(config.station.label, "스테이션 위치");
    }
}
