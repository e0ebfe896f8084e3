use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Deserialize;

use crate::{
    cli::GlobalArgs,
    error::{AppError, Result},
};

const DEFAULT_CONFIG_PATH: &str = "config/homebook.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub session_file: String,
    pub timezone: String,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:4053/".to_string(),
            session_file: client::DEFAULT_SESSION_PATH.to_string(),
            timezone: "Europe/Berlin".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Today's date in the configured timezone.
    pub fn today(&self) -> Result<NaiveDate> {
        let tz: Tz = self
            .timezone
            .parse()
            .map_err(|_| AppError::Timezone(self.timezone.clone()))?;
        Ok(Utc::now().with_timezone(&tz).date_naive())
    }
}

/// File, then `HOMEBOOK_*` environment, then command line.
pub fn load(args: &GlobalArgs) -> Result<AppConfig> {
    let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(config::Environment::with_prefix("HOMEBOOK"));
    let mut settings: AppConfig = builder.build()?.try_deserialize()?;

    if let Some(base_url) = &args.base_url {
        settings.base_url = base_url.clone();
    }
    if let Some(session_file) = &args.session_file {
        settings.session_file = session_file.clone();
    }
    if let Some(timezone) = &args.timezone {
        settings.timezone = timezone.clone();
    }

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_line_overrides_defaults() {
        let args = GlobalArgs {
            config: Some("does/not/exist".to_string()),
            base_url: Some("http://backend:4053/".to_string()),
            session_file: None,
            timezone: Some("UTC".to_string()),
        };
        let settings = load(&args).unwrap();
        assert_eq!(settings.base_url, "http://backend:4053/");
        assert_eq!(settings.session_file, client::DEFAULT_SESSION_PATH);
        assert!(settings.today().is_ok());
    }

    #[test]
    fn unknown_timezone_is_rejected() {
        let settings = AppConfig {
            timezone: "Mars/Olympus".to_string(),
            ..AppConfig::default()
        };
        assert!(matches!(settings.today(), Err(AppError::Timezone(_))));
    }
}
