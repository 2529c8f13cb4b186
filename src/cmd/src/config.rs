use std::num::NonZeroU64;
use std::path::Path;

use common::config::FunnelDefaults;
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing::Level;

use crate::error::Error;
use crate::error::Result;

#[derive(Debug, Deserialize, PartialEq, Eq)]
pub struct Log {
    pub level: LogLevel,
}

// every field falls back to the built-in default
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
pub struct Funnel {
    pub interval: Option<String>,
    pub window_interval: Option<u64>,
    pub window_interval_unit: Option<String>,
    pub breakdown_attribution_type: Option<String>,
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
pub struct Config {
    pub log: Log,
    #[serde(default)]
    pub funnel: Funnel,
}

impl Config {
    /// Reads a TOML file, then `FUNNEL_CTX__<SECTION>__<KEY>` environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        let config = ::config::Config::builder()
            .add_source(::config::File::from(path))
            .add_source(
                ::config::Environment::with_prefix("FUNNEL_CTX")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

impl TryInto<common::config::Config> for Config {
    type Error = Error;

    fn try_into(self) -> std::result::Result<common::config::Config, Self::Error> {
        let mut funnel = FunnelDefaults::default();
        if let Some(v) = self.funnel.interval {
            funnel.interval = v.parse()?;
        }
        if let Some(v) = self.funnel.window_interval {
            funnel.window_interval = NonZeroU64::new(v).ok_or_else(|| {
                Error::BadRequest("funnel.window_interval must be positive".to_string())
            })?;
        }
        if let Some(v) = self.funnel.window_interval_unit {
            funnel.window_interval_unit = v.parse()?;
        }
        if let Some(v) = self.funnel.breakdown_attribution_type {
            funnel.breakdown_attribution_type = v.parse()?;
        }

        Ok(common::config::Config {
            log: common::config::Log {
                level: self.log.level.into(),
            },
            funnel,
        })
    }
}

#[derive(Deserialize, Copy, Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    #[serde(rename = "trace")]
    Trace,
    #[serde(rename = "debug")]
    Debug,
    #[serde(rename = "info")]
    Info,
    #[serde(rename = "warn")]
    Warn,
    #[serde(rename = "error")]
    Error,
}

impl From<LogLevel> for LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
        .into()
    }
}
