//! Logging setup for the engine.
//!
//! Levels use the integer scale of the settings file (10 debug, 20 info,
//! 30 warning, 40 error, 50 critical). `RUST_LOG` directives still apply on
//! top of the configured level.

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::setting::{Settings, LOG_CONSOLE, LOG_LEVEL, SETTINGS};

pub const DEBUG: i32 = 10;
pub const INFO: i32 = 20;
pub const WARNING: i32 = 30;
pub const ERROR: i32 = 40;
pub const CRITICAL: i32 = 50;

static INIT: Once = Once::new();

/// Map an integer level to the closest tracing level
pub fn level_from_int(level: i32) -> Level {
    match level {
        i32::MIN..=DEBUG => Level::DEBUG,
        11..=INFO => Level::INFO,
        21..=WARNING => Level::WARN,
        _ => Level::ERROR,
    }
}

/// Logging switches read from settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogOptions {
    pub level: Level,
    pub console: bool,
}

impl LogOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        let level = settings
            .get_int(LOG_LEVEL)
            .and_then(|v| i32::try_from(v).ok())
            .unwrap_or(INFO);
        Self {
            level: level_from_int(level),
            console: settings.get_bool(LOG_CONSOLE).unwrap_or(true),
        }
    }
}

/// Install the global subscriber from [`SETTINGS`].
///
/// Only the first call installs a subscriber. A subscriber already set by
/// the host application is left in place.
pub fn init_logger() {
    INIT.call_once(|| {
        let options = LogOptions::from_settings(&SETTINGS);
        let filter = EnvFilter::from_default_env().add_directive(options.level.into());
        let registry = tracing_subscriber::registry().with(filter);

        let installed = if options.console {
            let console = fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr);
            registry.with(console).try_init()
        } else {
            registry.try_init()
        };

        if installed.is_ok() {
            tracing::debug!("日志系统初始化完成, level={}", options.level);
        }
    });
}
