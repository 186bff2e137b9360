//! Logging utilities and configuration for tune-guard.
//!
//! The library only emits `tracing` events; installing a subscriber is left to
//! the host. [`setup::init_logging`] is provided for binaries, examples and
//! tests that want a ready-made one.

use tracing::Level;

/// Logging configuration for tune-guard components.
///
/// Per-cell logging can produce thousands of events for a single table, so it
/// is off unless explicitly requested. Summary events are emitted only at or
/// above `base_level`; the installed subscriber still filters what remains.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Most verbose level tune-guard components emit summaries at
    pub base_level: Level,
    /// Whether to log individual changed or flagged cells
    pub log_cell_details: bool,
    /// Maximum length for logged field values (legacy text can be large)
    pub max_field_length: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            base_level: Level::DEBUG,
            log_cell_details: false,
            max_field_length: 256,
        }
    }
}

impl LogConfig {
    /// Creates a verbose configuration suitable for debugging.
    pub fn verbose() -> Self {
        Self {
            base_level: Level::DEBUG,
            log_cell_details: true,
            max_field_length: 1024,
        }
    }

    /// Creates a minimal configuration for production with lowest overhead.
    pub fn production() -> Self {
        Self {
            base_level: Level::WARN,
            log_cell_details: false,
            max_field_length: 128,
        }
    }

    /// Sets the most verbose level emitted.
    pub fn with_base_level(mut self, level: Level) -> Self {
        self.base_level = level;
        self
    }

    /// Returns true if events at `level` pass this configuration.
    pub fn enables(&self, level: Level) -> bool {
        // tracing orders more verbose levels as greater
        level <= self.base_level
    }

    /// Sets whether individual cells are logged.
    pub fn with_cell_details(mut self, enabled: bool) -> Self {
        self.log_cell_details = enabled;
        self
    }

    /// Truncates a value to this configuration's field limit.
    pub fn field(&self, value: &str) -> String {
        truncate_field(value, self.max_field_length)
    }
}

/// Macro for conditional per-cell logging.
#[macro_export]
macro_rules! log_cell {
    ($config:expr, $($arg:tt)*) => {
        if $config.log_cell_details {
            tracing::debug!($($arg)*);
        }
    };
}

/// Macro for summary events that respect the configured base level.
#[macro_export]
macro_rules! log_debug {
    ($config:expr, $($arg:tt)*) => {
        if $config.enables(tracing::Level::DEBUG) {
            tracing::debug!($($arg)*);
        }
    };
}

/// Truncates a string to the maximum field length if needed.
///
/// The cut is moved back to the nearest character boundary so multi-byte
/// input never panics.
pub fn truncate_field(value: &str, max_length: usize) -> String {
    if value.len() <= max_length {
        value.to_string()
    } else {
        let mut end = max_length;
        while !value.is_char_boundary(end) {
            end -= 1;
        }
        let truncated = &value[..end];
        format!("{truncated}...(truncated)")
    }
}

/// Utilities for setting up structured logging.
pub mod setup {
    use tracing::Level;

    /// Configuration for tune-guard's logging setup.
    #[derive(Debug, Clone)]
    pub struct LoggingConfig {
        /// Log level for the application
        pub level: Level,
        /// Log level for tune-guard components specifically
        pub crate_level: Level,
        /// Whether to use JSON output format
        pub json_format: bool,
        /// Environment filter override
        pub env_filter: Option<String>,
    }

    impl Default for LoggingConfig {
        fn default() -> Self {
            Self {
                level: Level::INFO,
                crate_level: Level::DEBUG,
                json_format: false,
                env_filter: None,
            }
        }
    }

    impl LoggingConfig {
        /// Creates a configuration for production use.
        pub fn production() -> Self {
            Self {
                level: Level::WARN,
                crate_level: Level::INFO,
                json_format: true,
                env_filter: None,
            }
        }

        /// Creates a configuration for development use.
        pub fn development() -> Self {
            Self {
                level: Level::DEBUG,
                crate_level: Level::DEBUG,
                json_format: false,
                env_filter: None,
            }
        }

        /// Sets the log level for the application.
        pub fn with_level(mut self, level: Level) -> Self {
            self.level = level;
            self
        }

        /// Sets the log level for tune-guard components.
        pub fn with_crate_level(mut self, level: Level) -> Self {
            self.crate_level = level;
            self
        }

        /// Sets whether to use JSON output format.
        pub fn with_json_format(mut self, enabled: bool) -> Self {
            self.json_format = enabled;
            self
        }

        /// Sets a custom environment filter.
        pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
            self.env_filter = Some(filter.into());
            self
        }

        /// Builds the environment filter string.
        pub fn env_filter(&self) -> String {
            if let Some(ref filter) = self.env_filter {
                filter.clone()
            } else {
                format!(
                    "{},tune_guard={}",
                    self.level.as_str().to_lowercase(),
                    self.crate_level.as_str().to_lowercase()
                )
            }
        }
    }

    /// Initializes logging with a `tracing-subscriber` registry.
    ///
    /// `RUST_LOG` takes precedence over the configured filter when set.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use tune_guard::logging::setup::{init_logging, LoggingConfig};
    ///
    /// init_logging(LoggingConfig::development().with_json_format(true)).unwrap();
    /// ```
    pub fn init_logging(config: LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.env_filter()));

        let fmt_layer = if config.json_format {
            tracing_subscriber::fmt::layer().json().boxed()
        } else {
            tracing_subscriber::fmt::layer().boxed()
        };

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;

        Ok(())
    }
}
