use std::sync::Once;

/// wgpu crates log adapter and validation chatter at info level.
const WGPU_TARGETS: [&str; 4] = ["wgpu_core", "wgpu_hal", "naga", "wgpu"];

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g. "info",
/// "skinbound_engine=debug,wgpu=warn"). When unset, `RUST_LOG` is used, then
/// `default_level`.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub default_level: log::LevelFilter,
    /// Caps wgpu/naga targets at `warn` unless a filter names them.
    pub quiet_wgpu: bool,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            default_level: log::LevelFilter::Info,
            quiet_wgpu: true,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

impl LoggingConfig {
    pub fn with_filter(filter: impl Into<String>) -> Self {
        Self {
            env_filter: Some(filter.into()),
            ..Self::default()
        }
    }
}

static INIT: Once = Once::new();

/// Installs the global logger once; later calls are ignored.
///
/// Call early in `main`. If another logger is already installed (e.g. by a
/// test harness) the existing one is kept.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();
        builder.filter_level(config.default_level);

        if config.quiet_wgpu {
            for target in WGPU_TARGETS {
                builder.filter_module(target, log::LevelFilter::Warn);
            }
        }

        let filter = config.env_filter.or_else(|| std::env::var("RUST_LOG").ok());
        if let Some(filter) = filter {
            builder.parse_filters(&filter);
        }

        builder.write_style(config.write_style);

        if builder.try_init().is_ok() {
            log::debug!("logging initialized");
        }
    });
}
