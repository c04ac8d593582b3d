//! Logging setup for the stage reset tooling.
//!
//! A [`ResetTracer`] always logs to stdout and optionally to a file. Each layer has its own
//! [`LogFormat`] and `EnvFilter` directives. Tests install a [`TestTracer`] through
//! [`init_test_tracing`] instead.
//!
//! ```
//! use syncreset_tracing::{
//!     tracing::level_filters::LevelFilter, LayerInfo, LogFormat, ResetTracer, Tracer,
//! };
//!
//! fn main() -> eyre::Result<()> {
//!     let _handle = ResetTracer::new()
//!         .with_stdout(LayerInfo::new(
//!             LogFormat::LogFmt,
//!             LevelFilter::INFO.to_string(),
//!             "reset::warmup=debug".to_string(),
//!             None,
//!         ))
//!         .init()?;
//!     Ok(())
//! }
//! ```

#![doc(
    html_logo_url = "https://raw.githubusercontent.com/paradigmxyz/reth/main/assets/reth-docs.png",
    html_favicon_url = "https://avatars0.githubusercontent.com/u/97369466?s=256",
    issue_tracker_base_url = "https://github.com/paradigmxyz/reth/issues/"
)]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

// Re-export tracing crates
pub use tracing;
pub use tracing_appender;
pub use tracing_subscriber;

pub use formatter::LogFormat;
pub use layers::FileInfo;
pub use test_tracer::TestTracer;

mod formatter;
mod layers;
mod test_tracer;
mod throttle;

#[doc(hidden)]
pub mod __private {
    pub use crate::throttle::{should_run, NOT_YET_RUN};
}

use crate::layers::Layers;
use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Tracer of the reset tooling: stdout plus an optional log file.
#[derive(Debug, Clone, Default)]
pub struct ResetTracer {
    stdout: LayerInfo,
    file: Option<(LayerInfo, FileInfo)>,
}

impl ResetTracer {
    /// Creates a tracer that logs to stdout with [`LayerInfo::default`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the stdout layer configuration.
    pub fn with_stdout(mut self, config: LayerInfo) -> Self {
        self.stdout = config;
        self
    }

    /// Adds a file layer writing to `file_info`.
    pub fn with_file(mut self, config: LayerInfo, file_info: FileInfo) -> Self {
        self.file = Some((config, file_info));
        self
    }
}

/// Configuration of one logging layer.
#[derive(Debug, Clone)]
pub struct LayerInfo {
    format: LogFormat,
    default_directive: String,
    filters: String,
    color: Option<String>,
}

impl LayerInfo {
    /// Creates a layer configuration.
    ///
    /// `default_directive` applies when `RUST_LOG` is unset, `filters` are comma separated
    /// directives added on top, and `color` is `"always"`, `"auto"` or `"never"`.
    pub const fn new(
        format: LogFormat,
        default_directive: String,
        filters: String,
        color: Option<String>,
    ) -> Self {
        Self { format, default_directive, filters, color }
    }
}

impl Default for LayerInfo {
    fn default() -> Self {
        Self {
            format: LogFormat::Terminal,
            default_directive: LevelFilter::INFO.to_string(),
            filters: String::new(),
            color: Some("always".to_string()),
        }
    }
}

/// Keeps the non-blocking file writer alive. Dropping it flushes and stops file logging.
#[derive(Debug, Default)]
pub struct TracerHandle {
    /// Guard for the file layer, if any
    pub file_guard: Option<WorkerGuard>,
}

/// A logging setup that can be installed as the global subscriber.
pub trait Tracer {
    /// Installs the subscriber.
    fn init(self) -> eyre::Result<TracerHandle>;
}

impl Tracer for ResetTracer {
    fn init(self) -> eyre::Result<TracerHandle> {
        let mut layers = Layers::new();

        layers.stdout(
            self.stdout.format,
            self.stdout.default_directive.parse()?,
            &self.stdout.filters,
            self.stdout.color,
        )?;

        let file_guard = match self.file {
            Some((config, file_info)) => {
                Some(layers.file(config.format, &config.filters, file_info)?)
            }
            None => None,
        };

        // fails only if a global subscriber is already set
        let _ = tracing_subscriber::registry().with(layers.into_inner()).try_init().inspect_err(
            |err| tracing::warn!(%err, "Tracing subscriber could not be initialized"),
        );

        Ok(TracerHandle { file_guard })
    }
}

/// Initializes a tracing subscriber for tests.
///
/// The filter is configurable via `RUST_LOG`. Installation silently fails if a subscriber is
/// already set.
pub fn init_test_tracing() {
    let _ = TestTracer::default().init();
}
