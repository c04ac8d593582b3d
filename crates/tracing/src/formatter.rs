use crate::layers::BoxedLayer;
use clap::ValueEnum;
use std::fmt;
use tracing_appender::non_blocking::NonBlocking;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Output format of a logging layer.
#[derive(Debug, Copy, Clone, ValueEnum, Eq, PartialEq)]
pub enum LogFormat {
    /// One JSON object per event.
    Json,
    /// `key=value` pairs.
    #[value(name = "logfmt")]
    LogFmt,
    /// Human-readable, optionally colored lines.
    Terminal,
}

impl LogFormat {
    /// Builds a layer in this format.
    ///
    /// Events go to `file_writer` when given, stdout otherwise. The logfmt layer always writes to
    /// stdout. Targets are shown when `RUST_LOG_TARGET` is set to anything but `0`, or, if it is
    /// unset, when the filter enables levels below INFO.
    pub fn apply(
        &self,
        filter: EnvFilter,
        color: Option<String>,
        file_writer: Option<NonBlocking>,
    ) -> BoxedLayer<Registry> {
        let ansi = color.is_some_and(|color| {
            std::env::var("RUST_LOG_STYLE").map_or(color != "never", |style| style != "never")
        });
        let target = std::env::var("RUST_LOG_TARGET").map_or_else(
            |_| filter.max_level_hint().map_or(true, |max| max > tracing::Level::INFO),
            |val| val != "0",
        );

        match self {
            Self::Json => {
                let layer =
                    tracing_subscriber::fmt::layer().json().with_ansi(ansi).with_target(target);
                match file_writer {
                    Some(writer) => layer.with_writer(writer).with_filter(filter).boxed(),
                    None => layer.with_filter(filter).boxed(),
                }
            }
            Self::LogFmt => tracing_logfmt::layer().with_filter(filter).boxed(),
            Self::Terminal => {
                let layer = tracing_subscriber::fmt::layer().with_ansi(ansi).with_target(target);
                match file_writer {
                    Some(writer) => layer.with_writer(writer).with_filter(filter).boxed(),
                    None => layer.with_filter(filter).boxed(),
                }
            }
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => f.write_str("json"),
            Self::LogFmt => f.write_str("logfmt"),
            Self::Terminal => f.write_str("terminal"),
        }
    }
}
