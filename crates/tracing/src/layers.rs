use crate::formatter::LogFormat;
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{filter::Directive, EnvFilter, Layer, Registry};

/// A boxed tracing [Layer].
pub(crate) type BoxedLayer<S> = Box<dyn Layer<S> + Send + Sync>;

/// Default directives that silence noisy dependencies.
const DEFAULT_ENV_FILTER_DIRECTIVES: [&str; 1] = ["redb=off"];

/// Collects the layers installed by a tracer.
pub(crate) struct Layers {
    inner: Vec<BoxedLayer<Registry>>,
}

impl Layers {
    pub(crate) const fn new() -> Self {
        Self { inner: vec![] }
    }

    pub(crate) fn into_inner(self) -> Vec<BoxedLayer<Registry>> {
        self.inner
    }

    pub(crate) fn stdout(
        &mut self,
        format: LogFormat,
        default_directive: Directive,
        filters: &str,
        color: Option<String>,
    ) -> eyre::Result<()> {
        let filter = build_env_filter(Some(default_directive), filters)?;
        self.inner.push(format.apply(filter, color, None));
        Ok(())
    }

    pub(crate) fn file(
        &mut self,
        format: LogFormat,
        filter: &str,
        file_info: FileInfo,
    ) -> eyre::Result<WorkerGuard> {
        let (writer, guard) = file_info.create_log_writer()?;
        let filter = build_env_filter(None, filter)?;
        self.inner.push(format.apply(filter, None, Some(writer)));
        Ok(guard)
    }
}

/// Location of the log file.
#[derive(Debug, Clone)]
pub struct FileInfo {
    dir: PathBuf,
    file_name: String,
    rotation: Rotation,
}

impl FileInfo {
    /// A single, never rotated file `dir/file_name`.
    pub fn new(dir: PathBuf, file_name: String) -> Self {
        Self { dir, file_name, rotation: Rotation::NEVER }
    }

    /// Rotates the file daily, suffixing each file with its date.
    pub fn daily(mut self) -> Self {
        self.rotation = Rotation::DAILY;
        self
    }

    fn create_log_writer(
        &self,
    ) -> eyre::Result<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
        std::fs::create_dir_all(&self.dir)?;
        let appender = RollingFileAppender::builder()
            .rotation(self.rotation.clone())
            .filename_prefix(&self.file_name)
            .build(&self.dir)?;
        Ok(tracing_appender::non_blocking(appender))
    }
}

/// Builds an [`EnvFilter`] from `RUST_LOG`, falling back to `default_directive`, and adds the
/// comma separated `directives`.
pub(crate) fn build_env_filter(
    default_directive: Option<Directive>,
    directives: &str,
) -> eyre::Result<EnvFilter> {
    let env_filter = match default_directive {
        Some(directive) => EnvFilter::builder().with_default_directive(directive).from_env_lossy(),
        None => {
            EnvFilter::builder().with_default_directive(LevelFilter::OFF.into()).from_env_lossy()
        }
    };

    DEFAULT_ENV_FILTER_DIRECTIVES
        .into_iter()
        .chain(directives.split(',').filter(|directive| !directive.is_empty()))
        .try_fold(env_filter, |env_filter, directive| -> eyre::Result<EnvFilter> {
            Ok(env_filter.add_directive(directive.parse()?))
        })
}
