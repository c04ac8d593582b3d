use crate::{Tracer, TracerHandle};
use tracing_subscriber::EnvFilter;

/// Tracer for tests: output captured by the test harness, filtered by `RUST_LOG`.
#[derive(Debug, Clone, Default)]
#[non_exhaustive]
pub struct TestTracer;

impl Tracer for TestTracer {
    fn init(self) -> eyre::Result<TracerHandle> {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
        Ok(TracerHandle::default())
    }
}
