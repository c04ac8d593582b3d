//! Best-effort concurrent read-ahead over tables.
//!
//! Each table is split into 256 units by the first byte of its keys. Units are scanned on a
//! dedicated [`rayon`] pool, each in its own read transaction, so warmup never takes or waits for
//! the writer lock. Failures are logged and counted, never returned.

use crate::catalog::StageTableCatalog;
use std::sync::atomic::{AtomicUsize, Ordering};
use syncreset_config::WarmupConfig;
use syncreset_db::{Database, DatabaseError, DbTx, SchemaVersion, Tables};
use syncreset_stages_types::StageId;
use syncreset_tracing::throttle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn, Level};

/// Logs at a level chosen at runtime.
macro_rules! log_at {
    ($level:expr, $($arg:tt)+) => {{
        let level = $level;
        if level == Level::ERROR {
            error!($($arg)+)
        } else if level == Level::WARN {
            warn!($($arg)+)
        } else if level == Level::INFO {
            info!($($arg)+)
        } else if level == Level::DEBUG {
            debug!($($arg)+)
        } else {
            trace!($($arg)+)
        }
    }};
}

/// Outcome of a warmup run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WarmupStats {
    /// Tables scanned.
    pub tables: usize,
    /// Entries read.
    pub entries: usize,
    /// Key and value bytes read.
    pub bytes: usize,
    /// Units or tables that failed and were skipped.
    pub failures: usize,
    /// Whether the run was cancelled before completing.
    pub cancelled: bool,
}

#[derive(Debug, Default)]
struct Counters {
    entries: AtomicUsize,
    bytes: AtomicUsize,
    failures: AtomicUsize,
}

/// Warms tables of a database ahead of stage execution.
#[derive(Debug)]
pub struct WarmupEngine<DB> {
    db: DB,
    config: WarmupConfig,
    cancel: CancellationToken,
}

impl<DB: Database> WarmupEngine<DB> {
    /// Creates a new engine.
    pub fn new(db: DB, config: WarmupConfig) -> Self {
        Self { db, config, cancel: CancellationToken::new() }
    }

    /// Sets the token that cancels in-flight scans.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Returns a handle to the cancellation token of this engine.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Warms the tables owned by `stages`, logging per-table completion at `level`.
    pub fn warmup_stages(&self, stages: &[StageId], level: Level) -> WarmupStats {
        match SchemaVersion::from_db(&self.db) {
            Ok(version) => {
                let tables = StageTableCatalog::new(version).tables_for_stages(stages);
                self.warmup_tables(&tables, level)
            }
            Err(err) => self.skip(err),
        }
    }

    /// Warms the state group and the state history of the active schema version.
    pub fn warmup_exec(&self) -> WarmupStats {
        match SchemaVersion::from_db(&self.db) {
            Ok(version) => {
                let tables = StageTableCatalog::new(version).exec_warmup_tables();
                self.warmup_tables(&tables, Level::INFO)
            }
            Err(err) => self.skip(err),
        }
    }

    /// Warms `tables`, logging per-table completion at `level`.
    pub fn warmup_tables(&self, tables: &[Tables], level: Level) -> WarmupStats {
        if !self.config.enabled {
            debug!(target: "reset::warmup", "Warmup disabled");
            return WarmupStats::default()
        }

        let pool = match rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.threads.max(1))
            .thread_name(|idx| format!("warmup-{idx}"))
            .build()
        {
            Ok(pool) => pool,
            Err(err) => {
                warn!(target: "reset::warmup", %err, "Failed to build warmup pool");
                return WarmupStats { failures: 1, ..Default::default() }
            }
        };

        let counters = Counters::default();
        let mut stats = WarmupStats::default();

        for table in tables {
            if self.cancel.is_cancelled() {
                break
            }

            match self.db.view(|tx| tx.entries(*table)).and_then(|res| res) {
                Ok(0) => continue,
                Ok(_) => {}
                Err(err) => {
                    warn!(target: "reset::warmup", %table, %err, "Skipping table");
                    counters.failures.fetch_add(1, Ordering::Relaxed);
                    continue
                }
            }

            let before = counters.entries.load(Ordering::Relaxed);
            pool.install(|| {
                use rayon::prelude::*;
                (0..=u8::MAX).into_par_iter().for_each(|prefix| {
                    self.warm_unit(*table, prefix, &counters);
                })
            });
            stats.tables += 1;

            let entries = counters.entries.load(Ordering::Relaxed) - before;
            log_at!(level, target: "reset::warmup", %table, entries, "Warmed up table");
        }

        stats.entries = counters.entries.into_inner();
        stats.bytes = counters.bytes.into_inner();
        stats.failures = counters.failures.into_inner();
        stats.cancelled = self.cancel.is_cancelled();
        stats
    }

    fn warm_unit(&self, table: Tables, prefix: u8, counters: &Counters) {
        if self.cancel.is_cancelled() {
            return
        }

        let mut entries = 0usize;
        let mut bytes = 0usize;
        let res = self
            .db
            .view(|tx| {
                tx.walk(table, &[prefix], &mut |key, value| {
                    if key.first() != Some(&prefix) || self.cancel.is_cancelled() {
                        return Ok(false)
                    }
                    entries += 1;
                    bytes += key.len() + value.len();
                    Ok(true)
                })
            })
            .and_then(|res| res);

        counters.entries.fetch_add(entries, Ordering::Relaxed);
        counters.bytes.fetch_add(bytes, Ordering::Relaxed);

        if let Err(err) = res {
            counters.failures.fetch_add(1, Ordering::Relaxed);
            debug!(target: "reset::warmup", %table, prefix, %err, "Warmup scan failed");
        }

        throttle!(self.config.log_interval, || info!(
            target: "reset::warmup",
            %table,
            entries = counters.entries.load(Ordering::Relaxed),
            "Warmup progress"
        ));
    }

    fn skip(&self, err: DatabaseError) -> WarmupStats {
        warn!(target: "reset::warmup", %err, "Could not resolve schema version, skipping warmup");
        WarmupStats { failures: 1, ..Default::default() }
    }
}
