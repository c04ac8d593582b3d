//! Rate limiting for log lines emitted from hot loops.

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        LazyLock,
    },
    time::Instant,
};

/// Marks a throttle that has never fired.
#[doc(hidden)]
pub const NOT_YET_RUN: u64 = u64::MAX;

/// Returns `true` and records the current time if at least `duration_millis` passed since the
/// last time this returned `true`. Implementation detail of [`throttle!`].
#[doc(hidden)]
pub fn should_run(start: &LazyLock<Instant>, last: &AtomicU64, duration_millis: u64) -> bool {
    let now = start.elapsed().as_millis() as u64;
    let previous = last.load(Ordering::Relaxed);

    let due = previous == NOT_YET_RUN || now.saturating_sub(previous) >= duration_millis;
    due && last.compare_exchange(previous, now, Ordering::Relaxed, Ordering::Relaxed).is_ok()
}

/// Runs the expression at most once per `duration`, per call site.
///
/// The first invocation always runs. Concurrent callers race for the slot and only one wins.
///
/// ```
/// use std::time::Duration;
/// use syncreset_tracing::throttle;
///
/// for _ in 0..1000 {
///     throttle!(Duration::from_secs(5), || tracing::info!("still scanning"));
/// }
/// ```
#[macro_export]
macro_rules! throttle {
    ($duration:expr, || $expr:expr) => {{
        static START: ::std::sync::LazyLock<::std::time::Instant> =
            ::std::sync::LazyLock::new(::std::time::Instant::now);
        static LAST: ::core::sync::atomic::AtomicU64 =
            ::core::sync::atomic::AtomicU64::new($crate::__private::NOT_YET_RUN);

        if $crate::__private::should_run(&START, &LAST, $duration.as_millis() as u64) {
            $expr
        }
    }};
}
