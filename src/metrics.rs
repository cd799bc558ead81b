//! Optional profiling counters: memo hit/miss and `simplify_type` call counts.
//!
//! The engine is single-threaded, so these live behind plain
//! [`std::cell::Cell`] in thread-local storage rather than atomics --
//! enabling/reading/resetting them from a different thread than the one
//! that parsed and checked a module simply observes that thread's own
//! zeroed counters, which matches the single-threaded contract the rest of
//! this crate (e.g. [`crate::combinators::MemoTable`]) already assumes.

use std::cell::Cell;

thread_local! {
    static ENABLED: Cell<bool> = const { Cell::new(false) };
    static MEMO_HITS: Cell<u64> = const { Cell::new(0) };
    static MEMO_MISSES: Cell<u64> = const { Cell::new(0) };
    static SIMPLIFY_CALLS: Cell<u64> = const { Cell::new(0) };
}

/// Handle onto this thread's profiling counters. Zero-sized; all state
/// lives in thread-local storage so a caller never needs to thread a
/// `Metrics` value through the parser or type engine to use it.
#[derive(Debug, Default, Clone, Copy)]
pub struct Metrics;

impl Metrics {
    pub fn enable() {
        ENABLED.with(|c| c.set(true));
    }

    pub fn disable() {
        ENABLED.with(|c| c.set(false));
    }

    pub fn is_enabled() -> bool {
        ENABLED.with(Cell::get)
    }

    pub fn reset() {
        MEMO_HITS.with(|c| c.set(0));
        MEMO_MISSES.with(|c| c.set(0));
        SIMPLIFY_CALLS.with(|c| c.set(0));
    }

    pub fn memo_hits() -> u64 {
        MEMO_HITS.with(Cell::get)
    }

    pub fn memo_misses() -> u64 {
        MEMO_MISSES.with(Cell::get)
    }

    pub fn simplify_calls() -> u64 {
        SIMPLIFY_CALLS.with(Cell::get)
    }

    pub(crate) fn record_memo_hit() {
        if Self::is_enabled() {
            MEMO_HITS.with(|c| c.set(c.get() + 1));
        }
    }

    pub(crate) fn record_memo_miss() {
        if Self::is_enabled() {
            MEMO_MISSES.with(|c| c.set(c.get() + 1));
        }
    }

    pub(crate) fn record_simplify_call() {
        if Self::is_enabled() {
            SIMPLIFY_CALLS.with(|c| c.set(c.get() + 1));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_by_default_counters_stay_zero() {
        Metrics::disable();
        Metrics::reset();
        Metrics::record_memo_hit();
        Metrics::record_simplify_call();
        assert_eq!(Metrics::memo_hits(), 0);
        assert_eq!(Metrics::simplify_calls(), 0);
    }

    #[test]
    fn enabling_counts_subsequent_events() {
        Metrics::reset();
        Metrics::enable();
        Metrics::record_memo_hit();
        Metrics::record_memo_hit();
        Metrics::record_memo_miss();
        Metrics::record_simplify_call();
        assert_eq!(Metrics::memo_hits(), 2);
        assert_eq!(Metrics::memo_misses(), 1);
        assert_eq!(Metrics::simplify_calls(), 1);
        Metrics::disable();
        Metrics::reset();
    }
}
