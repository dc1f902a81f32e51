//! Per-method compilation counting.
//!
//! A method the host keeps recompiling means the compiler keeps producing
//! code that gets invalidated. Past the configured limit the compiler stops
//! the process instead of looping forever.

use dashmap::DashMap;

use crate::error::{DriverError, Result};

/// Compilation counts per method, shared by every compiler thread.
#[derive(Debug, Default)]
pub struct CompilationCounters {
    limit: u32,
    counts: DashMap<String, u32>,
}

impl CompilationCounters {
    /// Counters tripping once a method is compiled more than `limit` times;
    /// a limit of 0 never trips.
    pub fn new(limit: u32) -> Self {
        Self {
            limit,
            counts: DashMap::new(),
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Count one more compilation of `method` and return the new count.
    ///
    /// # Errors
    ///
    /// `RecompilationLimit` when the new count exceeds the limit. The count
    /// is kept, so later attempts keep failing.
    pub fn record(&self, method: &str) -> Result<u32> {
        let count = {
            let mut entry = self.counts.entry(method.to_string()).or_insert(0);
            *entry += 1;
            *entry
        };

        if self.limit != 0 && count > self.limit {
            log::error!(
                "method {} compiled {} times, limit is {}; counts: {:?}",
                method,
                count,
                self.limit,
                self.snapshot()
            );
            return Err(DriverError::RecompilationLimit {
                method: method.to_string(),
                count,
                limit: self.limit,
            });
        }
        Ok(count)
    }

    pub fn count(&self, method: &str) -> u32 {
        self.counts.get(method).map_or(0, |count| *count)
    }

    /// `(method, count)` pairs, most compiled first.
    pub fn snapshot(&self) -> Vec<(String, u32)> {
        let mut counts: Vec<_> = self
            .counts
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rayon::prelude::*;

    #[test]
    fn test_limit_trips_at_limit_plus_one() {
        let counters = CompilationCounters::new(3);
        for expected in 1..=3 {
            assert_eq!(counters.record("Foo.bar()V").unwrap(), expected);
        }

        let err = counters.record("Foo.bar()V").unwrap_err();
        assert!(matches!(
            err,
            DriverError::RecompilationLimit {
                count: 4,
                limit: 3,
                ..
            }
        ));
        assert_eq!(counters.count("Foo.bar()V"), 4);
    }

    #[test]
    fn test_zero_limit_is_unlimited() {
        let counters = CompilationCounters::new(0);
        for _ in 0..100 {
            counters.record("Foo.bar()V").unwrap();
        }
        assert_eq!(counters.count("Foo.bar()V"), 100);
    }

    #[test]
    fn test_methods_are_counted_separately() {
        let counters = CompilationCounters::new(1);
        counters.record("A.a()V").unwrap();
        counters.record("B.b()V").unwrap();
        assert!(counters.record("A.a()V").is_err());
        assert_eq!(counters.count("B.b()V"), 1);
        assert_eq!(counters.count("C.c()V"), 0);
    }

    #[test]
    fn test_snapshot_order() {
        let counters = CompilationCounters::new(0);
        counters.record("A.a()V").unwrap();
        counters.record("B.b()V").unwrap();
        counters.record("B.b()V").unwrap();

        assert_eq!(
            counters.snapshot(),
            vec![("B.b()V".to_string(), 2), ("A.a()V".to_string(), 1)]
        );
    }

    #[test]
    fn test_concurrent_records() {
        let counters = CompilationCounters::new(0);
        (0..1000).into_par_iter().for_each(|i| {
            counters.record(if i % 2 == 0 { "even" } else { "odd" }).unwrap();
        });
        assert_eq!(counters.count("even"), 500);
        assert_eq!(counters.count("odd"), 500);
    }
}
