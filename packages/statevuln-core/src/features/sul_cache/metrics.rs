//! Prometheus metrics for the SUL cache

use prometheus::{register_int_counter_with_registry, IntCounter, Opts, Registry};

#[derive(Clone)]
pub struct CacheMetrics {
    pub hits: IntCounter,
    pub misses: IntCounter,
    pub live_queries: IntCounter,
    pub filtered: IntCounter,
    pub conflicts: IntCounter,
    pub inserts: IntCounter,
}

impl CacheMetrics {
    pub fn new(registry: &Registry) -> prometheus::Result<Self> {
        Ok(Self {
            hits: register_int_counter_with_registry!(
                Opts::new("sul_cache_hits_total", "Steps answered from the cache"),
                registry
            )?,
            misses: register_int_counter_with_registry!(
                Opts::new("sul_cache_misses_total", "Sessions escalated to the live implementation"),
                registry
            )?,
            live_queries: register_int_counter_with_registry!(
                Opts::new("sul_cache_live_queries_total", "Symbols sent to the live implementation"),
                registry
            )?,
            filtered: register_int_counter_with_registry!(
                Opts::new("sul_cache_filtered_total", "Symbols answered by a pre-filter"),
                registry
            )?,
            conflicts: register_int_counter_with_registry!(
                Opts::new("sul_cache_conflicts_total", "Contradicting insertions"),
                registry
            )?,
            inserts: register_int_counter_with_registry!(
                Opts::new("sul_cache_inserted_edges_total", "Transitions added to the cache"),
                registry
            )?,
        })
    }

    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits.get() as f64;
        let total = hits + self.misses.get() as f64;
        if total > 0.0 {
            hits / total
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_registration_is_an_error() {
        let registry = Registry::new();
        assert!(CacheMetrics::new(&registry).is_ok());
        assert!(CacheMetrics::new(&registry).is_err());
    }

    #[test]
    fn test_hit_rate() {
        let metrics = CacheMetrics::new(&Registry::new()).unwrap();
        assert_eq!(metrics.hit_rate(), 0.0);
        metrics.hits.inc_by(3);
        metrics.misses.inc();
        assert!((metrics.hit_rate() - 0.75).abs() < f64::EPSILON);
    }
}
