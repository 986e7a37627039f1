use std::collections::BTreeMap;

/// Deterministic counters and gauges.
///
/// Metrics must not depend on wall-clock time or unordered iteration.
/// Sorted maps keep snapshots stable.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Metrics {
    counters: BTreeMap<&'static str, u64>,
    gauges: BTreeMap<&'static str, i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub counters: Vec<(&'static str, u64)>,
    pub gauges: Vec<(&'static str, i64)>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.counters.clear();
        self.gauges.clear();
    }

    pub fn counter(&self, name: &str) -> u64 {
        self.counters.get(name).copied().unwrap_or(0)
    }

    pub fn inc(&mut self, name: &'static str) {
        self.inc_counter(name, 1);
    }

    pub fn inc_counter(&mut self, name: &'static str, by: u64) {
        *self.counters.entry(name).or_insert(0) += by;
    }

    pub fn gauge(&self, name: &str) -> Option<i64> {
        self.gauges.get(name).copied()
    }

    pub fn set_gauge(&mut self, name: &'static str, value: i64) {
        self.gauges.insert(name, value);
    }

    /// Returns a stable, sorted snapshot suitable for logs/debug UI.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            counters: self.counters.iter().map(|(k, v)| (*k, *v)).collect(),
            gauges: self.gauges.iter().map(|(k, v)| (*k, *v)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Metrics;

    #[test]
    fn counters_accumulate() {
        let mut m = Metrics::new();
        m.inc("select");
        m.inc_counter("select", 2);
        assert_eq!(m.counter("select"), 3);
        assert_eq!(m.counter("missing"), 0);
    }

    #[test]
    fn gauges_overwrite() {
        let mut m = Metrics::new();
        assert_eq!(m.gauge("markers"), None);
        m.set_gauge("markers", 10);
        m.set_gauge("markers", 11);
        assert_eq!(m.gauge("markers"), Some(11));
    }

    #[test]
    fn snapshot_is_stably_sorted() {
        let mut m = Metrics::new();
        m.inc("reveal");
        m.inc("lookup_miss");
        m.set_gauge("markers", 1);
        m.set_gauge("days", 2);

        let snap = m.snapshot();
        assert_eq!(snap.counters, vec![("lookup_miss", 1), ("reveal", 1)]);
        assert_eq!(snap.gauges, vec![("days", 2), ("markers", 1)]);
    }

    #[test]
    fn clear_resets_everything() {
        let mut m = Metrics::new();
        m.inc("select");
        m.set_gauge("days", 3);
        m.clear();
        assert_eq!(m.snapshot().counters, Vec::new());
        assert_eq!(m.gauge("days"), None);
    }
}
