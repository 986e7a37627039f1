use std::time::Duration;

/// Monotonic host timestamp in milliseconds.
///
/// Hosts feed this from their own clock (`Date.now()` in the browser);
/// the core never reads wall-clock time itself so runs can be replayed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Millis(pub u64);

impl Millis {
    pub fn from_f64(ms: f64) -> Self {
        if ms.is_finite() && ms > 0.0 {
            Millis(ms as u64)
        } else {
            Millis(0)
        }
    }

    pub fn saturating_add(self, d: Duration) -> Self {
        let add = u64::try_from(d.as_millis()).unwrap_or(u64::MAX);
        Millis(self.0.saturating_add(add))
    }
}
