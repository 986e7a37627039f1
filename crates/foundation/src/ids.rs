use serde::{Deserialize, Serialize};

/// Canonical key of an itinerary day (1-based, positive).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DayNumber(u32);

impl DayNumber {
    /// Returns `None` for 0; day numbers are positive.
    pub fn new(n: u32) -> Option<Self> {
        (n > 0).then_some(DayNumber(n))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for DayNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
