use foundation::ids::DayNumber;

/// Phase of the day selection state machine.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Phase {
    /// Nothing selected yet.
    Idle,
    /// `day` is the active day. `expanded` is false only after a toggling
    /// re-select collapsed it; the day stays active either way.
    Showing { day: DayNumber, expanded: bool },
}

/// Selected-day state. There is no way back to [`Phase::Idle`] once a day
/// has been shown, except a full reload.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SelectionState {
    phase: Phase,
}

impl Default for SelectionState {
    fn default() -> Self {
        Self { phase: Phase::Idle }
    }
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn active_day(&self) -> Option<DayNumber> {
        match self.phase {
            Phase::Idle => None,
            Phase::Showing { day, .. } => Some(day),
        }
    }

    pub fn is_expanded(&self) -> bool {
        matches!(self.phase, Phase::Showing { expanded: true, .. })
    }

    pub(crate) fn show(&mut self, day: DayNumber) {
        self.phase = Phase::Showing {
            day,
            expanded: true,
        };
    }

    pub(crate) fn collapse(&mut self) {
        if let Phase::Showing { day, .. } = self.phase {
            self.phase = Phase::Showing {
                day,
                expanded: false,
            };
        }
    }

    pub(crate) fn reset(&mut self) {
        self.phase = Phase::Idle;
    }
}
