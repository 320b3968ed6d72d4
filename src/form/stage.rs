use std::fmt;

/// Screens of the donation interview, in the order they are visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Amount,
    DonorInformation,
    PaymentMethod,
    Confirmation,
}

impl Stage {
    pub const ALL: [Stage; 4] = [
        Stage::Amount,
        Stage::DonorInformation,
        Stage::PaymentMethod,
        Stage::Confirmation,
    ];

    pub fn index(self) -> usize {
        match self {
            Stage::Amount => 0,
            Stage::DonorInformation => 1,
            Stage::PaymentMethod => 2,
            Stage::Confirmation => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<Stage> {
        Self::ALL.get(index).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            Stage::Amount => "Amount",
            Stage::DonorInformation => "Donor information",
            Stage::PaymentMethod => "Payment method",
            Stage::Confirmation => "Confirmation",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Confirmation)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Tracks which stage is active. Moves one step at a time and never
/// validates; callers gate [`StepController::advance`] on the stage validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepController {
    index: usize,
}

impl StepController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Stage {
        Stage::from_index(self.index).unwrap_or(Stage::Confirmation)
    }

    pub fn total(&self) -> usize {
        Stage::ALL.len()
    }

    /// Moves to the next stage, staying put on the terminal stage.
    pub fn advance(&mut self) -> Stage {
        if self.index + 1 < Stage::ALL.len() {
            self.index += 1;
        }
        self.current()
    }

    /// Moves to the previous stage, floored at the first one.
    pub fn retreat(&mut self) -> Stage {
        self.index = self.index.saturating_sub(1);
        self.current()
    }
}
