//! Wizard step identifiers

use std::fmt;

/// Which of the four wizard steps is active, without its per-step data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    Details,
    Security,
    Confirmation,
    Feedback,
}

impl StepKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepKind::Details => "transfer details",
            StepKind::Security => "security",
            StepKind::Confirmation => "confirmation",
            StepKind::Feedback => "feedback",
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
