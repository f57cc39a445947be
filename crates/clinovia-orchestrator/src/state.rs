use serde::Serialize;

use clinovia_core::calculator::CalculatorId;

/// Where a prediction request is in its lifecycle.
///
/// ```text
/// Received ─┬─> Validated ─> Scoring ─┬─> Scored ─> Audited
///           └─> Rejected              └─> Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestState {
    Received,
    Validated,
    Scoring,
    Scored,
    Audited,
    Rejected,
    Failed,
}

impl RequestState {
    pub fn can_advance_to(self, next: RequestState) -> bool {
        use RequestState::*;
        matches!(
            (self, next),
            (Received, Validated)
                | (Received, Rejected)
                | (Validated, Scoring)
                | (Scoring, Scored)
                | (Scoring, Failed)
                | (Scored, Audited)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RequestState::Audited | RequestState::Rejected | RequestState::Failed
        )
    }
}

/// Tracks one request through [`RequestState`], logging each transition.
#[derive(Debug, Clone)]
pub struct Lifecycle {
    calculator: CalculatorId,
    state: RequestState,
}

impl Lifecycle {
    pub fn new(calculator: CalculatorId) -> Self {
        Self {
            calculator,
            state: RequestState::Received,
        }
    }

    pub fn state(&self) -> RequestState {
        self.state
    }

    pub fn advance(&mut self, next: RequestState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "illegal transition {:?} -> {next:?}",
            self.state
        );
        tracing::debug!(
            calculator = %self.calculator,
            from = ?self.state,
            to = ?next,
            "prediction state"
        );
        self.state = next;
    }
}
