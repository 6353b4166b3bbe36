//! Evaluator configuration.

use serde::{Deserialize, Serialize};

/// Default step budget: enough for any reasonable program, small enough that
/// a self-applying loop fails in well under a second.
pub const DEFAULT_STEP_LIMIT: u64 = 10_000_000;

/// Knobs for an [`Evaluator`](crate::Evaluator) run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    /// Maximum number of `eval` steps before the run fails with
    /// [`EvalError::StepLimitExceeded`](crate::EvalError::StepLimitExceeded).
    pub step_limit: u64,
}

impl EvalConfig {
    pub fn with_step_limit(step_limit: u64) -> Self {
        Self { step_limit }
    }
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            step_limit: DEFAULT_STEP_LIMIT,
        }
    }
}
