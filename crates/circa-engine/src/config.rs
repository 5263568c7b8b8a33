//! Simulator configuration, validation, and error types.
//!
//! [`SimConfig`] is the constructor input for a
//! [`Simulator`](crate::Simulator). [`validate()`](SimConfig::validate)
//! checks it once at construction; nothing is re-checked per step.

use std::error::Error;
use std::fmt;

use circa_core::CircuitId;

/// Largest accepted [`SimConfig::random_shift`].
pub const MAX_RANDOM_SHIFT: u32 = 8;

// ── SimConfig ──────────────────────────────────────────────────────

/// Tuning knobs for one simulator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimConfig {
    /// Time batches a single `propagate()` may process before the
    /// circuit is declared oscillating. Default: 1000.
    pub iteration_limit: u32,
    /// Delay jitter. Zero disables it; otherwise every delay is shifted
    /// left by this many bits and leaf drivers get a noise term in
    /// `[0, 2^shift)`. Default: 0.
    pub random_shift: u32,
    /// Seed for the jitter generator. Default: 0.
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            iteration_limit: 1000,
            random_shift: 0,
            seed: 0,
        }
    }
}

impl SimConfig {
    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.iteration_limit == 0 {
            return Err(ConfigError::ZeroIterationLimit);
        }
        if self.random_shift > MAX_RANDOM_SHIFT {
            return Err(ConfigError::RandomShiftTooLarge {
                configured: self.random_shift,
            });
        }
        Ok(())
    }

    /// Iteration from which applied events are recorded as oscillation
    /// points: the last quarter of the budget.
    pub(crate) fn record_threshold(&self) -> u32 {
        self.iteration_limit - self.iteration_limit / 4
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected while constructing a simulator.
#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// `iteration_limit` is zero.
    ZeroIterationLimit,
    /// `random_shift` exceeds [`MAX_RANDOM_SHIFT`].
    RandomShiftTooLarge {
        /// The configured shift.
        configured: u32,
    },
    /// The root circuit is not part of the design.
    UnknownRoot {
        /// The requested root.
        circuit: CircuitId,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroIterationLimit => write!(f, "iteration_limit must be at least 1"),
            Self::RandomShiftTooLarge { configured } => write!(
                f,
                "random_shift {configured} exceeds maximum of {MAX_RANDOM_SHIFT}"
            ),
            Self::UnknownRoot { circuit } => {
                write!(f, "root circuit {circuit} is not in the design")
            }
        }
    }
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(SimConfig::default().validate(), Ok(()));
    }

    #[test]
    fn zero_iteration_limit_rejected() {
        let cfg = SimConfig {
            iteration_limit: 0,
            ..SimConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroIterationLimit));
    }

    #[test]
    fn oversized_shift_rejected() {
        let cfg = SimConfig {
            random_shift: 9,
            ..SimConfig::default()
        };
        let err = cfg.validate().unwrap_err();
        assert_eq!(err, ConfigError::RandomShiftTooLarge { configured: 9 });
        assert_eq!(err.to_string(), "random_shift 9 exceeds maximum of 8");
    }

    #[test]
    fn record_threshold_is_last_quarter() {
        let cfg = SimConfig::default();
        assert_eq!(cfg.record_threshold(), 750);
        let tiny = SimConfig {
            iteration_limit: 1,
            ..SimConfig::default()
        };
        assert_eq!(tiny.record_threshold(), 1);
    }
}
