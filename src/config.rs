//! Environment contract (`spec.md` §6 "Environment contract (minimal)").
//!
//! No configuration-loading crate appears anywhere in the wider example
//! pack this crate was grounded on, so this reads `std::env` directly
//! rather than reaching for one.

use std::env;
use std::time::Duration;

const DEFAULT_MAX_CARDS_IN_COMBO: usize = 5;
const DEFAULT_JOB_LEASE_MINUTES: u64 = 30;

/// Which [`crate::solver::SolverPort`] implementation the engine should
/// construct. The source's `pyomo.SolverFactory('glpk')` corresponds to
/// `SolverSelection::BranchAndBound`, the only backend this crate ships;
/// the enum exists so a host application can plug in another backend behind
/// the same port without changing `EngineConfig`'s shape.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum SolverSelection {
    BranchAndBound,
}

impl Default for SolverSelection {
    fn default() -> Self {
        Self::BranchAndBound
    }
}

/// Runtime configuration for a generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Cards + templates budget per variant (`spec.md` §3 invariant, §6 `MAX_CARDS_IN_COMBO`).
    pub max_cards_in_combo: usize,
    pub solver: SolverSelection,
    /// Time-bounded lease a job holds before it is reclaimable by a fresh
    /// driver (`spec.md` §5 "Timeouts").
    pub job_lease: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_cards_in_combo: DEFAULT_MAX_CARDS_IN_COMBO,
            solver: SolverSelection::default(),
            job_lease: Duration::from_secs(DEFAULT_JOB_LEASE_MINUTES * 60),
        }
    }
}

/// Error parsing `EngineConfig` from the environment.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("MAX_CARDS_IN_COMBO must be a positive integer, got '{0}'")]
    InvalidMaxCards(String),
    #[error("unknown solver selection '{0}'")]
    InvalidSolver(String),
    #[error("JOB_LEASE_MINUTES must be a positive integer, got '{0}'")]
    InvalidLease(String),
}

impl EngineConfig {
    /// Load overrides from `MAX_CARDS_IN_COMBO`, `SOLVER_SELECTION`, and
    /// `JOB_LEASE_MINUTES`, falling back to defaults for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(raw) = env::var("MAX_CARDS_IN_COMBO") {
            config.max_cards_in_combo = raw
                .parse()
                .ok()
                .filter(|&n: &usize| n > 0)
                .ok_or(ConfigError::InvalidMaxCards(raw))?;
        }

        if let Ok(raw) = env::var("SOLVER_SELECTION") {
            use std::str::FromStr;
            config.solver =
                SolverSelection::from_str(&raw).map_err(|_| ConfigError::InvalidSolver(raw))?;
        }

        if let Ok(raw) = env::var("JOB_LEASE_MINUTES") {
            let minutes: u64 = raw
                .parse()
                .ok()
                .filter(|&n: &u64| n > 0)
                .ok_or(ConfigError::InvalidLease(raw))?;
            config.job_lease = Duration::from_secs(minutes * 60);
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_source_constants() {
        let config = EngineConfig::default();
        assert_eq!(config.max_cards_in_combo, 5);
        assert_eq!(config.job_lease, Duration::from_secs(30 * 60));
        assert_eq!(config.solver, SolverSelection::BranchAndBound);
    }
}
