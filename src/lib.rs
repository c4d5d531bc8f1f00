//! Variant generation engine for Commander Spellbook.
//!
//! A hand-authored combo catalog (cards/templates/features/combos) is read
//! as a [`snapshot::Snapshot`], turned into a [`graph::ComboGraph`], pruned
//! per generator combo ([`pruning`]), solved as a two-phase 0/1 program
//! ([`solver`]), composed into variant definitions ([`composer`]), and
//! reconciled against what is already persisted ([`reconciler`]) under a
//! single-writer job ([`job`]). [`engine::run_generation`] drives the whole
//! pipeline; everything else is usable standalone behind its own port trait.

pub mod composer;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod graph;
pub mod job;
pub mod pruning;
pub mod reconciler;
pub mod snapshot;
pub mod solver;

pub use config::EngineConfig;
pub use domain::{Card, CardId, Combo, ComboId, Feature, FeatureId, Template, TemplateId, Variant, VariantStatus};
pub use engine::{run_generation, GenerationReport};
pub use error::EngineError;
pub use snapshot::Snapshot;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::InMemoryJobStore;
    use crate::reconciler::InMemoryPersistencePort;
    use crate::snapshot::InMemorySnapshotPort;
    use crate::solver::BranchAndBoundSolver;

    /// Smoke test exercising the whole public surface through one call.
    #[test]
    fn an_empty_catalog_generates_nothing() {
        let snapshot = Snapshot::new(vec![], vec![], vec![], vec![], vec![]);
        let snapshot_port = InMemorySnapshotPort(snapshot);
        let mut job_port = InMemoryJobStore::new();
        let mut persistence_port = InMemoryPersistencePort::default();
        let solver = BranchAndBoundSolver::new();
        let config = EngineConfig::default();

        let report = run_generation(
            "generate-variants",
            &mut job_port,
            &snapshot_port,
            &mut persistence_port,
            &solver,
            &config,
        )
        .unwrap();

        assert_eq!(report, GenerationReport::default());
    }
}
