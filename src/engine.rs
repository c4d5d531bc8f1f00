//! Drives one full generation run: H claims a job, B loads a snapshot, C
//! builds the graph, D/E/F run per generator combo, G reconciles, H commits
//! (`spec.md` §2 "Control flow").

use std::collections::BTreeMap;

use tracing::{info, warn};

use crate::composer::{accumulate, compose, VariantDefinition};
use crate::config::EngineConfig;
use crate::domain::ComboId;
use crate::error::{EngineError, JobAlreadyRunning};
use crate::graph::ComboGraph;
use crate::job::{JobPort, JobStatus};
use crate::pruning::prune;
use crate::reconciler::{reconcile, PersistencePort};
use crate::snapshot::SnapshotPort;
use crate::solver::{enumerate_variants, SolverPort};

/// Summary of one completed run (`spec.md` §4.G "Counters returned").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GenerationReport {
    pub added: usize,
    pub restored: usize,
    pub deleted: usize,
}

/// Run one generation under `job_name`. Returns `Err(JobAlreadyRunning)`
/// (wrapped in [`EngineError`]) immediately if a job with that name already
/// holds an unexpired lease; otherwise claims it, runs to completion or
/// failure, and always transitions the job to `SUCCESS` or `FAILURE` before
/// returning (`spec.md` §4.H).
pub fn run_generation(
    job_name: &str,
    job_port: &mut dyn JobPort,
    snapshot_port: &dyn SnapshotPort,
    persistence_port: &mut dyn PersistencePort,
    solver: &dyn SolverPort,
    config: &EngineConfig,
) -> Result<GenerationReport, EngineError> {
    if job_port.start(job_name, config.job_lease, None).is_none() {
        return Err(JobAlreadyRunning(job_name.to_string()).into());
    }

    match run_claimed(job_name, job_port, snapshot_port, persistence_port, solver, config) {
        Ok(report) => {
            job_port.finish(job_name, JobStatus::Success);
            Ok(report)
        }
        Err(err) => {
            job_port.log(job_name, &err.to_string());
            job_port.finish(job_name, JobStatus::Failure);
            Err(err)
        }
    }
}

fn run_claimed(
    job_name: &str,
    job_port: &mut dyn JobPort,
    snapshot_port: &dyn SnapshotPort,
    persistence_port: &mut dyn PersistencePort,
    solver: &dyn SolverPort,
    config: &EngineConfig,
) -> Result<GenerationReport, EngineError> {
    info!(job = job_name, "reading snapshot");
    let snapshot = snapshot_port.read().map_err(EngineError::SnapshotInconsistent)?;
    let mut graph = ComboGraph::build(&snapshot);

    let generator_ids: Vec<ComboId> = snapshot.generator_combo_ids().collect();
    let total = generator_ids.len();
    let mut computed: BTreeMap<String, VariantDefinition> = BTreeMap::new();

    for (i, target) in generator_ids.into_iter().enumerate() {
        if job_port.is_cancelled(job_name) {
            return Err(EngineError::Cancelled);
        }

        graph.reset();
        let Some(pruned) = prune(&mut graph, &snapshot, target, config.max_cards_in_combo) else {
            continue;
        };

        match enumerate_variants(solver, &graph, &snapshot, &pruned, target, config.max_cards_in_combo) {
            Ok(solutions) => {
                for solution in solutions {
                    let definition = compose(&graph, target, solution);
                    accumulate(&mut computed, definition);
                }
            }
            Err(solver_error) => {
                // Local recovery: log and keep going (`spec.md` §7).
                warn!(combo = %target, error = %solver_error, "skipping combo after solver error");
                job_port.log(job_name, &solver_error.to_string());
            }
        }

        info!(combo = %target, progress = format!("{}/{total}", i + 1), "generator combo processed");
        job_port.log(job_name, &format!("{}/{total} generator combos processed", i + 1));
    }

    if job_port.is_cancelled(job_name) {
        return Err(EngineError::Cancelled);
    }

    let (plan, counts) = reconcile(&snapshot, &computed);
    job_port.log(job_name, &format!("saving {} variants", plan.upserts.len()));
    persistence_port.commit(plan).map_err(EngineError::Persistence)?;

    Ok(GenerationReport { added: counts.added, restored: counts.restored, deleted: counts.deleted })
}
