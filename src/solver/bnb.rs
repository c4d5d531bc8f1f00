//! A from-scratch branch-and-bound solver for small 0/1 integer programs.
//!
//! No ILP/LP-modelling crate appears anywhere in the retrieved corpus this
//! crate was grounded on; rather than depend on a fabricated vendor crate,
//! the default [`SolverPort`] backend is this direct implementation. Sound
//! for any model; practical because component D keeps the pruned subgraph
//! (and so the variable count) small.

use super::{ConstraintOp, IlpModel, Sense, SolveOutcome, SolverPort};

/// Exhaustive search over `{0,1}^n`, pruning a branch as soon as its partial
/// assignment cannot satisfy some constraint, or cannot beat the best
/// objective found so far.
#[derive(Debug, Default, Clone, Copy)]
pub struct BranchAndBoundSolver;

impl BranchAndBoundSolver {
    pub fn new() -> Self {
        Self
    }
}

impl SolverPort for BranchAndBoundSolver {
    fn solve(&self, model: &IlpModel) -> Result<SolveOutcome, String> {
        if model.objective.len() != model.num_vars {
            return Err(format!(
                "objective has {} terms, model declares {} variables",
                model.objective.len(),
                model.num_vars
            ));
        }

        // Internally always minimize; negate back on the way out.
        let sign: i64 = match model.sense {
            Sense::Minimize => 1,
            Sense::Maximize => -1,
        };
        let objective: Vec<i64> = model.objective.iter().map(|&c| c * sign).collect();

        let mut assignment: Vec<Option<bool>> = vec![None; model.num_vars];
        let mut best: Option<(i64, Vec<bool>)> = None;
        search(model, &objective, 0, &mut assignment, &mut best);

        Ok(match best {
            Some((objective, assignment)) => SolveOutcome::Optimal { objective: objective * sign, assignment },
            None => SolveOutcome::Infeasible,
        })
    }
}

fn search(
    model: &IlpModel,
    objective: &[i64],
    next_var: usize,
    assignment: &mut [Option<bool>],
    best: &mut Option<(i64, Vec<bool>)>,
) {
    if !feasible_partial(model, assignment) {
        return;
    }
    if next_var == assignment.len() {
        let value = objective_value(objective, assignment);
        if best.as_ref().map_or(true, |(b, _)| value < *b) {
            *best = Some((value, assignment.iter().map(|v| v.unwrap_or(false)).collect()));
        }
        return;
    }
    if let Some((best_value, _)) = best {
        if lower_bound(objective, assignment) >= *best_value {
            return;
        }
    }
    for choice in [false, true] {
        assignment[next_var] = Some(choice);
        search(model, objective, next_var + 1, assignment, best);
    }
    assignment[next_var] = None;
}

/// Interval-arithmetic feasibility check: a constraint only fails a partial
/// assignment when even the best completion of its free variables cannot
/// satisfy it.
fn feasible_partial(model: &IlpModel, assignment: &[Option<bool>]) -> bool {
    model.constraints.iter().all(|constraint| {
        let mut fixed = 0i64;
        let mut free_min = 0i64;
        let mut free_max = 0i64;
        for &(var, coeff) in &constraint.coeffs {
            match assignment[var] {
                Some(true) => fixed += coeff,
                Some(false) => {}
                None if coeff > 0 => free_max += coeff,
                None => free_min += coeff,
            }
        }
        let lo = fixed + free_min;
        let hi = fixed + free_max;
        match constraint.op {
            ConstraintOp::Le => lo <= constraint.rhs,
            ConstraintOp::Ge => hi >= constraint.rhs,
            ConstraintOp::Eq => lo <= constraint.rhs && constraint.rhs <= hi,
        }
    })
}

fn lower_bound(objective: &[i64], assignment: &[Option<bool>]) -> i64 {
    objective
        .iter()
        .zip(assignment.iter())
        .map(|(&coeff, &value)| match value {
            Some(true) => coeff,
            Some(false) => 0,
            None => coeff.min(0),
        })
        .sum()
}

fn objective_value(objective: &[i64], assignment: &[Option<bool>]) -> i64 {
    objective
        .iter()
        .zip(assignment.iter())
        .map(|(&coeff, &value)| if value == Some(true) { coeff } else { 0 })
        .sum()
}
