//! Component E: the 0/1 integer program and its pluggable solver port.
//!
//! `spec.md` §6 describes the port as "any 0/1 ILP solver with optimality
//! certification"; §9 calls out lexicographic two-phase solving over
//! scalarisation. [`IlpModel`] is the shared wire format between the model
//! builder ([`lexicographic`]) and a backend ([`bnb::BranchAndBoundSolver`]
//! is the only one this crate ships).

pub mod bnb;
pub mod lexicographic;

pub use bnb::BranchAndBoundSolver;
pub use lexicographic::{enumerate_variants, RawSolution};

/// Linear `{0,1}` comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintOp {
    Le,
    Ge,
    Eq,
}

/// `Σ coeffs[i].1 * x[coeffs[i].0] {op} rhs`. Sparse: omitted variables have
/// an implicit coefficient of 0.
#[derive(Debug, Clone)]
pub struct Constraint {
    pub coeffs: Vec<(usize, i64)>,
    pub op: ConstraintOp,
    pub rhs: i64,
}

impl Constraint {
    pub fn le(coeffs: Vec<(usize, i64)>, rhs: i64) -> Self {
        Self { coeffs, op: ConstraintOp::Le, rhs }
    }

    pub fn ge(coeffs: Vec<(usize, i64)>, rhs: i64) -> Self {
        Self { coeffs, op: ConstraintOp::Ge, rhs }
    }

    pub fn eq(coeffs: Vec<(usize, i64)>, rhs: i64) -> Self {
        Self { coeffs, op: ConstraintOp::Eq, rhs }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    Minimize,
    Maximize,
}

/// A single `{0,1}^n` linear program: one objective, any number of linear
/// constraints. Rebuilt fresh for every solver call rather than mutated in
/// place; cheap at this scale and avoids threading incremental-constraint
/// state through the port.
#[derive(Debug, Clone)]
pub struct IlpModel {
    pub num_vars: usize,
    pub constraints: Vec<Constraint>,
    pub objective: Vec<i64>,
    pub sense: Sense,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveOutcome {
    Optimal { objective: i64, assignment: Vec<bool> },
    Infeasible,
    Unbounded,
}

/// Pluggable solver backend (`spec.md` §6 "Solver port"). A backend error
/// (not an infeasible/unbounded *outcome*, which are legitimate results) is
/// reported as `Err` and wrapped into [`crate::error::SolverError::Backend`]
/// by the caller, which is the only place that knows which target combo was
/// being solved.
pub trait SolverPort {
    fn solve(&self, model: &IlpModel) -> Result<SolveOutcome, String>;
}
