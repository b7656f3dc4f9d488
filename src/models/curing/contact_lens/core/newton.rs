//! Newton iteration on the block-tridiagonal equations of one time level.
//!
//! Each cell only couples to its immediate neighbours, so the Jacobian is
//! block tridiagonal with 3×3 blocks. Colouring cells by `i mod 3` lets nine
//! dual-number residual sweeps recover every block exactly, and a block
//! Thomas elimination solves for the update.

use nalgebra::{Matrix3, Vector3};
use num_dual::Dual64;

use super::{
    mesh::{FIELDS, Field, index},
    system::{CuringSystem, StepEquation},
};

/// Iteration limits and tolerances for one Newton solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct NewtonSettings {
    pub(super) max_iters: usize,
    pub(super) rtol: f64,
    pub(super) atol: f64,
}

/// Converged state of a Newton solve.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct NewtonSolution {
    pub(super) state: Vec<f64>,
    pub(super) iters: usize,
}

/// Why a Newton solve stopped without converging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum NewtonFailure {
    /// The iteration limit was reached.
    NotConverged,

    /// A residual, Jacobian entry or iterate was NaN or infinite.
    NonFinite,

    /// A pivot block could not be inverted.
    Singular { node: usize },
}

/// Update norm below which the iteration counts as converged.
const CONVERGENCE: f64 = 0.1;

/// Solves `equation` for the state, starting from `guess`.
pub(super) fn solve(
    system: &CuringSystem,
    equation: &StepEquation,
    guess: Vec<f64>,
    settings: NewtonSettings,
) -> Result<NewtonSolution, NewtonFailure> {
    let mut state = guess;
    let mut residual = vec![0.0; state.len()];

    for iter in 1..=settings.max_iters {
        system.residual(&state, equation, &mut residual);
        if !all_finite(&residual) {
            return Err(NewtonFailure::NonFinite);
        }

        let jacobian = BlockTridiagonal::assemble(system, &state, equation);
        let rhs: Vec<f64> = residual.iter().map(|r| -r).collect();
        let update = jacobian.solve(&rhs)?;

        let mut norm: f64 = 0.0;
        for (u, du) in state.iter_mut().zip(&update) {
            *u += du;
            norm = norm.max(du.abs() / (settings.atol + settings.rtol * u.abs()));
        }
        if !all_finite(&state) {
            return Err(NewtonFailure::NonFinite);
        }
        if norm <= CONVERGENCE {
            return Ok(NewtonSolution { state, iters: iter });
        }
    }

    Err(NewtonFailure::NotConverged)
}

fn all_finite(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite())
}

/// A block-tridiagonal matrix; row `i` couples cell `i` to `i - 1`
/// (`lower`), itself (`diag`) and `i + 1` (`upper`).
#[derive(Debug, Clone, PartialEq)]
pub(super) struct BlockTridiagonal {
    lower: Vec<Matrix3<f64>>,
    diag: Vec<Matrix3<f64>>,
    upper: Vec<Matrix3<f64>>,
}

impl BlockTridiagonal {
    fn zeros(cells: usize) -> Self {
        Self {
            lower: vec![Matrix3::zeros(); cells],
            diag: vec![Matrix3::zeros(); cells],
            upper: vec![Matrix3::zeros(); cells],
        }
    }

    /// Exact Jacobian of `equation` at `state`.
    pub(super) fn assemble(system: &CuringSystem, state: &[f64], equation: &StepEquation) -> Self {
        let cells = system.mesh().cells();
        let mut matrix = Self::zeros(cells);

        let mut seeded: Vec<Dual64> = state.iter().map(|&u| Dual64::from(u)).collect();
        let mut out = vec![Dual64::from(0.0); state.len()];

        for colour in 0..3 {
            for (column, seed_field) in Field::ALL.into_iter().enumerate() {
                for cell in (colour..cells).step_by(3) {
                    let i = index(cell, seed_field);
                    seeded[i] = Dual64::new(state[i], 1.0);
                }
                system.residual(&seeded, equation, &mut out);
                for cell in (colour..cells).step_by(3) {
                    let i = index(cell, seed_field);
                    seeded[i] = Dual64::from(state[i]);
                }

                for cell in 0..cells {
                    let block = match (colour + 3 - cell % 3) % 3 {
                        0 => &mut matrix.diag[cell],
                        1 if cell + 1 < cells => &mut matrix.upper[cell],
                        2 if cell > 0 => &mut matrix.lower[cell],
                        _ => continue,
                    };
                    for (row, field) in Field::ALL.into_iter().enumerate() {
                        block[(row, column)] = out[index(cell, field)].eps;
                    }
                }
            }
        }

        matrix
    }

    /// Solves `self · x = rhs` by block Thomas elimination.
    pub(super) fn solve(&self, rhs: &[f64]) -> Result<Vec<f64>, NewtonFailure> {
        let cells = self.diag.len();
        let block = |j: usize| Vector3::from_column_slice(&rhs[j * FIELDS..(j + 1) * FIELDS]);

        let mut pivots_inv = Vec::with_capacity(cells);
        let mut reduced = Vec::with_capacity(cells);

        for j in 0..cells {
            let (pivot, r) = if j == 0 {
                (self.diag[0], block(0))
            } else {
                let factor = self.lower[j] * pivots_inv[j - 1];
                (
                    self.diag[j] - factor * self.upper[j - 1],
                    block(j) - factor * reduced[j - 1],
                )
            };
            if !pivot.iter().all(|v: &f64| v.is_finite()) {
                return Err(NewtonFailure::NonFinite);
            }
            let inverse = pivot
                .try_inverse()
                .ok_or(NewtonFailure::Singular { node: j })?;
            pivots_inv.push(inverse);
            reduced.push(r);
        }

        let mut x = vec![Vector3::zeros(); cells];
        for j in (0..cells).rev() {
            x[j] = if j + 1 == cells {
                pivots_inv[j] * reduced[j]
            } else {
                pivots_inv[j] * (reduced[j] - self.upper[j] * x[j + 1])
            };
        }

        Ok(x.iter().flat_map(|v| v.iter().copied()).collect())
    }
}
