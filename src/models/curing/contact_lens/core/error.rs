use thiserror::Error;
use uom::si::f64::Time;

use crate::models::curing::contact_lens::parameters::ParameterError;

use super::config::Integrator;

/// Errors that can occur while solving the contact-lens model.
#[derive(Debug, Error)]
pub enum SolveError {
    /// The parameter set is incomplete or holds invalid values.
    #[error("invalid parameters")]
    Parameters(#[from] ParameterError),

    /// The solver configuration or time samples are invalid.
    #[error("invalid solver configuration")]
    Configuration(#[from] ConfigError),

    /// Time integration failed.
    #[error("numerical failure")]
    Numerical(#[from] NumericalFailure),
}

/// Solver configuration errors, detected before any numerical work.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// The mesh needs at least two control volumes.
    #[error("mesh needs at least 2 nodes, got {nodes}")]
    TooFewNodes { nodes: usize },

    /// The integrator cannot advance the algebraic UV equation.
    #[error("{integrator:?} cannot solve the algebraic UV intensity equation")]
    IntegratorCannotSolveAlgebraic { integrator: Integrator },

    /// No output times were requested.
    #[error("at least one time sample is required")]
    NoTimeSamples,

    /// Time samples must be finite, non-negative and non-decreasing.
    #[error("time sample {index} is out of order or not finite")]
    UnorderedTimeSamples { index: usize },

    /// Tolerances must be finite, non-negative and not both zero.
    #[error("invalid tolerances: rtol={rtol}, atol={atol}")]
    InvalidTolerance { rtol: f64, atol: f64 },

    /// Step sizes must be finite, positive, and ordered `min <= initial <= max`.
    #[error("invalid step size settings")]
    InvalidStepSize,

    /// The step and Newton iteration limits must both be at least one.
    #[error("iteration limits must be positive: max_steps={max_steps}, max_newton_iters={max_newton_iters}")]
    InvalidIterationLimit {
        max_steps: usize,
        max_newton_iters: usize,
    },
}

/// Failures raised while integrating in time.
#[derive(Debug, Error, PartialEq)]
pub enum NumericalFailure {
    /// Step rejections drove the step size below the configured minimum.
    #[error("step size fell below minimum at t={time:?} (step={step:?})")]
    StepSizeTooSmall {
        /// Time at the start of the failed step.
        time: Time,

        /// The rejected step size.
        step: Time,
    },

    /// A diagonal Jacobian block could not be inverted.
    #[error("singular Jacobian block at node {node} (t={time:?})")]
    SingularJacobian { node: usize, time: Time },

    /// The algebraic equations could not be satisfied at the first sample.
    #[error("no consistent initial UV intensity at t={time:?}")]
    InconsistentInitialState { time: Time },

    /// The initial consistency solve produced NaN or infinite values.
    ///
    /// Non-finite Newton iterates during stepping reject the step instead,
    /// and surface as [`NumericalFailure::StepSizeTooSmall`] if they persist.
    #[error("non-finite initial state at t={time:?}")]
    NonFinite { time: Time },

    /// The step limit was reached before the final time sample.
    #[error("step limit {max_steps} reached at t={time:?}")]
    TooManySteps { max_steps: usize, time: Time },
}
