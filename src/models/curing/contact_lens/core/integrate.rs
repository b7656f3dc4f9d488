//! Variable-step BDF integration of the semi-discrete lens equations.
//!
//! Each step solves the implicit BDF equations with Newton. The local error
//! is estimated from the gap between the corrected state and a polynomial
//! extrapolation of past states, and drives the next step size. Output at the
//! requested sample times is interpolated linearly between accepted steps.

use uom::si::{f64::Time, time::second};

use super::{
    config::StepControl,
    error::NumericalFailure,
    mesh::Field,
    newton::{self, NewtonFailure, NewtonSettings},
    system::{CuringSystem, StepEquation},
};

/// Safety factor applied to the optimal step size.
const SAFETY: f64 = 0.9;

/// Bounds on the step size ratio after an accepted step.
const MIN_GROWTH: f64 = 0.2;
const MAX_GROWTH: f64 = 2.0;

/// Step size ratio after a Newton failure.
const NEWTON_CUT: f64 = 0.25;

/// States at the requested sample times.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct Trajectory {
    pub(super) states: Vec<Vec<f64>>,
    pub(super) stats: IntegrationStats,
}

/// Step counters for a finished integration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(super) struct IntegrationStats {
    pub(super) accepted: usize,
    pub(super) rejected: usize,
    pub(super) newton_iters: usize,
}

/// Integrates `system` from `samples[0]` and returns the state at every sample.
///
/// The samples must be non-empty and non-decreasing.
pub(super) fn integrate(
    system: &CuringSystem,
    samples: &[f64],
    control: &StepControl,
) -> Result<Trajectory, NumericalFailure> {
    let Some(&t_start) = samples.first() else {
        return Ok(Trajectory {
            states: Vec::new(),
            stats: IntegrationStats::default(),
        });
    };
    let t_end = samples[samples.len() - 1];
    let settings = NewtonSettings {
        max_iters: control.max_newton_iters,
        rtol: control.rtol,
        atol: control.atol,
    };

    let initial = consistent_state(system, t_start, settings)?;

    let mut states = Vec::with_capacity(samples.len());
    let mut next = 0;
    while next < samples.len() && samples[next] <= t_start {
        states.push(initial.clone());
        next += 1;
    }

    let mut history = History::new(t_start, initial, control.max_order);
    let mut stats = IntegrationStats::default();
    let mut step = control.initial_step.min(control.max_step);

    while history.time() < t_end {
        if stats.accepted + stats.rejected >= control.max_steps {
            return Err(NumericalFailure::TooManySteps {
                max_steps: control.max_steps,
                time: seconds(history.time()),
            });
        }
        if step < control.min_step {
            return Err(NumericalFailure::StepSizeTooSmall {
                time: seconds(history.time()),
                step: seconds(step),
            });
        }

        let remaining = t_end - history.time();
        let (h, t_new) = if step >= remaining {
            (remaining, t_end)
        } else {
            (step, history.time() + step)
        };

        let order = history.order();
        let equation = history.bdf_equation(h, order);
        let guess = history.latest().to_vec();

        let solution = match newton::solve(system, &equation, guess, settings) {
            Ok(solution) => solution,
            Err(NewtonFailure::Singular { node }) => {
                return Err(NumericalFailure::SingularJacobian {
                    node,
                    time: seconds(t_new),
                });
            }
            Err(failure) => {
                stats.rejected += 1;
                tracing::debug!(
                    "Newton failed ({:?}) at t={:.6e} s, h={:.3e} s",
                    failure,
                    history.time(),
                    h
                );
                step = h * NEWTON_CUT;
                continue;
            }
        };
        stats.newton_iters += solution.iters;

        let predicted = history.predict(system, h, order);
        let error = local_error(&solution.state, &predicted, order, control);
        let exponent = -1.0 / (order as f64 + 1.0);

        if error > 1.0 {
            stats.rejected += 1;
            let factor = (SAFETY * error.powf(exponent)).clamp(MIN_GROWTH, SAFETY);
            tracing::debug!(
                "rejected step at t={:.6e} s: h={:.3e} s, error={:.3}",
                history.time(),
                h,
                error
            );
            step = h * factor;
            continue;
        }

        stats.accepted += 1;
        tracing::trace!(
            "accepted step to t={:.6e} s: h={:.3e} s, order={}, error={:.3}",
            t_new,
            h,
            order,
            error
        );

        let t_prev = history.time();
        let u_prev = history.latest().to_vec();
        while next < samples.len() && samples[next] <= t_new {
            states.push(interpolate(
                t_prev,
                &u_prev,
                t_new,
                &solution.state,
                samples[next],
            ));
            next += 1;
        }

        history.push(t_new, solution.state);

        let factor = if error > 0.0 {
            (SAFETY * error.powf(exponent)).clamp(MIN_GROWTH, MAX_GROWTH)
        } else {
            MAX_GROWTH
        };
        step = (h * factor).min(control.max_step);
    }

    Ok(Trajectory { states, stats })
}

/// Solves the algebraic rows at the initial state.
fn consistent_state(
    system: &CuringSystem,
    time: f64,
    settings: NewtonSettings,
) -> Result<Vec<f64>, NumericalFailure> {
    let guess = system.initial_guess();
    let equation = StepEquation::Consistency {
        fixed: guess.clone(),
    };
    match newton::solve(system, &equation, guess, settings) {
        Ok(solution) => Ok(solution.state),
        Err(NewtonFailure::Singular { node }) => Err(NumericalFailure::SingularJacobian {
            node,
            time: seconds(time),
        }),
        Err(NewtonFailure::NonFinite) => Err(NumericalFailure::NonFinite {
            time: seconds(time),
        }),
        Err(NewtonFailure::NotConverged) => Err(NumericalFailure::InconsistentInitialState {
            time: seconds(time),
        }),
    }
}

/// Weighted max-norm of the local error on the differential rows.
fn local_error(state: &[f64], predicted: &[f64], order: usize, control: &StepControl) -> f64 {
    state
        .iter()
        .zip(predicted)
        .enumerate()
        .filter(|(row, _)| Field::of_row(*row).is_differential())
        .map(|(_, (u, p))| {
            (u - p).abs() / ((order as f64 + 1.0) * (control.atol + control.rtol * u.abs()))
        })
        .fold(0.0, f64::max)
}

fn interpolate(t0: f64, u0: &[f64], t1: f64, u1: &[f64], t: f64) -> Vec<f64> {
    if t >= t1 {
        return u1.to_vec();
    }
    let theta = ((t - t0) / (t1 - t0)).clamp(0.0, 1.0);
    u0.iter()
        .zip(u1)
        .map(|(a, b)| a + theta * (b - a))
        .collect()
}

fn seconds(value: f64) -> Time {
    Time::new::<second>(value)
}

/// Recent accepted states, oldest first.
#[derive(Debug, Clone, PartialEq)]
struct History {
    times: Vec<f64>,
    states: Vec<Vec<f64>>,
    max_order: usize,
}

impl History {
    fn new(time: f64, state: Vec<f64>, max_order: usize) -> Self {
        Self {
            times: vec![time],
            states: vec![state],
            max_order,
        }
    }

    fn time(&self) -> f64 {
        self.times[self.times.len() - 1]
    }

    fn latest(&self) -> &[f64] {
        &self.states[self.states.len() - 1]
    }

    /// BDF order for the next step, limited by the accepted states on hand.
    fn order(&self) -> usize {
        self.max_order.min(self.times.len()).max(1)
    }

    fn push(&mut self, time: f64, state: Vec<f64>) {
        self.times.push(time);
        self.states.push(state);
        // One extra point feeds the error predictor.
        let keep = self.max_order + 1;
        if self.times.len() > keep {
            let excess = self.times.len() - keep;
            self.times.drain(..excess);
            self.states.drain(..excess);
        }
    }

    /// Implicit equations of a variable-step BDF step of size `h`.
    fn bdf_equation(&self, h: f64, order: usize) -> StepEquation {
        let n = self.states.len();
        let current = &self.states[n - 1];

        let (a0, history) = if order >= 2 {
            let previous = &self.states[n - 2];
            let ratio = h / (self.times[n - 1] - self.times[n - 2]);
            let a0 = (1.0 + 2.0 * ratio) / (1.0 + ratio);
            let a1 = -(1.0 + ratio);
            let a2 = ratio * ratio / (1.0 + ratio);
            let history = current
                .iter()
                .zip(previous)
                .map(|(u1, u2)| (a1 * u1 + a2 * u2) / h)
                .collect();
            (a0, history)
        } else {
            (1.0, current.iter().map(|u| -u / h).collect())
        };

        StepEquation::Transient {
            scale: a0 / h,
            history,
        }
    }

    /// Extrapolates the history to `time() + h`.
    ///
    /// Uses up to `order + 1` past states. With a single state on hand the
    /// predictor falls back to an explicit Euler step.
    fn predict(&self, system: &CuringSystem, h: f64, order: usize) -> Vec<f64> {
        let n = self.states.len();
        if n == 1 {
            let derivative = system.derivative(&self.states[0]);
            return self.states[0]
                .iter()
                .zip(derivative)
                .map(|(u, du)| u + h * du)
                .collect();
        }

        let points = (order + 1).min(n);
        let start = n - points;
        let target = self.time() + h;
        let mut predicted = vec![0.0; self.states[0].len()];
        for j in start..n {
            let mut weight = 1.0;
            for m in start..n {
                if m != j {
                    weight *= (target - self.times[m]) / (self.times[j] - self.times[m]);
                }
            }
            for (p, u) in predicted.iter_mut().zip(&self.states[j]) {
                *p += weight * u;
            }
        }
        predicted
    }
}
