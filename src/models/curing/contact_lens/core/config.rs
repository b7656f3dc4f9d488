use uom::si::{f64::Time, time::second};

use crate::support::constraint::{Constrained, StrictlyPositive};

use super::error::ConfigError;

/// Spatial discretisation scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpatialMethod {
    /// Cell-centred finite volumes on a uniform mesh.
    #[default]
    FiniteVolume,
}

/// Time integration scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Integrator {
    /// First-order backward differentiation (implicit Euler).
    #[default]
    BackwardEuler,

    /// Variable-step BDF of order two, started with a backward Euler step.
    Bdf2,

    /// Forward Euler.
    ///
    /// Listed so callers can ask for it and get a clear error: an explicit
    /// method cannot advance the algebraic UV intensity equation.
    ExplicitEuler,
}

impl Integrator {
    fn max_order(self) -> Option<usize> {
        match self {
            Integrator::BackwardEuler => Some(1),
            Integrator::Bdf2 => Some(2),
            Integrator::ExplicitEuler => None,
        }
    }
}

/// Solver configuration for the contact-lens model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolveConfig {
    /// Number of control volumes across the lens.
    pub nodes: usize,

    pub spatial_method: SpatialMethod,
    pub integrator: Integrator,

    /// Relative tolerance on the local error and the Newton update.
    pub rtol: f64,

    /// Absolute tolerance on the local error and the Newton update.
    pub atol: f64,

    /// First trial step.
    pub initial_step: Time,

    /// Largest step the controller may take, if any.
    pub max_step: Option<Time>,

    /// Step size below which the solve gives up.
    pub min_step: Time,

    /// Accepted plus rejected step limit.
    pub max_steps: usize,

    /// Newton iteration limit per step attempt.
    pub max_newton_iters: usize,
}

impl Default for SolveConfig {
    fn default() -> Self {
        Self {
            nodes: 50,
            spatial_method: SpatialMethod::FiniteVolume,
            integrator: Integrator::BackwardEuler,
            rtol: 1e-5,
            atol: 1e-8,
            initial_step: Time::new::<second>(1e-3),
            max_step: None,
            min_step: Time::new::<second>(1e-12),
            max_steps: 100_000,
            max_newton_iters: 10,
        }
    }
}

/// A [`SolveConfig`] that passed validation, in plain seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct StepControl {
    pub(super) nodes: Constrained<usize, StrictlyPositive>,
    pub(super) max_order: usize,
    pub(super) rtol: f64,
    pub(super) atol: f64,
    pub(super) initial_step: f64,
    pub(super) max_step: f64,
    pub(super) min_step: f64,
    pub(super) max_steps: usize,
    pub(super) max_newton_iters: usize,
}

impl SolveConfig {
    /// Checks the configuration and converts it for the integrator.
    pub(super) fn validate(&self) -> Result<StepControl, ConfigError> {
        if self.nodes < 2 {
            return Err(ConfigError::TooFewNodes { nodes: self.nodes });
        }
        let nodes = StrictlyPositive::new(self.nodes)
            .map_err(|_| ConfigError::TooFewNodes { nodes: self.nodes })?;

        match self.spatial_method {
            SpatialMethod::FiniteVolume => {}
        }

        let max_order =
            self.integrator
                .max_order()
                .ok_or(ConfigError::IntegratorCannotSolveAlgebraic {
                    integrator: self.integrator,
                })?;

        let tolerance_ok = |t: f64| t.is_finite() && t >= 0.0;
        if !tolerance_ok(self.rtol)
            || !tolerance_ok(self.atol)
            || (self.rtol == 0.0 && self.atol == 0.0)
        {
            return Err(ConfigError::InvalidTolerance {
                rtol: self.rtol,
                atol: self.atol,
            });
        }

        let initial_step = self.initial_step.get::<second>();
        let min_step = self.min_step.get::<second>();
        let max_step = self.max_step.map_or(f64::INFINITY, |h| h.get::<second>());
        let step_ok = |h: f64| h.is_finite() && h > 0.0;
        if !step_ok(initial_step)
            || !step_ok(min_step)
            || max_step.is_nan()
            || max_step <= 0.0
            || min_step > initial_step
            || initial_step > max_step
        {
            return Err(ConfigError::InvalidStepSize);
        }

        if self.max_steps == 0 || self.max_newton_iters == 0 {
            return Err(ConfigError::InvalidIterationLimit {
                max_steps: self.max_steps,
                max_newton_iters: self.max_newton_iters,
            });
        }

        Ok(StepControl {
            nodes,
            max_order,
            rtol: self.rtol,
            atol: self.atol,
            initial_step,
            max_step,
            min_step,
            max_steps: self.max_steps,
            max_newton_iters: self.max_newton_iters,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let control = SolveConfig::default().validate().unwrap();
        assert_eq!(control.nodes.into_inner(), 50);
        assert_eq!(control.max_order, 1);
        assert!(control.max_step.is_infinite());
    }

    #[test]
    fn bdf2_allows_second_order() {
        let config = SolveConfig {
            integrator: Integrator::Bdf2,
            ..SolveConfig::default()
        };
        assert_eq!(config.validate().unwrap().max_order, 2);
    }

    #[test]
    fn explicit_euler_is_rejected() {
        let config = SolveConfig {
            integrator: Integrator::ExplicitEuler,
            ..SolveConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::IntegratorCannotSolveAlgebraic {
                integrator: Integrator::ExplicitEuler
            })
        );
    }

    #[test]
    fn single_node_is_rejected() {
        let config = SolveConfig {
            nodes: 1,
            ..SolveConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::TooFewNodes { nodes: 1 })
        );
    }

    #[test]
    fn bad_tolerances_are_rejected() {
        for (rtol, atol) in [(0.0, 0.0), (-1e-3, 1e-8), (f64::NAN, 1e-8)] {
            let config = SolveConfig {
                rtol,
                atol,
                ..SolveConfig::default()
            };
            assert!(matches!(
                config.validate(),
                Err(ConfigError::InvalidTolerance { .. })
            ));
        }
    }

    #[test]
    fn step_sizes_must_be_ordered() {
        let config = SolveConfig {
            max_step: Some(Time::new::<second>(1e-4)),
            ..SolveConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidStepSize));

        let config = SolveConfig {
            min_step: Time::new::<second>(0.0),
            ..SolveConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidStepSize));
    }

    #[test]
    fn zero_iteration_limits_are_rejected() {
        let config = SolveConfig {
            max_steps: 0,
            ..SolveConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidIterationLimit {
                max_steps: 0,
                max_newton_iters: 10
            })
        );

        let config = SolveConfig {
            max_newton_iters: 0,
            ..SolveConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidIterationLimit {
                max_steps: 100_000,
                max_newton_iters: 0
            })
        );
    }
}
