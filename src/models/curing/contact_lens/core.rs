//! One-dimensional coupled model of UV curing across a contact lens.
//!
//! Heat conduction, UV attenuation and polymerisation kinetics are
//! discretised with cell-centred finite volumes across the lens thickness.
//! The resulting differential-algebraic system is integrated with a
//! variable-step BDF method whose Newton iterations use exact block
//! tridiagonal Jacobians from dual numbers.

mod config;
mod constants;
mod curing_time;
mod error;
mod integrate;
mod mesh;
mod newton;
mod solution;
mod system;

pub use config::{Integrator, SolveConfig, SpatialMethod};
pub use curing_time::{DEFAULT_CURE_THRESHOLD, crossing_time, curing_time};
pub use error::{ConfigError, NumericalFailure, SolveError};
pub use solution::{Output, OutputVariable, Shape, SolveStats, Solution, UnknownOutputVariable};

use uom::si::{f64::Time, time::second};

use super::parameters::ParameterSet;

use constants::ModelConstants;
use integrate::integrate;
use system::CuringSystem;

/// Solves the model for `params`, reporting the state at each of `times`.
///
/// Parameters and configuration are fully checked before any numerical work.
///
/// # Errors
///
/// Returns [`SolveError::Parameters`] or [`SolveError::Configuration`] for
/// invalid inputs, and [`SolveError::Numerical`] if time integration fails.
pub fn solve(
    params: &ParameterSet,
    times: &[Time],
    config: &SolveConfig,
) -> Result<Solution, SolveError> {
    let constants = ModelConstants::resolve(params)?;
    let control = config.validate()?;
    let samples = check_samples(times)?;

    let system = CuringSystem::new(&constants, control.nodes);
    let trajectory = integrate(&system, &samples, &control)?;

    let stats = SolveStats {
        accepted_steps: trajectory.stats.accepted,
        rejected_steps: trajectory.stats.rejected,
        newton_iterations: trajectory.stats.newton_iters,
    };
    tracing::info!(
        "solved '{}' on {} nodes to t={} s: {} steps accepted, {} rejected, {} Newton iterations",
        params.name(),
        system.mesh().cells(),
        samples[samples.len() - 1],
        stats.accepted_steps,
        stats.rejected_steps,
        stats.newton_iterations
    );

    Ok(Solution::new(
        samples,
        system.mesh().centres(),
        &trajectory.states,
        *system.rate_law(),
        stats,
    ))
}

/// Converts the time samples to seconds and checks their order.
fn check_samples(times: &[Time]) -> Result<Vec<f64>, ConfigError> {
    if times.is_empty() {
        return Err(ConfigError::NoTimeSamples);
    }

    let samples: Vec<f64> = times.iter().map(|t| t.get::<second>()).collect();
    let mut previous = 0.0;
    for (index, &t) in samples.iter().enumerate() {
        if !t.is_finite() || t < previous {
            return Err(ConfigError::UnorderedTimeSamples { index });
        }
        previous = t;
    }
    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use crate::models::curing::contact_lens::parameters::{
        GAO_2018, GAO_2018_ISOTHERMAL, Parameter, ParameterError, get_parameters,
    };

    fn seconds(values: impl IntoIterator<Item = f64>) -> Vec<Time> {
        values.into_iter().map(Time::new::<second>).collect()
    }

    fn coarse() -> SolveConfig {
        SolveConfig {
            nodes: 10,
            ..SolveConfig::default()
        }
    }

    #[test]
    fn time_samples_are_checked() {
        let params = get_parameters(GAO_2018).unwrap();
        assert!(matches!(
            solve(&params, &[], &coarse()),
            Err(SolveError::Configuration(ConfigError::NoTimeSamples))
        ));
        assert!(matches!(
            solve(&params, &seconds([0.0, 2.0, 1.0]), &coarse()),
            Err(SolveError::Configuration(
                ConfigError::UnorderedTimeSamples { index: 2 }
            ))
        ));
        assert!(matches!(
            solve(&params, &seconds([-1.0, 0.0]), &coarse()),
            Err(SolveError::Configuration(
                ConfigError::UnorderedTimeSamples { index: 0 }
            ))
        ));
    }

    #[test]
    fn parameter_errors_come_before_configuration_errors() {
        let params = get_parameters(GAO_2018)
            .unwrap()
            .without(Parameter::LensThickness);
        let config = SolveConfig {
            nodes: 1,
            ..SolveConfig::default()
        };
        assert!(matches!(
            solve(&params, &seconds([0.0, 1.0]), &config),
            Err(SolveError::Parameters(ParameterError::MissingParameter {
                parameter: Parameter::LensThickness,
                ..
            }))
        ));
    }

    #[test]
    fn explicit_euler_is_rejected_before_solving() {
        let params = get_parameters(GAO_2018).unwrap();
        let config = SolveConfig {
            integrator: Integrator::ExplicitEuler,
            ..coarse()
        };
        assert!(matches!(
            solve(&params, &seconds([0.0, 1.0]), &config),
            Err(SolveError::Configuration(
                ConfigError::IntegratorCannotSolveAlgebraic { .. }
            ))
        ));
    }

    #[test]
    fn initial_intensity_satisfies_discrete_beer_lambert() {
        let params = get_parameters(GAO_2018).unwrap();
        let solution = solve(&params, &seconds([0.0]), &coarse()).unwrap();

        let dz = 200e-6 / 10.0;
        let factor = 1.0 / (1.0 + dz / 77.55e-6);
        let intensity = solution.uv_intensity();
        let mut expected = 80.0;
        for node in 0..10 {
            expected *= factor;
            assert_relative_eq!(intensity[(node, 0)], expected, max_relative = 1e-10);
            assert_relative_eq!(solution.temperature()[(node, 0)], 353.15);
            assert_eq!(solution.degree_of_polymerisation()[(node, 0)], 0.0);
        }
    }

    #[test]
    fn solution_reports_every_requested_sample() {
        let params = get_parameters(GAO_2018_ISOTHERMAL).unwrap();
        let times = seconds((0..=10).map(|i| f64::from(i) * 3.0));
        let solution = solve(&params, &times, &coarse()).unwrap();

        assert_eq!(solution.times(), times);
        assert_eq!(solution.degree_of_polymerisation().shape(), (10, 11));
        assert!(solution.stats().accepted_steps > 0);
    }

    #[test]
    fn heating_without_reaction_raises_mean_temperature_monotonically() {
        let params = get_parameters(GAO_2018)
            .unwrap()
            .with(Parameter::EnthalpyOfPolymerisation, 0.0);
        let times = seconds((0..=20).map(f64::from));
        let solution = solve(&params, &times, &coarse()).unwrap();

        let mean = solution.output(OutputVariable::AveragedTemperature);
        let mean = mean.as_series().unwrap();
        assert_relative_eq!(mean[0], 353.15);
        for pair in mean.windows(2) {
            assert!(pair[1] > pair[0]);
        }
    }
}
