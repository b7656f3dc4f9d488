//! UV curing of a contact lens.
//!
//! [`ContactLens`] solves the coupled heat, UV-intensity and cure equations
//! across the lens thickness for a named [`parameters::ParameterSet`], either
//! directly through [`ContactLens::solve`] or as a [`twine_core::Model`].
//!
//! ```no_run
//! use lens_cure::models::curing::contact_lens::{
//!     ContactLens, DEFAULT_CURE_THRESHOLD, curing_time, parameters::get_parameters,
//! };
//! use lens_cure::support::constraint::UnitInterval;
//! use uom::si::{f64::Time, time::second};
//!
//! let params = get_parameters("Gao2018").unwrap();
//! let times: Vec<Time> = (0..=400).map(|t| Time::new::<second>(f64::from(t))).collect();
//!
//! let solution = ContactLens::default().solve(&params, &times).unwrap();
//! let cured = curing_time(&solution, UnitInterval::new(DEFAULT_CURE_THRESHOLD).unwrap());
//! assert_eq!(cured.len(), 50);
//! ```

pub(crate) mod core;
pub mod parameters;

pub use self::core::{
    ConfigError, DEFAULT_CURE_THRESHOLD, Integrator, NumericalFailure, Output, OutputVariable,
    Shape, SolveConfig, SolveError, SolveStats, Solution, SpatialMethod, UnknownOutputVariable,
    crossing_time, curing_time,
};

use twine_core::Model;
use uom::si::f64::Time;

use parameters::ParameterSet;

/// The contact-lens curing model with a fixed solver configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ContactLens {
    config: SolveConfig,
}

impl ContactLens {
    #[must_use]
    pub fn new(config: SolveConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &SolveConfig {
        &self.config
    }

    /// Solves the model for `params` at the requested `times`.
    ///
    /// # Errors
    ///
    /// See [`SolveError`].
    pub fn solve(&self, params: &ParameterSet, times: &[Time]) -> Result<Solution, SolveError> {
        self::core::solve(params, times, &self.config)
    }
}

/// Input to the [`ContactLens`] model.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactLensInput {
    pub parameters: ParameterSet,

    /// Output times, non-decreasing; integration starts at the first.
    pub times: Vec<Time>,
}

impl Model for ContactLens {
    type Input = ContactLensInput;
    type Output = Solution;
    type Error = SolveError;

    fn call(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
        self.solve(&input.parameters, &input.times)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use uom::si::time::second;

    use parameters::{GAO_2018_ISOTHERMAL, get_parameters};

    #[test]
    fn model_call_matches_direct_solve() {
        let lens = ContactLens::new(SolveConfig {
            nodes: 6,
            ..SolveConfig::default()
        });
        let input = ContactLensInput {
            parameters: get_parameters(GAO_2018_ISOTHERMAL).unwrap(),
            times: [0.0, 5.0, 10.0]
                .into_iter()
                .map(Time::new::<second>)
                .collect(),
        };

        let via_model = lens.call(&input).unwrap();
        let direct = lens.solve(&input.parameters, &input.times).unwrap();
        assert_eq!(via_model, direct);
        assert_eq!(lens.config().nodes, 6);
    }
}
