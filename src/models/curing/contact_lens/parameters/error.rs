use thiserror::Error;

use crate::support::constraint::ConstraintError;

use super::Parameter;

/// Errors raised while looking up or reading parameters.
///
/// These are configuration errors: they are detected before any numerical
/// work starts and are never recovered from inside the model.
#[derive(Debug, Error)]
pub enum ParameterError {
    /// No parameter set is registered under this name.
    #[error("parameter set '{name}' not recognised")]
    UnknownParameterSet {
        /// The requested set name.
        name: String,
    },

    /// The name does not match any [`Parameter`].
    #[error("unknown parameter '{name}'")]
    UnknownParameter {
        /// The requested parameter name.
        name: String,
    },

    /// A parameter the model requires is absent from the set.
    #[error("parameter '{parameter}' is missing from set '{set}'")]
    MissingParameter {
        /// Name of the incomplete set.
        set: String,

        /// The absent parameter.
        parameter: Parameter,
    },

    /// A scalar was expected but the set holds a kinetics law.
    #[error("parameter '{parameter}' must be a scalar")]
    NotAScalar { parameter: Parameter },

    /// A kinetics law was expected but the set holds a scalar.
    #[error("parameter '{parameter}' must be a kinetics law")]
    NotAKineticsLaw { parameter: Parameter },

    /// A scalar lies outside the parameter's admissible range.
    #[error("parameter '{parameter}' has invalid value {value}")]
    InvalidValue {
        parameter: Parameter,

        /// The offending value.
        value: f64,

        /// The violated constraint.
        #[source]
        source: ConstraintError,
    },
}
