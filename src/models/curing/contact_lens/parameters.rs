//! Named parameter sets for the contact-lens curing model.
//!
//! A [`ParameterSet`] maps each [`Parameter`] to a [`ParameterValue`]:
//! either a scalar in the SI unit written in the parameter's name, or a
//! kinetics law. Sets are looked up by name with [`get_parameters`].
//!
//! ```
//! use lens_cure::models::curing::contact_lens::parameters::{
//!     Parameter, get_parameters,
//! };
//!
//! let params = get_parameters("Gao2018").unwrap();
//! assert_eq!(params.scalar(Parameter::LensThickness).unwrap(), 200e-6);
//! ```

mod error;
mod gao2018;

use std::{collections::BTreeMap, fmt, str::FromStr};

use uom::si::{f64::MolarEnergy, molar_energy::joule_per_mole};

use crate::support::{
    constraint::{Constrained, Constraint, NonNegative},
    kinetics::ArrheniusRate,
};

pub use error::ParameterError;

/// Name of the temperature-dependent parameter set.
pub const GAO_2018: &str = "Gao2018";

/// Name of the isothermal parameter set.
pub const GAO_2018_ISOTHERMAL: &str = "Gao2018 isothermal";

/// Returns the parameter set registered under `name`.
///
/// # Errors
///
/// Returns [`ParameterError::UnknownParameterSet`] if no set has that name.
pub fn get_parameters(name: &str) -> Result<ParameterSet, ParameterError> {
    match name {
        GAO_2018 => Ok(gao2018::temperature_dependent()),
        GAO_2018_ISOTHERMAL => gao2018::isothermal(),
        _ => Err(ParameterError::UnknownParameterSet {
            name: name.to_owned(),
        }),
    }
}

/// A physical constant or law consumed by the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Parameter {
    Density,
    SpecificHeatCapacity,
    ThermalConductivity,
    RadiationAbsorbance,
    EnthalpyOfPolymerisation,
    InitialMonomerConcentration,
    UvBoundaryIntensity,
    InitialTemperature,
    AmbientTemperature,
    HeatTransferCoefficient,
    LensThickness,
    RateOfPolymerisation,
    ActivationEnergy,
    ReactionRateConstant,
}

impl Parameter {
    /// Every parameter, in declaration order.
    pub const ALL: [Parameter; 14] = [
        Parameter::Density,
        Parameter::SpecificHeatCapacity,
        Parameter::ThermalConductivity,
        Parameter::RadiationAbsorbance,
        Parameter::EnthalpyOfPolymerisation,
        Parameter::InitialMonomerConcentration,
        Parameter::UvBoundaryIntensity,
        Parameter::InitialTemperature,
        Parameter::AmbientTemperature,
        Parameter::HeatTransferCoefficient,
        Parameter::LensThickness,
        Parameter::RateOfPolymerisation,
        Parameter::ActivationEnergy,
        Parameter::ReactionRateConstant,
    ];

    /// The parameter's name, including its SI unit.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Parameter::Density => "Density [kg.m-3]",
            Parameter::SpecificHeatCapacity => "Specific heat capacity [J.kg-1.K-1]",
            Parameter::ThermalConductivity => "Thermal conductivity [W.m-1.K-1]",
            Parameter::RadiationAbsorbance => "Radiation absorbance [m-1]",
            Parameter::EnthalpyOfPolymerisation => "Enthalpy of polymerisation [J.mol-1]",
            Parameter::InitialMonomerConcentration => "Initial monomer concentration [mol.m-3]",
            Parameter::UvBoundaryIntensity => "UV boundary intensity [W.m-2]",
            Parameter::InitialTemperature => "Initial temperature [K]",
            Parameter::AmbientTemperature => "Ambient temperature [K]",
            Parameter::HeatTransferCoefficient => "Heat transfer coefficient [W.m-2.K-1]",
            Parameter::LensThickness => "Lens thickness [m]",
            Parameter::RateOfPolymerisation => "Rate of polymerisation [s-1]",
            Parameter::ActivationEnergy => "Activation energy of polymerisation [J.mol-1]",
            Parameter::ReactionRateConstant => "Reaction rate constant [s-1.W-0.5.m]",
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Parameter {
    type Err = ParameterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Parameter::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| ParameterError::UnknownParameter { name: s.to_owned() })
    }
}

/// Kinetics laws a parameter set can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLaw {
    /// [`ArrheniusRate`] bound to the set's [`Parameter::ReactionRateConstant`]
    /// and [`Parameter::ActivationEnergy`].
    Arrhenius,
}

/// The value stored for a [`Parameter`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParameterValue {
    /// A constant in the SI unit given by the parameter name.
    Scalar(f64),
    /// A kinetics law whose constants are read from the same set.
    Kinetics(RateLaw),
}

impl From<f64> for ParameterValue {
    fn from(value: f64) -> Self {
        Self::Scalar(value)
    }
}

impl From<RateLaw> for ParameterValue {
    fn from(law: RateLaw) -> Self {
        Self::Kinetics(law)
    }
}

/// An immutable, named collection of parameter values.
///
/// Builder-style methods return modified copies, which makes it easy to
/// derive variants of a published set for sensitivity studies.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSet {
    name: String,
    values: BTreeMap<Parameter, ParameterValue>,
}

impl ParameterSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: BTreeMap::new(),
        }
    }

    /// The set's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns a copy with `parameter` set to `value`.
    #[must_use]
    pub fn with(mut self, parameter: Parameter, value: impl Into<ParameterValue>) -> Self {
        self.values.insert(parameter, value.into());
        self
    }

    /// Returns a copy without `parameter`.
    #[must_use]
    pub fn without(mut self, parameter: Parameter) -> Self {
        self.values.remove(&parameter);
        self
    }

    /// Returns a copy carrying a different name.
    #[must_use]
    pub fn renamed(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Looks up a parameter.
    #[must_use]
    pub fn get(&self, parameter: Parameter) -> Option<&ParameterValue> {
        self.values.get(&parameter)
    }

    /// Looks up a parameter by its full name, e.g. `"Density [kg.m-3]"`.
    ///
    /// # Errors
    ///
    /// Returns [`ParameterError::UnknownParameter`] if the name is not a
    /// parameter the model knows.
    pub fn get_by_name(&self, name: &str) -> Result<Option<&ParameterValue>, ParameterError> {
        Ok(self.get(name.parse()?))
    }

    /// Returns `true` if the set defines `parameter`.
    #[must_use]
    pub fn contains(&self, parameter: Parameter) -> bool {
        self.values.contains_key(&parameter)
    }

    /// Iterates over the defined parameters in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (Parameter, &ParameterValue)> {
        self.values.iter().map(|(p, v)| (*p, v))
    }

    /// Returns a scalar parameter.
    ///
    /// # Errors
    ///
    /// Fails if the parameter is missing or holds a kinetics law.
    pub fn scalar(&self, parameter: Parameter) -> Result<f64, ParameterError> {
        match self.require(parameter)? {
            ParameterValue::Scalar(value) => Ok(*value),
            ParameterValue::Kinetics(_) => Err(ParameterError::NotAScalar { parameter }),
        }
    }

    /// Returns a scalar parameter checked against constraint `C`.
    ///
    /// # Errors
    ///
    /// Fails if the parameter is missing, is not a scalar, or violates `C`.
    pub fn constrained<C: Constraint<f64>>(
        &self,
        parameter: Parameter,
    ) -> Result<Constrained<f64, C>, ParameterError> {
        let value = self.scalar(parameter)?;
        Constrained::new(value).map_err(|source| ParameterError::InvalidValue {
            parameter,
            value,
            source,
        })
    }

    /// Returns a kinetics-law parameter.
    ///
    /// # Errors
    ///
    /// Fails if the parameter is missing or holds a scalar.
    pub fn rate_law(&self, parameter: Parameter) -> Result<RateLaw, ParameterError> {
        match self.require(parameter)? {
            ParameterValue::Kinetics(law) => Ok(*law),
            ParameterValue::Scalar(_) => Err(ParameterError::NotAKineticsLaw { parameter }),
        }
    }

    /// Binds [`Parameter::RateOfPolymerisation`] to this set's constants.
    ///
    /// # Errors
    ///
    /// Fails if the law or any constant it reads is missing or invalid.
    pub fn rate_function(&self) -> Result<ArrheniusRate, ParameterError> {
        match self.rate_law(Parameter::RateOfPolymerisation)? {
            RateLaw::Arrhenius => {
                let rate_constant =
                    self.constrained::<NonNegative>(Parameter::ReactionRateConstant)?;
                let ea = self.scalar(Parameter::ActivationEnergy)?;
                let activation_energy =
                    NonNegative::new(MolarEnergy::new::<joule_per_mole>(ea)).map_err(|source| {
                        ParameterError::InvalidValue {
                            parameter: Parameter::ActivationEnergy,
                            value: ea,
                            source,
                        }
                    })?;
                Ok(ArrheniusRate::new(rate_constant, activation_energy))
            }
        }
    }

    fn require(&self, parameter: Parameter) -> Result<&ParameterValue, ParameterError> {
        self.get(parameter)
            .ok_or_else(|| ParameterError::MissingParameter {
                set: self.name.clone(),
                parameter,
            })
    }
}
