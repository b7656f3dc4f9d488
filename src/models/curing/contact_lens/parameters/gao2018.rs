//! Parameters after Gao et al. (2018) for a UV-cured hydrogel lens.

use crate::support::constraint::StrictlyPositive;

use super::{
    GAO_2018, GAO_2018_ISOTHERMAL, Parameter, ParameterError, ParameterSet, RateLaw,
};

/// UV penetration depth of the monomer mix, in m.
const PENETRATION_DEPTH: f64 = 77.55e-6;

pub(super) fn temperature_dependent() -> ParameterSet {
    ParameterSet::new(GAO_2018)
        .with(Parameter::Density, 1128.0)
        .with(Parameter::SpecificHeatCapacity, 1190.0)
        .with(Parameter::ThermalConductivity, 0.2)
        .with(Parameter::RadiationAbsorbance, 1.0 / PENETRATION_DEPTH)
        .with(Parameter::EnthalpyOfPolymerisation, 79_950.0)
        .with(Parameter::InitialMonomerConcentration, 8200.0)
        .with(Parameter::UvBoundaryIntensity, 80.0)
        .with(Parameter::InitialTemperature, 353.15)
        .with(Parameter::AmbientTemperature, 353.15)
        .with(Parameter::HeatTransferCoefficient, 10.0)
        .with(Parameter::LensThickness, 200e-6)
        .with(Parameter::RateOfPolymerisation, RateLaw::Arrhenius)
        .with(Parameter::ActivationEnergy, 17_792.0)
        .with(Parameter::ReactionRateConstant, 1.304)
}

/// The temperature-dependent set with its rate law frozen at the ambient
/// temperature, so both sets cure at the same rate when the lens sits at
/// ambient.
pub(super) fn isothermal() -> Result<ParameterSet, ParameterError> {
    let reference = temperature_dependent();
    let ambient = reference.constrained::<StrictlyPositive>(Parameter::AmbientTemperature)?;
    let frozen = reference.rate_function()?.isothermal_at(ambient);

    Ok(reference
        .renamed(GAO_2018_ISOTHERMAL)
        .with(Parameter::ActivationEnergy, 0.0)
        .with(Parameter::ReactionRateConstant, frozen.rate_constant()))
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn isothermal_rate_constant_is_rescaled() {
        let params = isothermal().unwrap();
        assert_relative_eq!(
            params.scalar(Parameter::ReactionRateConstant).unwrap(),
            1.304 * (-17_792.0 / (8.314 * 353.15_f64)).exp(),
            max_relative = 1e-14
        );
        assert_eq!(params.scalar(Parameter::ActivationEnergy).unwrap(), 0.0);
    }

    #[test]
    fn sets_rate_identically_at_ambient() {
        let dependent = temperature_dependent().rate_function().unwrap();
        let isothermal = isothermal().unwrap().rate_function().unwrap();
        let ambient = 353.15;

        for cure in [0.0, 0.25, 0.5, 0.99] {
            for intensity in [0.0, 6.0, 80.0] {
                assert_relative_eq!(
                    dependent.rate(cure, intensity, ambient),
                    isothermal.rate(cure, intensity, ambient),
                    max_relative = 1e-12
                );
            }
        }
    }

    #[test]
    fn shared_constants_agree() {
        let dependent = temperature_dependent();
        let isothermal = isothermal().unwrap();
        for parameter in Parameter::ALL {
            if matches!(
                parameter,
                Parameter::ActivationEnergy | Parameter::ReactionRateConstant
            ) {
                continue;
            }
            assert_eq!(dependent.get(parameter), isothermal.get(parameter));
        }
    }
}
