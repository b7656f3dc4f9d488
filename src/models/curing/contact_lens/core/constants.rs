//! Model constants resolved from a parameter set.

use uom::si::{
    f64::{
        HeatFluxDensity, HeatTransfer, Length, MassDensity, SpecificHeatCapacity,
        ThermalConductivity, ThermodynamicTemperature,
    },
    heat_flux_density::watt_per_square_meter,
    heat_transfer::watt_per_square_meter_kelvin,
    length::meter,
    mass_density::kilogram_per_cubic_meter,
    specific_heat_capacity::joule_per_kilogram_kelvin,
    thermal_conductivity::watt_per_meter_kelvin,
    thermodynamic_temperature::kelvin,
};

use crate::{
    models::curing::contact_lens::parameters::{Parameter, ParameterError, ParameterSet},
    support::{
        constraint::{NonNegative, StrictlyPositive},
        kinetics::ArrheniusRate,
    },
};

/// Every constant the model reads, checked and in physical units.
///
/// Resolution reads every required parameter before any numerical work, so
/// an incomplete or invalid set fails fast with the offending parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ModelConstants {
    pub(crate) density: MassDensity,
    pub(crate) specific_heat: SpecificHeatCapacity,
    pub(crate) conductivity: ThermalConductivity,

    /// UV absorbance `k_I`, in m⁻¹.
    pub(crate) absorbance: f64,

    /// Heat released per unit volume by full conversion, `ΔH·[M]0`, in J/m³.
    pub(crate) reaction_heat: f64,

    pub(crate) boundary_intensity: HeatFluxDensity,
    pub(crate) initial_temperature: ThermodynamicTemperature,
    pub(crate) ambient_temperature: ThermodynamicTemperature,
    pub(crate) heat_transfer: HeatTransfer,
    pub(crate) thickness: Length,
    pub(crate) rate: ArrheniusRate,
}

impl ModelConstants {
    /// Resolves the constants from `params`.
    ///
    /// # Errors
    ///
    /// Returns the first [`ParameterError`] encountered, in [`Parameter`]
    /// declaration order.
    pub(crate) fn resolve(params: &ParameterSet) -> Result<Self, ParameterError> {
        let positive = |p| {
            params
                .constrained::<StrictlyPositive>(p)
                .map(|c| c.into_inner())
        };
        let non_negative = |p| params.constrained::<NonNegative>(p).map(|c| c.into_inner());

        let density = positive(Parameter::Density)?;
        let specific_heat = positive(Parameter::SpecificHeatCapacity)?;
        let conductivity = positive(Parameter::ThermalConductivity)?;
        let absorbance = non_negative(Parameter::RadiationAbsorbance)?;
        let enthalpy = non_negative(Parameter::EnthalpyOfPolymerisation)?;
        let concentration = non_negative(Parameter::InitialMonomerConcentration)?;
        let boundary_intensity = non_negative(Parameter::UvBoundaryIntensity)?;
        let initial_temperature = positive(Parameter::InitialTemperature)?;
        let ambient_temperature = positive(Parameter::AmbientTemperature)?;
        let heat_transfer = non_negative(Parameter::HeatTransferCoefficient)?;
        let thickness = positive(Parameter::LensThickness)?;
        let rate = params.rate_function()?;

        Ok(Self {
            density: MassDensity::new::<kilogram_per_cubic_meter>(density),
            specific_heat: SpecificHeatCapacity::new::<joule_per_kilogram_kelvin>(specific_heat),
            conductivity: ThermalConductivity::new::<watt_per_meter_kelvin>(conductivity),
            absorbance,
            reaction_heat: enthalpy * concentration,
            boundary_intensity: HeatFluxDensity::new::<watt_per_square_meter>(boundary_intensity),
            initial_temperature: ThermodynamicTemperature::new::<kelvin>(initial_temperature),
            ambient_temperature: ThermodynamicTemperature::new::<kelvin>(ambient_temperature),
            heat_transfer: HeatTransfer::new::<watt_per_square_meter_kelvin>(heat_transfer),
            thickness: Length::new::<meter>(thickness),
            rate,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use crate::models::curing::contact_lens::parameters::{GAO_2018, get_parameters};

    #[test]
    fn resolves_gao_set() {
        let constants = ModelConstants::resolve(&get_parameters(GAO_2018).unwrap()).unwrap();
        assert_relative_eq!(constants.thickness.get::<meter>(), 200e-6);
        assert_relative_eq!(constants.reaction_heat, 79_950.0 * 8200.0);
        assert_relative_eq!(constants.absorbance, 1.0 / 77.55e-6);
        assert_relative_eq!(
            constants.ambient_temperature.get::<kelvin>(),
            353.15,
            epsilon = 1e-12
        );
    }

    #[test]
    fn each_required_parameter_is_enforced() {
        let complete = get_parameters(GAO_2018).unwrap();
        for parameter in Parameter::ALL {
            let params = complete.clone().without(parameter);
            match ModelConstants::resolve(&params) {
                Err(ParameterError::MissingParameter { parameter: p, .. }) => {
                    assert_eq!(p, parameter);
                }
                other => panic!("removing {parameter} should fail, got {other:?}"),
            }
        }
    }

    #[test]
    fn rejects_non_physical_values() {
        let params = get_parameters(GAO_2018)
            .unwrap()
            .with(Parameter::InitialTemperature, 0.0);
        assert!(matches!(
            ModelConstants::resolve(&params),
            Err(ParameterError::InvalidValue {
                parameter: Parameter::InitialTemperature,
                ..
            })
        ));
    }
}
