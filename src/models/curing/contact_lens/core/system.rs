//! Finite-volume semi-discretisation of the coupled lens equations.
//!
//! Per cell `i` with width `dz` the unknowns are `[T_i, α_i, I_i]` and the
//! semi-discrete system reads
//!
//! ```text
//! ρ·c_p dT_i/dt = (q_{i-½} - q_{i+½}) / dz + k_I·I_i + β·R_p(α_i, I_i, T_i)
//!       dα_i/dt = R_p(α_i, I_i, T_i)
//!             0 = (I_i - I_{i-1}) / dz + k_I·I_i,        I_{-1} = I0
//! ```
//!
//! Interior conductive fluxes are `q = -k·(T_i - T_{i-1}) / dz`. The surface
//! fluxes are `-h·(T_b - T_amb)` entering at `z = 0` and `h·(T_b - T_amb)`
//! leaving at `z = L`, where the surface temperature `T_b` balances conduction
//! across the half cell against the convective loss.

use num_dual::{Dual64, DualNum};
use uom::si::{
    heat_flux_density::watt_per_square_meter, heat_transfer::watt_per_square_meter_kelvin,
    mass_density::kilogram_per_cubic_meter, specific_heat_capacity::joule_per_kilogram_kelvin,
    thermal_conductivity::watt_per_meter_kelvin, thermodynamic_temperature::kelvin,
};

use crate::support::{
    constraint::{Constrained, StrictlyPositive},
    kinetics::ArrheniusRate,
};

use super::{
    constants::ModelConstants,
    mesh::{FIELDS, Field, Mesh, index},
};

/// Numbers the residual can be evaluated with: plain values and dual numbers.
pub(super) trait Scalar: DualNum<f64> + Copy {
    /// The real part.
    fn value(self) -> f64;
}

impl Scalar for f64 {
    fn value(self) -> f64 {
        self
    }
}

impl Scalar for Dual64 {
    fn value(self) -> f64 {
        self.re
    }
}

/// Local rate of polymerisation under `law`.
///
/// The square root in the rate law is not differentiable at zero intensity,
/// so unlit cells (a dark surface, or transiently inside Newton iterations)
/// react at rate zero.
pub(super) fn polymerisation_rate<D: Scalar>(
    law: &ArrheniusRate,
    cure: D,
    intensity: D,
    temperature: D,
) -> D {
    if intensity.value() <= 0.0 {
        return D::from(0.0);
    }
    law.rate(cure, intensity, temperature)
}

/// The nonlinear equations solved at one time level.
#[derive(Debug, Clone, PartialEq)]
pub(super) enum StepEquation {
    /// A BDF step: differential rows read `scale·u + history - f(u)`.
    Transient { scale: f64, history: Vec<f64> },

    /// Consistent initialisation: differential rows pin `u` to `fixed`, so only
    /// the algebraic rows move.
    Consistency { fixed: Vec<f64> },
}

/// The discretised lens.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct CuringSystem {
    mesh: Mesh,
    heat_capacity: f64,
    conductivity: f64,
    absorbance: f64,
    reaction_heat: f64,
    boundary_intensity: f64,
    initial_temperature: f64,
    ambient_temperature: f64,
    heat_transfer: f64,
    rate: ArrheniusRate,
}

impl CuringSystem {
    pub(super) fn new(
        constants: &ModelConstants,
        nodes: Constrained<usize, StrictlyPositive>,
    ) -> Self {
        Self {
            mesh: Mesh::new(constants.thickness, nodes),
            heat_capacity: constants.density.get::<kilogram_per_cubic_meter>()
                * constants.specific_heat.get::<joule_per_kilogram_kelvin>(),
            conductivity: constants.conductivity.get::<watt_per_meter_kelvin>(),
            absorbance: constants.absorbance,
            reaction_heat: constants.reaction_heat,
            boundary_intensity: constants.boundary_intensity.get::<watt_per_square_meter>(),
            initial_temperature: constants.initial_temperature.get::<kelvin>(),
            ambient_temperature: constants.ambient_temperature.get::<kelvin>(),
            heat_transfer: constants.heat_transfer.get::<watt_per_square_meter_kelvin>(),
            rate: constants.rate,
        }
    }

    pub(super) fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub(super) fn rate_law(&self) -> &ArrheniusRate {
        &self.rate
    }

    /// Initial state: uniform `T0`, no cure, and the surface intensity
    /// everywhere as a starting guess for the algebraic rows.
    pub(super) fn initial_guess(&self) -> Vec<f64> {
        let mut u = vec![0.0; self.mesh.unknowns()];
        for cell in 0..self.mesh.cells() {
            u[index(cell, Field::Temperature)] = self.initial_temperature;
            u[index(cell, Field::Cure)] = 0.0;
            u[index(cell, Field::Intensity)] = self.boundary_intensity;
        }
        u
    }

    /// Surface temperature for a boundary cell at temperature `cell`.
    fn surface_temperature<D: Scalar>(&self, cell: D) -> D {
        let conduction = 2.0 * self.conductivity / self.mesh.width();
        (cell * conduction + self.heat_transfer * self.ambient_temperature)
            / (conduction + self.heat_transfer)
    }

    /// `[dT/dt, dα/dt, UV residual]` for one cell.
    fn cell_terms<D: Scalar>(&self, u: &[D], cell: usize) -> [D; FIELDS] {
        let dz = self.mesh.width();
        let last = self.mesh.cells() - 1;

        let temperature = u[index(cell, Field::Temperature)];
        let cure = u[index(cell, Field::Cure)];
        let intensity = u[index(cell, Field::Intensity)];

        let flux_in = if cell == 0 {
            -(self.surface_temperature(temperature) - self.ambient_temperature)
                * self.heat_transfer
        } else {
            -(temperature - u[index(cell - 1, Field::Temperature)]) * (self.conductivity / dz)
        };
        let flux_out = if cell == last {
            (self.surface_temperature(temperature) - self.ambient_temperature)
                * self.heat_transfer
        } else {
            -(u[index(cell + 1, Field::Temperature)] - temperature) * (self.conductivity / dz)
        };

        let rate = polymerisation_rate(&self.rate, cure, intensity, temperature);
        let heating = (flux_in - flux_out) / dz
            + intensity * self.absorbance
            + rate * self.reaction_heat;

        let upstream = if cell == 0 {
            D::from(self.boundary_intensity)
        } else {
            u[index(cell - 1, Field::Intensity)]
        };
        let attenuation = (intensity - upstream) / dz + intensity * self.absorbance;

        [heating / self.heat_capacity, rate, attenuation]
    }

    /// Evaluates the equations of one time level at `u` into `out`.
    pub(super) fn residual<D: Scalar>(&self, u: &[D], equation: &StepEquation, out: &mut [D]) {
        for cell in 0..self.mesh.cells() {
            let terms = self.cell_terms(u, cell);
            for field in Field::ALL {
                let row = index(cell, field);
                let term = terms[field as usize];
                out[row] = if field.is_differential() {
                    match equation {
                        StepEquation::Transient { scale, history } => {
                            u[row] * *scale + history[row] - term
                        }
                        StepEquation::Consistency { fixed } => u[row] - fixed[row],
                    }
                } else {
                    term
                };
            }
        }
    }

    /// Time derivatives of the differential fields, zero on algebraic rows.
    pub(super) fn derivative(&self, u: &[f64]) -> Vec<f64> {
        let mut out = vec![0.0; u.len()];
        for cell in 0..self.mesh.cells() {
            let terms = self.cell_terms(u, cell);
            out[index(cell, Field::Temperature)] = terms[Field::Temperature as usize];
            out[index(cell, Field::Cure)] = terms[Field::Cure as usize];
        }
        out
    }
}
