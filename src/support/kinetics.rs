//! Photopolymerisation rate laws.
//!
//! The rate laws here are generic over [`DualNum`] so the same expression
//! serves plain `f64` evaluation and the forward-mode derivatives used to
//! assemble solver Jacobians.

use num_dual::DualNum;
use uom::si::{f64::MolarEnergy, molar_energy::joule_per_mole};

use crate::support::constraint::{Constrained, NonNegative, StrictlyPositive};

/// Molar gas constant used by the rate law, in J/(mol·K).
pub const GAS_CONSTANT: f64 = 8.314;

/// Photoinitiated free-radical polymerisation rate with Arrhenius temperature
/// dependence:
///
/// ```text
/// R_p(α, I, T) = C0 · exp(-Ea / (R·T)) · (1 - α) · √I
/// ```
///
/// `α` is the degree of cure, `I` the local UV intensity in W/m², and `T` the
/// absolute temperature in K. The result is in s⁻¹.
///
/// The law performs no domain checks. A temperature at or below zero or a
/// negative intensity yields a non-finite rate, and a degree of cure above one
/// yields a negative rate. The coupled model never drives its state there, so
/// the expression is left exactly as written.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrheniusRate {
    rate_constant: f64,
    activation_energy: f64,
}

impl ArrheniusRate {
    /// Creates a rate law from its pre-exponential constant `C0`, in
    /// s⁻¹·(W/m²)^-½, and its activation energy.
    #[must_use]
    pub fn new(
        rate_constant: Constrained<f64, NonNegative>,
        activation_energy: Constrained<MolarEnergy, NonNegative>,
    ) -> Self {
        Self {
            rate_constant: rate_constant.into_inner(),
            activation_energy: activation_energy.into_inner().get::<joule_per_mole>(),
        }
    }

    /// Pre-exponential rate constant `C0`, in s⁻¹·(W/m²)^-½.
    #[must_use]
    pub fn rate_constant(&self) -> f64 {
        self.rate_constant
    }

    /// Activation energy `Ea`.
    #[must_use]
    pub fn activation_energy(&self) -> MolarEnergy {
        MolarEnergy::new::<joule_per_mole>(self.activation_energy)
    }

    /// Evaluates the rate of polymerisation.
    pub fn rate<D: DualNum<f64>>(&self, cure: D, intensity: D, temperature: D) -> D {
        let arrhenius = (temperature.recip() * (-self.activation_energy / GAS_CONSTANT)).exp();
        arrhenius * self.rate_constant * (-cure + 1.0) * intensity.sqrt()
    }

    /// Returns the temperature-independent law that reproduces this law's
    /// rate at `reference` temperature (in K).
    ///
    /// The activation energy is dropped and its Arrhenius factor at the
    /// reference temperature is folded into the rate constant.
    #[must_use]
    pub fn isothermal_at(&self, reference: Constrained<f64, StrictlyPositive>) -> Self {
        let reference = reference.into_inner();
        Self {
            rate_constant: self.rate_constant
                * (-self.activation_energy / (GAS_CONSTANT * reference)).exp(),
            activation_energy: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use num_dual::Dual64;

    fn gao() -> ArrheniusRate {
        ArrheniusRate::new(
            NonNegative::new(1.304).unwrap(),
            NonNegative::new(MolarEnergy::new::<joule_per_mole>(17_792.0)).unwrap(),
        )
    }

    #[test]
    fn matches_closed_form() {
        let rate = gao().rate(0.25, 80.0, 353.15);
        let expected = 1.304 * (-17_792.0 / (8.314 * 353.15_f64)).exp() * 0.75 * 80.0_f64.sqrt();
        assert_relative_eq!(rate, expected, max_relative = 1e-14);
    }

    #[test]
    fn decreases_with_cure() {
        let law = gao();
        let fresh = law.rate(0.0, 80.0, 353.15);
        let half = law.rate(0.5, 80.0, 353.15);
        let nearly_done = law.rate(0.99, 80.0, 353.15);
        assert!(fresh > half);
        assert!(half > nearly_done);
        assert!(nearly_done > 0.0);
    }

    #[test]
    fn increases_with_intensity_and_temperature() {
        let law = gao();
        assert!(law.rate(0.2, 10.0, 353.15) < law.rate(0.2, 80.0, 353.15));
        assert!(law.rate(0.2, 80.0, 300.0) < law.rate(0.2, 80.0, 353.15));
    }

    #[test]
    fn over_cured_state_gives_negative_rate() {
        assert!(gao().rate(1.1, 80.0, 353.15) < 0.0);
    }

    #[test]
    fn isothermal_law_agrees_at_reference_temperature() {
        let law = gao();
        let isothermal = law.isothermal_at(StrictlyPositive::new(353.15).unwrap());

        assert_eq!(isothermal.activation_energy().get::<joule_per_mole>(), 0.0);
        for (cure, intensity) in [(0.0, 80.0), (0.3, 40.0), (0.9, 5.0)] {
            assert_relative_eq!(
                isothermal.rate(cure, intensity, 353.15),
                law.rate(cure, intensity, 353.15),
                max_relative = 1e-12
            );
        }
        // Away from the reference the isothermal law ignores temperature.
        assert_relative_eq!(
            isothermal.rate(0.3, 40.0, 400.0),
            isothermal.rate(0.3, 40.0, 353.15),
            max_relative = 1e-14
        );
    }

    #[test]
    fn dual_derivative_in_cure() {
        let law = gao();
        let cure = Dual64::new(0.4, 1.0);
        let rate = law.rate(cure, Dual64::from(80.0), Dual64::from(353.15));
        // R_p is linear in (1 - α), so ∂R_p/∂α = -R_p / (1 - α).
        assert_relative_eq!(rate.eps, -rate.re / 0.6, max_relative = 1e-12);
    }
}
