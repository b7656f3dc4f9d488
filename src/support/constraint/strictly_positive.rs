use std::cmp::Ordering;

use num_traits::Zero;

use super::{Constrained, Constraint, ConstraintError};

/// Marker type enforcing that a value is strictly positive (greater than zero).
///
/// Material properties that appear as divisors in the model (density, heat
/// capacity, conductivity, thickness, absolute temperature) use this marker.
///
/// # Examples
///
/// ```
/// use lens_cure::support::constraint::{Constrained, StrictlyPositive};
///
/// let nodes = Constrained::<usize, StrictlyPositive>::new(50).unwrap();
/// assert_eq!(nodes.into_inner(), 50);
///
/// let density = StrictlyPositive::new(1128.0).unwrap();
/// assert_eq!(density.into_inner(), 1128.0);
///
/// assert!(StrictlyPositive::new(0.0).is_err());
/// assert!(StrictlyPositive::new(-1.0).is_err());
/// assert!(StrictlyPositive::new(f64::NAN).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct StrictlyPositive;

impl StrictlyPositive {
    /// Constructs a [`Constrained<T, StrictlyPositive>`] if the value is strictly positive.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is zero, negative, or not a number (`NaN`).
    pub fn new<T: PartialOrd + Zero>(
        value: T,
    ) -> Result<Constrained<T, StrictlyPositive>, ConstraintError> {
        Constrained::<T, StrictlyPositive>::new(value)
    }
}

impl<T: PartialOrd + Zero> Constraint<T> for StrictlyPositive {
    fn check(value: &T) -> Result<(), ConstraintError> {
        match value.partial_cmp(&T::zero()) {
            Some(Ordering::Greater) => Ok(()),
            Some(Ordering::Equal) => Err(ConstraintError::Zero),
            Some(Ordering::Less) => Err(ConstraintError::Negative),
            None => Err(ConstraintError::NotANumber),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use uom::si::{f64::Length, length::micrometer};

    #[test]
    fn integers() {
        assert!(StrictlyPositive::new(2_usize).is_ok());
        assert_eq!(StrictlyPositive::new(0_usize), Err(ConstraintError::Zero));
    }

    #[test]
    fn floats() {
        assert!(Constrained::<f64, StrictlyPositive>::new(1.0).is_ok());
        assert!(StrictlyPositive::new(1e-300).is_ok());
        assert_eq!(StrictlyPositive::new(0.0), Err(ConstraintError::Zero));
        assert_eq!(StrictlyPositive::new(-5.0), Err(ConstraintError::Negative));
        assert_eq!(
            StrictlyPositive::new(f64::NAN),
            Err(ConstraintError::NotANumber)
        );
    }

    #[test]
    fn lens_thickness() {
        let thickness = Length::new::<micrometer>(200.0);
        assert!(StrictlyPositive::new(thickness).is_ok());

        let flat = Length::new::<micrometer>(0.0);
        assert!(StrictlyPositive::new(flat).is_err());
    }
}
