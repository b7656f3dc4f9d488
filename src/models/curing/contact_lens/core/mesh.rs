//! Uniform cell-centred mesh across the lens and the state layout on it.

use uom::si::{f64::Length, length::meter};

use crate::support::constraint::{Constrained, StrictlyPositive};

/// Number of unknowns stored per cell.
pub(super) const FIELDS: usize = 3;

/// Offset of each field within a cell's block of unknowns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Field {
    Temperature = 0,
    Cure = 1,
    Intensity = 2,
}

impl Field {
    pub(super) const ALL: [Field; FIELDS] = [Field::Temperature, Field::Cure, Field::Intensity];

    /// Whether the field carries a time derivative.
    pub(super) fn is_differential(self) -> bool {
        !matches!(self, Field::Intensity)
    }

    pub(super) fn of_row(row: usize) -> Self {
        match row % FIELDS {
            0 => Field::Temperature,
            1 => Field::Cure,
            _ => Field::Intensity,
        }
    }
}

/// `N` equal control volumes spanning `[0, L]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct Mesh {
    cells: usize,
    width: f64,
}

impl Mesh {
    /// The thickness is expected to be positive; the model constants check it.
    pub(super) fn new(thickness: Length, cells: Constrained<usize, StrictlyPositive>) -> Self {
        let cells = cells.into_inner();
        Self {
            cells,
            width: thickness.get::<meter>() / cells as f64,
        }
    }

    pub(super) fn cells(&self) -> usize {
        self.cells
    }

    /// Cell width `dz`, in m.
    pub(super) fn width(&self) -> f64 {
        self.width
    }

    /// Length of the flattened state vector.
    pub(super) fn unknowns(&self) -> usize {
        self.cells * FIELDS
    }

    /// Cell-centre positions, in m.
    pub(super) fn centres(&self) -> Vec<f64> {
        (0..self.cells)
            .map(|i| (i as f64 + 0.5) * self.width)
            .collect()
    }
}

/// Index of `field` in cell `cell` of the flattened state.
pub(super) fn index(cell: usize, field: Field) -> usize {
    cell * FIELDS + field as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    fn mesh(cells: usize) -> Mesh {
        Mesh::new(
            Length::new::<meter>(200e-6),
            StrictlyPositive::new(cells).unwrap(),
        )
    }

    #[test]
    fn centres_are_cell_midpoints() {
        let mesh = mesh(4);
        let centres = mesh.centres();
        assert_eq!(centres.len(), 4);
        assert_relative_eq!(centres[0], 25e-6, max_relative = 1e-12);
        assert_relative_eq!(centres[3], 175e-6, max_relative = 1e-12);
        assert_relative_eq!(mesh.width(), 50e-6, max_relative = 1e-12);
    }

    #[test]
    fn layout_interleaves_fields() {
        assert_eq!(index(0, Field::Temperature), 0);
        assert_eq!(index(2, Field::Intensity), 8);
        assert_eq!(mesh(5).unknowns(), 15);
        for row in 0..9 {
            let field = Field::of_row(row);
            assert_eq!(row % FIELDS, field as usize);
            assert_eq!(field.is_differential(), row % FIELDS != 2);
        }
    }
}
