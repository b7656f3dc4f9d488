//! Solved fields and the output variables derived from them.

use std::{fmt, str::FromStr};

use nalgebra::DMatrix;
use thiserror::Error;
use uom::si::{
    f64::{Length, Time},
    length::meter,
    time::second,
};

use crate::support::kinetics::ArrheniusRate;

use super::{
    mesh::{Field, index},
    system::polymerisation_rate,
};

/// Shape of an output variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// One value per node and time sample.
    Field,

    /// One value per time sample.
    Series,

    /// One value per node.
    Nodes,
}

/// An output variable of the contact-lens model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputVariable {
    Temperature,
    AveragedTemperature,
    DegreeOfPolymerisation,
    TopBoundaryDegreeOfPolymerisation,
    BottomBoundaryDegreeOfPolymerisation,
    UvIntensity,
    AveragedDegreeOfPolymerisation,
    RateOfPolymerisation,
    AveragedRateOfPolymerisation,
    TimeSeconds,
    TimeMinutes,
    DepthMeters,
    DepthMicrometers,
}

impl OutputVariable {
    /// Every output variable.
    pub const ALL: [OutputVariable; 13] = [
        OutputVariable::Temperature,
        OutputVariable::AveragedTemperature,
        OutputVariable::DegreeOfPolymerisation,
        OutputVariable::TopBoundaryDegreeOfPolymerisation,
        OutputVariable::BottomBoundaryDegreeOfPolymerisation,
        OutputVariable::UvIntensity,
        OutputVariable::AveragedDegreeOfPolymerisation,
        OutputVariable::RateOfPolymerisation,
        OutputVariable::AveragedRateOfPolymerisation,
        OutputVariable::TimeSeconds,
        OutputVariable::TimeMinutes,
        OutputVariable::DepthMeters,
        OutputVariable::DepthMicrometers,
    ];

    /// The variable's name, with its unit in brackets where it has one.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            OutputVariable::Temperature => "Temperature [K]",
            OutputVariable::AveragedTemperature => "Averaged temperature [K]",
            OutputVariable::DegreeOfPolymerisation => "Degree of polymerisation",
            OutputVariable::TopBoundaryDegreeOfPolymerisation => {
                "Top boundary degree of polymerisation"
            }
            OutputVariable::BottomBoundaryDegreeOfPolymerisation => {
                "Bottom boundary degree of polymerisation"
            }
            OutputVariable::UvIntensity => "UV intensity [W.m-2]",
            OutputVariable::AveragedDegreeOfPolymerisation => "Averaged degree of polymerisation",
            OutputVariable::RateOfPolymerisation => "Rate of polymerisation [s-1]",
            OutputVariable::AveragedRateOfPolymerisation => "Averaged rate of polymerisation [s-1]",
            OutputVariable::TimeSeconds => "Time [s]",
            OutputVariable::TimeMinutes => "Time [min]",
            OutputVariable::DepthMeters => "z [m]",
            OutputVariable::DepthMicrometers => "z [um]",
        }
    }

    #[must_use]
    pub fn shape(self) -> Shape {
        match self {
            OutputVariable::Temperature
            | OutputVariable::DegreeOfPolymerisation
            | OutputVariable::UvIntensity
            | OutputVariable::RateOfPolymerisation => Shape::Field,
            OutputVariable::DepthMeters | OutputVariable::DepthMicrometers => Shape::Nodes,
            _ => Shape::Series,
        }
    }
}

impl fmt::Display for OutputVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The name does not match any [`OutputVariable`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown output variable '{name}'")]
pub struct UnknownOutputVariable {
    pub name: String,
}

impl FromStr for OutputVariable {
    type Err = UnknownOutputVariable;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OutputVariable::ALL
            .into_iter()
            .find(|variable| variable.name() == s)
            .ok_or_else(|| UnknownOutputVariable { name: s.to_owned() })
    }
}

/// Values of one output variable.
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    /// Rows are nodes, columns are time samples.
    Field(DMatrix<f64>),

    /// One value per time sample.
    Series(Vec<f64>),

    /// One value per node.
    Nodes(Vec<f64>),
}

impl Output {
    #[must_use]
    pub fn shape(&self) -> Shape {
        match self {
            Output::Field(_) => Shape::Field,
            Output::Series(_) => Shape::Series,
            Output::Nodes(_) => Shape::Nodes,
        }
    }

    #[must_use]
    pub fn as_field(&self) -> Option<&DMatrix<f64>> {
        match self {
            Output::Field(values) => Some(values),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_series(&self) -> Option<&[f64]> {
        match self {
            Output::Series(values) => Some(values),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_nodes(&self) -> Option<&[f64]> {
        match self {
            Output::Nodes(values) => Some(values),
            _ => None,
        }
    }
}

/// Work done by the integrator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolveStats {
    pub accepted_steps: usize,
    pub rejected_steps: usize,
    pub newton_iterations: usize,
}

/// The solved state of the lens at each requested time sample.
///
/// State fields are stored node by time; every other output variable is
/// derived from them when asked for.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    times: Vec<f64>,
    nodes: Vec<f64>,
    temperature: DMatrix<f64>,
    cure: DMatrix<f64>,
    intensity: DMatrix<f64>,
    rate: ArrheniusRate,
    stats: SolveStats,
}

impl Solution {
    /// Assembles a solution from flattened states, one per time sample.
    pub(super) fn new(
        times: Vec<f64>,
        nodes: Vec<f64>,
        states: &[Vec<f64>],
        rate: ArrheniusRate,
        stats: SolveStats,
    ) -> Self {
        let field = |field: Field| {
            DMatrix::from_fn(nodes.len(), states.len(), |i, j| states[j][index(i, field)])
        };
        let temperature = field(Field::Temperature);
        let cure = field(Field::Cure);
        let intensity = field(Field::Intensity);
        Self {
            times,
            nodes,
            temperature,
            cure,
            intensity,
            rate,
            stats,
        }
    }

    /// Time samples.
    #[must_use]
    pub fn times(&self) -> Vec<Time> {
        self.times.iter().map(|&t| Time::new::<second>(t)).collect()
    }

    /// Cell-centre depths below the irradiated face.
    #[must_use]
    pub fn nodes(&self) -> Vec<Length> {
        self.nodes.iter().map(|&z| Length::new::<meter>(z)).collect()
    }

    /// Temperature in K, node by time.
    #[must_use]
    pub fn temperature(&self) -> &DMatrix<f64> {
        &self.temperature
    }

    /// Degree of cure, node by time.
    #[must_use]
    pub fn degree_of_polymerisation(&self) -> &DMatrix<f64> {
        &self.cure
    }

    /// UV intensity in W/m², node by time.
    #[must_use]
    pub fn uv_intensity(&self) -> &DMatrix<f64> {
        &self.intensity
    }

    #[must_use]
    pub fn stats(&self) -> SolveStats {
        self.stats
    }

    /// Rate of polymerisation in s⁻¹, node by time.
    #[must_use]
    pub fn rate_of_polymerisation(&self) -> DMatrix<f64> {
        DMatrix::from_fn(self.cure.nrows(), self.cure.ncols(), |i, j| {
            polymerisation_rate(
                &self.rate,
                self.cure[(i, j)],
                self.intensity[(i, j)],
                self.temperature[(i, j)],
            )
        })
    }

    /// Looks an output variable up by name.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownOutputVariable`] if no variable has that name.
    pub fn get(&self, name: &str) -> Result<Output, UnknownOutputVariable> {
        Ok(self.output(name.parse()?))
    }

    /// Values of `variable`.
    #[must_use]
    pub fn output(&self, variable: OutputVariable) -> Output {
        match variable {
            OutputVariable::Temperature => Output::Field(self.temperature.clone()),
            OutputVariable::AveragedTemperature => Output::Series(averaged(&self.temperature)),
            OutputVariable::DegreeOfPolymerisation => Output::Field(self.cure.clone()),
            OutputVariable::TopBoundaryDegreeOfPolymerisation => {
                Output::Series(boundary_cure(&self.cure, 0, 1))
            }
            OutputVariable::BottomBoundaryDegreeOfPolymerisation => {
                let last = self.cure.nrows() - 1;
                Output::Series(boundary_cure(&self.cure, last, last - 1))
            }
            OutputVariable::UvIntensity => Output::Field(self.intensity.clone()),
            OutputVariable::AveragedDegreeOfPolymerisation => Output::Series(averaged(&self.cure)),
            OutputVariable::RateOfPolymerisation => Output::Field(self.rate_of_polymerisation()),
            OutputVariable::AveragedRateOfPolymerisation => {
                Output::Series(averaged(&self.rate_of_polymerisation()))
            }
            OutputVariable::TimeSeconds => Output::Series(self.times.clone()),
            OutputVariable::TimeMinutes => {
                Output::Series(self.times.iter().map(|t| t / 60.0).collect())
            }
            OutputVariable::DepthMeters => Output::Nodes(self.nodes.clone()),
            OutputVariable::DepthMicrometers => {
                Output::Nodes(self.nodes.iter().map(|z| z * 1e6).collect())
            }
        }
    }
}

/// Thickness-weighted mean over the nodes; cells are equal, so the plain
/// column mean.
fn averaged(values: &DMatrix<f64>) -> Vec<f64> {
    values.column_iter().map(|column| column.mean()).collect()
}

/// Cure at a face, extrapolated linearly from the two nearest cell centres.
///
/// Nothing bounds the result: on a coarse mesh a steep profile can
/// extrapolate past `[0, 1]`.
fn boundary_cure(cure: &DMatrix<f64>, nearest: usize, next: usize) -> Vec<f64> {
    cure.column_iter()
        .map(|column| 1.5 * column[nearest] - 0.5 * column[next])
        .collect()
}
