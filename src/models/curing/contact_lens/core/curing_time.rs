//! Time for each node to reach a degree of cure.

use uom::si::{f64::Time, length::micrometer, time::second};

use crate::support::constraint::{Constrained, UnitInterval};

use super::solution::Solution;

/// Degree of cure regarded as fully cured.
pub const DEFAULT_CURE_THRESHOLD: f64 = 0.95;

/// Returns the time at which each node first reaches `threshold`.
///
/// A node whose cure never reaches the threshold within the solved window is
/// `None`, and a warning is logged for it.
#[must_use]
pub fn curing_time(
    solution: &Solution,
    threshold: Constrained<f64, UnitInterval>,
) -> Vec<Option<Time>> {
    let times = solution.times();
    let nodes = solution.nodes();
    let cure = solution.degree_of_polymerisation();

    cure.row_iter()
        .enumerate()
        .map(|(node, row)| {
            let series: Vec<f64> = row.iter().copied().collect();
            let crossing = crossing_time(&series, &times, threshold);
            if crossing.is_none() {
                tracing::warn!(
                    "node {} (z={:.2} um) never reaches cure {}",
                    node,
                    nodes[node].get::<micrometer>(),
                    threshold.into_inner()
                );
            }
            crossing
        })
        .collect()
}

/// Returns the first time `cure` reaches `threshold`, linearly interpolated
/// between the bracketing samples.
///
/// The series is not required to be monotonic; the first crossing wins. A
/// series already at the threshold at its first sample returns that sample's
/// time. Samples past the shorter of the two slices are ignored.
#[must_use]
pub fn crossing_time(
    cure: &[f64],
    times: &[Time],
    threshold: Constrained<f64, UnitInterval>,
) -> Option<Time> {
    let threshold = threshold.into_inner();
    let samples = cure.len().min(times.len());
    let k = cure[..samples].iter().position(|&c| c >= threshold)?;

    if k == 0 {
        return Some(times[0]);
    }

    let (c0, c1) = (cure[k - 1], cure[k]);
    let (t0, t1) = (times[k - 1].get::<second>(), times[k].get::<second>());
    let t = t0 + (threshold - c0) * (t1 - t0) / (c1 - c0);
    Some(Time::new::<second>(t))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use approx::assert_relative_eq;
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
    use uom::si::{f64::MolarEnergy, molar_energy::joule_per_mole};

    use crate::{
        models::curing::contact_lens::core::solution::SolveStats,
        support::{constraint::NonNegative, kinetics::ArrheniusRate},
    };

    /// Counts warning events.
    struct WarningCounter(Arc<AtomicUsize>);

    impl<S: Subscriber> Layer<S> for WarningCounter {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == Level::WARN {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    fn seconds(values: &[f64]) -> Vec<Time> {
        values.iter().map(|&t| Time::new::<second>(t)).collect()
    }

    fn threshold(value: f64) -> Constrained<f64, UnitInterval> {
        UnitInterval::new(value).unwrap()
    }

    /// Two nodes over three samples: the first cures, the second stalls.
    fn solution() -> Solution {
        let law = ArrheniusRate::new(
            NonNegative::new(1.0).unwrap(),
            NonNegative::new(MolarEnergy::new::<joule_per_mole>(0.0)).unwrap(),
        );
        let states = vec![
            vec![353.0, 0.0, 80.0, 353.0, 0.0, 10.0],
            vec![353.0, 0.9, 80.0, 353.0, 0.5, 10.0],
            vec![353.0, 1.0, 80.0, 353.0, 0.6, 10.0],
        ];
        Solution::new(
            vec![0.0, 10.0, 20.0],
            vec![50e-6, 150e-6],
            &states,
            law,
            SolveStats::default(),
        )
    }

    #[test]
    fn interpolates_first_crossing() {
        let times = seconds(&[0.0, 10.0, 20.0]);
        let t = crossing_time(&[0.0, 0.5, 1.0], &times, threshold(0.95)).unwrap();
        assert_relative_eq!(t.get::<second>(), 19.0, max_relative = 1e-12);
    }

    #[test]
    fn exact_hit_returns_sample_time() {
        let times = seconds(&[0.0, 10.0, 20.0]);
        let t = crossing_time(&[0.0, 0.95, 1.0], &times, threshold(0.95)).unwrap();
        assert_relative_eq!(t.get::<second>(), 10.0);
    }

    #[test]
    fn already_cured_returns_first_time() {
        let times = seconds(&[5.0, 10.0]);
        let t = crossing_time(&[0.97, 0.99], &times, threshold(0.95)).unwrap();
        assert_relative_eq!(t.get::<second>(), 5.0);
    }

    #[test]
    fn never_reached_or_empty_is_none() {
        let times = seconds(&[0.0, 10.0]);
        assert!(crossing_time(&[0.1, 0.9], &times, threshold(0.95)).is_none());
        assert!(crossing_time(&[], &[], threshold(0.95)).is_none());
    }

    #[test]
    fn non_monotonic_series_reports_first_crossing() {
        let times = seconds(&[0.0, 1.0, 2.0, 3.0]);
        let t = crossing_time(&[0.0, 1.0, 0.2, 1.0], &times, threshold(0.5)).unwrap();
        assert_relative_eq!(t.get::<second>(), 0.5);
    }

    #[test]
    fn zero_threshold_is_met_immediately() {
        let times = seconds(&[2.0, 3.0]);
        let t = crossing_time(&[0.0, 0.0], &times, threshold(0.0)).unwrap();
        assert_relative_eq!(t.get::<second>(), 2.0);
    }

    #[test]
    fn per_node_times_with_one_warning_per_stalled_node() {
        let warnings = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(WarningCounter(warnings.clone()));

        let times = tracing::subscriber::with_default(subscriber, || {
            curing_time(&solution(), threshold(DEFAULT_CURE_THRESHOLD))
        });

        assert_eq!(times.len(), 2);
        assert_relative_eq!(
            times[0].unwrap().get::<second>(),
            15.0,
            max_relative = 1e-12
        );
        assert!(times[1].is_none());
        assert_eq!(warnings.load(Ordering::SeqCst), 1);
    }
}
